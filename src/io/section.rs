use std::io::{self, Read};

use super::ReadAt;

/// A sequential [`Read`] over a fixed byte range of a [`ReadAt`] source.
///
/// Reading past the range yields EOF; a source that ends before the range
/// does is reported as [`io::ErrorKind::UnexpectedEof`].
pub struct SectionReader<'a, R: ReadAt + ?Sized> {
    source: &'a R,
    offset: u64,
    remaining: u64,
}

impl<'a, R: ReadAt + ?Sized> SectionReader<'a, R> {
    pub fn new(source: &'a R, offset: u64, len: u64) -> Self {
        Self {
            source,
            offset,
            remaining: len,
        }
    }

    /// Bytes left in the section.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<R: ReadAt + ?Sized> Read for SectionReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let max = (buf.len() as u64).min(self.remaining) as usize;
        if max == 0 {
            return Ok(0);
        }

        let n = self.source.read_at(self.offset, &mut buf[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "source ended at offset {} with {} bytes left in section",
                    self.offset, self.remaining
                ),
            ));
        }

        self.offset += n as u64;
        self.remaining -= n as u64;
        Ok(n)
    }
}
