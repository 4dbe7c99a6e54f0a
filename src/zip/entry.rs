use std::io::{self, Read};

use anyhow::{Result, bail};
use flate2::read::DeflateDecoder;

use crate::io::{ReadAt, SectionReader};

use super::structures::CompressionMethod;

/// Decompressed contents of a single archive entry.
///
/// Borrows the archive source, so it cannot outlive the parser it was opened
/// from.
pub enum EntryReader<'a, R: ReadAt> {
    Stored(SectionReader<'a, R>),
    Deflate(DeflateDecoder<SectionReader<'a, R>>),
}

impl<'a, R: ReadAt> EntryReader<'a, R> {
    pub fn new(section: SectionReader<'a, R>, method: CompressionMethod) -> Result<Self> {
        match method {
            CompressionMethod::Stored => Ok(Self::Stored(section)),
            CompressionMethod::Deflate => Ok(Self::Deflate(DeflateDecoder::new(section))),
            CompressionMethod::Unknown(m) => bail!(
                "Unsupported compression method: {} (only STORED and DEFLATE are supported)",
                m
            ),
        }
    }
}

impl<R: ReadAt> Read for EntryReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Stored(r) => r.read(buf),
            Self::Deflate(r) => r.read(buf),
        }
    }
}
