use super::ReadAt;
use std::fs::File;
use std::io;
use std::path::Path;

/// Local file reader with random access support
pub struct LocalFileReader {
    file: File,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

impl ReadAt for LocalFileReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_at(buf, offset)
        }

        #[cfg(windows)]
        {
            // seek_read moves the shared cursor, which nothing else relies on
            use std::os::windows::fs::FileExt;
            self.file.seek_read(buf, offset)
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.read(buf)
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}
