use std::io::Read;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::ApplyError;
use crate::io::{LocalFileReader, ReadAt};

use super::ignore::IgnoreRules;
use super::parser::ZipParser;
use super::structures::ZipFileEntry;

/// Streams the installable entries of a ZIP archive to a visitor.
///
/// The central directory is read when the walker is created. Entry contents
/// are only decompressed while the visitor runs, one entry at a time.
pub struct ArchiveWalker<R: ReadAt> {
    parser: ZipParser<R>,
    entries: Vec<ZipFileEntry>,
    rules: IgnoreRules,
}

impl ArchiveWalker<LocalFileReader> {
    /// Open the archive at `path`.
    pub fn open(path: &Path, rules: IgnoreRules) -> Result<Self, ApplyError> {
        let reader = LocalFileReader::new(path).map_err(|e| {
            ApplyError::OpenArchive(
                anyhow::Error::new(e).context(format!("opening {}", path.display())),
            )
        })?;
        Self::new(reader, rules)
    }
}

impl<R: ReadAt> ArchiveWalker<R> {
    pub fn new(reader: R, rules: IgnoreRules) -> Result<Self, ApplyError> {
        let parser = ZipParser::new(reader);
        let entries = parser.list_files().map_err(ApplyError::OpenArchive)?;
        debug!(entries = entries.len(), "read central directory");
        Ok(Self {
            parser,
            entries,
            rules,
        })
    }

    /// All entries in archive order, including the ones the walk skips.
    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    /// Visit every installable entry in archive order.
    ///
    /// Ignored and directory entries are skipped without opening them. Each
    /// stream is dropped as soon as the visitor returns, and the first error
    /// stops the walk.
    ///
    /// # Arguments
    ///
    /// * `visit` - Called with the stored entry name and its decompressed contents
    ///
    /// # Returns
    ///
    /// The number of entries visited.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::OpenEntry`] if an entry's data cannot be opened,
    /// or [`ApplyError::Visit`] wrapping the first visitor error.
    pub fn walk<F>(&self, mut visit: F) -> Result<usize, ApplyError>
    where
        F: FnMut(&str, &mut dyn Read) -> anyhow::Result<()>,
    {
        let mut visited = 0;

        for entry in &self.entries {
            let name = entry.file_name.as_str();

            if self.rules.is_ignored(name) {
                debug!(entry = name, "skipping ignored entry");
                continue;
            }
            if entry.is_directory {
                trace!(entry = name, "skipping directory");
                continue;
            }

            let mut stream = self
                .parser
                .open_entry(entry)
                .map_err(|source| ApplyError::OpenEntry {
                    name: name.to_string(),
                    source,
                })?;

            debug!(
                entry = name,
                size = entry.uncompressed_size,
                method = entry.compression_method.as_u16(),
                "visiting entry"
            );
            let result = visit(name, &mut stream);
            drop(stream);

            result.map_err(|source| ApplyError::Visit {
                name: name.to_string(),
                source,
            })?;
            visited += 1;
        }

        Ok(visited)
    }
}
