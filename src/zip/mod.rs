//! ZIP archive reading.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`entry`]: Decompressing readers over a single entry
//! - [`walker`]: Filtered, strictly sequential traversal of an archive
//!
//! The End of Central Directory is read first (from the end of the file),
//! then the Central Directory. Entry data is only touched when an entry is
//! opened, and only one entry is open at a time.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED (no compression) method
//! - DEFLATE compression method
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No CRC verification
//! - No BZIP2, LZMA, or other compression methods

mod entry;
mod ignore;
mod parser;
mod structures;
mod walker;

pub use entry::EntryReader;
pub use ignore::{DEFAULT_IGNORED, IgnoreRules};
pub use parser::ZipParser;
pub use structures::*;
pub use walker::ArchiveWalker;
