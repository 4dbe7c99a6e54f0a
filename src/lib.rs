//! # zipapply
//!
//! Apply a ZIP archive of update files to the installation directory of a
//! self-updating program.
//!
//! The archive is streamed one entry at a time: entries are filtered against
//! a set of ignored path segments (`.DS_Store` and `__MACOSX` by default),
//! directories are skipped, and every remaining file is decompressed
//! straight into an [`Install`] implementation together with its
//! destination. Destinations are the entry names resolved below an explicit
//! target directory, or below the directory of the running executable.
//!
//! Only one entry stream is open at a time, so archives much larger than
//! memory can be applied. Application stops at the first failure and is not
//! rolled back.
//!
//! ## Example
//!
//! ```no_run
//! use zipapply::{Options, apply_archive};
//!
//! fn main() -> anyhow::Result<()> {
//!     // Install next to the running executable
//!     let installed = apply_archive("update.zip", &Options::default())?;
//!     println!("installed {installed} files");
//!
//!     // Or into an explicit directory
//!     apply_archive("update.zip", &Options::default().with_target_path("/opt/app"))?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod update;
pub mod zip;

pub use cli::Cli;
pub use error::ApplyError;
pub use io::{LocalFileReader, ReadAt};
pub use update::{ArchiveApplier, FileInstaller, Install, Options, apply_archive};
pub use zip::{ArchiveWalker, IgnoreRules, ZipFileEntry};
