//! Applying an update archive to an installation directory.
//!
//! [`apply_archive`] is the usual entry point. [`ArchiveApplier`] exposes
//! the collaborators (installer, ignore rules, executable lookup) for
//! callers and tests that need to replace them.

mod dispatch;
mod exe;
mod install;
mod options;

pub use dispatch::{destination, dispatch};
pub use exe::executable_real_path;
pub use install::{FileInstaller, Install, backup_path};
pub use options::{DEFAULT_TARGET_MODE, Options};

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ApplyError;
use crate::zip::{ArchiveWalker, IgnoreRules};

/// Install every file of the ZIP archive at `archive` with the default
/// installer and ignore rules.
///
/// Files land below `opts.target_path`, or next to the running executable
/// when it is unset.
pub fn apply_archive(archive: impl AsRef<Path>, opts: &Options) -> Result<usize, ApplyError> {
    ArchiveApplier::new(FileInstaller).apply(archive.as_ref(), opts)
}

/// Wires the archive walker to an installer.
pub struct ArchiveApplier<I = FileInstaller> {
    installer: I,
    rules: IgnoreRules,
    resolve_executable: fn() -> io::Result<PathBuf>,
}

impl Default for ArchiveApplier<FileInstaller> {
    fn default() -> Self {
        Self::new(FileInstaller)
    }
}

impl<I: Install> ArchiveApplier<I> {
    pub fn new(installer: I) -> Self {
        Self {
            installer,
            rules: IgnoreRules::default(),
            resolve_executable: executable_real_path,
        }
    }

    pub fn with_ignore_rules(mut self, rules: IgnoreRules) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the lookup used when no target directory is given.
    pub fn with_executable_resolver(mut self, resolve: fn() -> io::Result<PathBuf>) -> Self {
        self.resolve_executable = resolve;
        self
    }

    /// The directory entries are installed below.
    pub fn target_dir(&self, opts: &Options) -> Result<PathBuf, ApplyError> {
        if let Some(target) = opts.explicit_target() {
            return Ok(target.to_path_buf());
        }

        let exe = (self.resolve_executable)().map_err(ApplyError::ExecutablePath)?;
        let dir = exe.parent().ok_or_else(|| {
            ApplyError::ExecutablePath(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} has no parent directory", exe.display()),
            ))
        })?;
        Ok(dir.to_path_buf())
    }

    /// Install every installable entry of `archive`, in archive order.
    ///
    /// Stops at the first failure; files installed before it are kept.
    ///
    /// # Arguments
    ///
    /// * `archive` - Path of the ZIP archive to apply
    /// * `opts` - Base options; `target_path` is replaced per entry
    ///
    /// # Returns
    ///
    /// The number of files installed.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::ExecutablePath`] if no target is given and the
    /// executable cannot be located, [`ApplyError::OpenArchive`] or
    /// [`ApplyError::OpenEntry`] if the archive cannot be read, and
    /// [`ApplyError::Visit`] if the installer fails on an entry.
    pub fn apply(&self, archive: &Path, opts: &Options) -> Result<usize, ApplyError> {
        let base_opts = Options {
            target_path: Some(self.target_dir(opts)?),
            ..opts.clone()
        };

        let walker = ArchiveWalker::open(archive, self.rules.clone())?;
        let installed =
            walker.walk(|name, src| dispatch(&self.installer, &base_opts, name, src))?;

        info!(
            archive = %archive.display(),
            target = ?base_opts.target_path,
            installed,
            "applied update archive"
        );
        Ok(installed)
    }
}
