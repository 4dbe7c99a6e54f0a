use std::path::{Path, PathBuf};

/// Permission bits given to installed files when none are requested.
pub const DEFAULT_TARGET_MODE: u32 = 0o755;

/// Settings for one archive application.
///
/// The same value is the base for every entry: each entry gets its own copy
/// with `target_path` pointing at that entry's destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Base directory for the whole archive, or the destination file once
    /// handed to an installer. `None` or empty means the directory of the
    /// running executable.
    pub target_path: Option<PathBuf>,

    /// Unix permission bits for installed files. Ignored on other platforms.
    pub target_mode: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            target_path: None,
            target_mode: DEFAULT_TARGET_MODE,
        }
    }
}

impl Options {
    pub fn with_target_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_path = Some(path.into());
        self
    }

    pub fn with_target_mode(mut self, mode: u32) -> Self {
        self.target_mode = mode;
        self
    }

    /// The explicit target, treating an empty path as unset.
    pub fn explicit_target(&self) -> Option<&Path> {
        self.target_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
