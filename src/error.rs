use std::io;

/// Failure of an archive application, tagged with the phase that failed.
///
/// Nothing is rolled back: entries installed before the failure stay
/// installed.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// The running executable's location could not be resolved.
    #[error("executable path")]
    ExecutablePath(#[source] io::Error),

    /// The archive could not be opened or its directory could not be read.
    #[error("zip reader")]
    OpenArchive(#[source] anyhow::Error),

    /// The contents of one entry could not be opened.
    #[error("zip open: {name}")]
    OpenEntry {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The visitor, usually the installer, failed on an entry.
    #[error("apply {name}")]
    Visit {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ApplyError {
    /// The archive entry being processed when the failure happened, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            ApplyError::OpenEntry { name, .. } | ApplyError::Visit { name, .. } => Some(name),
            ApplyError::ExecutablePath(_) | ApplyError::OpenArchive(_) => None,
        }
    }
}
