use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

use super::options::Options;

/// Writes one file to the location named by `opts.target_path`.
pub trait Install {
    /// Write the full contents of `src` to `opts.target_path`, creating
    /// missing parent directories. Must cope with the destination being the
    /// running executable.
    fn apply(&self, src: &mut dyn Read, opts: &Options) -> Result<()>;
}

impl<F> Install for F
where
    F: Fn(&mut dyn Read, &Options) -> Result<()>,
{
    fn apply(&self, src: &mut dyn Read, opts: &Options) -> Result<()> {
        self(src, opts)
    }
}

/// Installer that replaces files through a rename, so a running binary can
/// be swapped out.
///
/// The stream is staged into a temporary file next to the destination. An
/// existing file is moved aside to `.<name>.old`, the staged file is renamed
/// into place, and the old file is removed. If the final rename fails the
/// old file is moved back. A directory at the destination is an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileInstaller;

impl Install for FileInstaller {
    fn apply(&self, src: &mut dyn Read, opts: &Options) -> Result<()> {
        let target = opts
            .explicit_target()
            .context("installer requires a destination path")?;
        let file_name = target
            .file_name()
            .with_context(|| format!("{} does not name a file", target.display()))?;
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;

        // Only files are replaced; a directory in the way is never moved aside.
        if let Ok(meta) = fs::symlink_metadata(target)
            && meta.is_dir()
        {
            bail!("{} is a directory", target.display());
        }

        let mut staged = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name.to_string_lossy()))
            .suffix(".new")
            .tempfile_in(dir)
            .with_context(|| format!("creating staging file in {}", dir.display()))?;
        let written = io::copy(src, staged.as_file_mut())
            .with_context(|| format!("writing {}", target.display()))?;
        staged.as_file().sync_all()?;
        set_mode(staged.path(), opts.target_mode)?;

        let backup = backup_path(target);
        let _ = fs::remove_file(&backup);
        let moved_aside = match fs::rename(target, &backup) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                return Err(e).with_context(|| format!("moving {} aside", target.display()));
            }
        };

        if let Err(e) = staged.persist(target) {
            if moved_aside {
                if let Err(restore) = fs::rename(&backup, target) {
                    warn!(
                        path = %backup.display(),
                        error = %restore,
                        "could not restore old file"
                    );
                }
            }
            return Err(e.error).with_context(|| format!("replacing {}", target.display()));
        }

        if moved_aside {
            // Windows refuses to delete a running binary; leave it for the next update.
            if let Err(e) = fs::remove_file(&backup) {
                warn!(path = %backup.display(), error = %e, "could not remove old file");
            }
        }

        debug!(path = %target.display(), bytes = written, "installed file");
        Ok(())
    }
}

/// Where an existing destination file is parked during replacement.
pub fn backup_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.old"))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("setting mode {mode:o} on {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
