use std::io::Read;
use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};
use tracing::debug;

use super::install::Install;
use super::options::Options;

/// Resolve an archive entry name against the base directory.
///
/// The stored name is split on `/` and joined segment by segment, so the
/// result uses the host separator. Empty and `.` segments are dropped.
/// Anything that could leave `base` (a `..` segment, or a segment the host
/// reads as a root, drive prefix or several components) is an error.
pub fn destination(base: &Path, entry_name: &str) -> Result<PathBuf> {
    let mut dest = base.to_path_buf();

    for segment in entry_name.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }

        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => dest.push(part),
            _ => bail!("entry {entry_name:?} has unsafe path segment {segment:?}"),
        }
    }

    if dest == base {
        bail!("entry {entry_name:?} does not name a file");
    }

    Ok(dest)
}

/// Install one entry: derive its own options from `base_opts` and hand the
/// stream to the installer. Installer errors are returned untouched.
pub fn dispatch<I>(
    installer: &I,
    base_opts: &Options,
    entry_name: &str,
    src: &mut dyn Read,
) -> Result<()>
where
    I: Install + ?Sized,
{
    let base = base_opts.target_path.as_deref().unwrap_or(Path::new(""));
    let entry_opts = Options {
        target_path: Some(destination(base, entry_name)?),
        ..base_opts.clone()
    };

    debug!(entry = entry_name, dest = ?entry_opts.target_path, "installing");
    installer.apply(src, &entry_opts)
}
