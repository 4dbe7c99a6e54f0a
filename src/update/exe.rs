use std::io;
use std::path::PathBuf;

/// Path of the running executable with symlinks resolved.
///
/// Uses `dunce` so Windows callers get a regular `C:\...` path rather than
/// a verbatim `\\?\` one.
pub fn executable_real_path() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    dunce::canonicalize(exe)
}
