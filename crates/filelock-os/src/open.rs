//! Opening lock files.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use filelock_core::error::{LockError, LockResult};

/// Rejects an existing lock file the current user cannot write.
///
/// Retrying against such a file would never succeed, so this is reported up
/// front as `PermissionDenied`.
pub(crate) fn ensure_writable(path: &Path) -> LockResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && !is_writable(path, &meta) => {
            Err(LockError::PermissionDenied {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "lock file is not writable"),
            })
        }
        _ => Ok(()),
    }
}

/// Asks the kernel whether the real user may write `path` (`access(2)`).
#[cfg(unix)]
fn is_writable(path: &Path, _meta: &fs::Metadata) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        // Interior NUL: let the open report it.
        return true;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the whole call.
    if unsafe { libc::access(c_path.as_ptr(), libc::W_OK) } == 0 {
        return true;
    }
    // Only a definite "no" is fatal; anything else is left to the open.
    !matches!(
        io::Error::last_os_error().raw_os_error(),
        Some(libc::EACCES) | Some(libc::EROFS) | Some(libc::EPERM)
    )
}

#[cfg(not(unix))]
fn is_writable(_path: &Path, meta: &fs::Metadata) -> bool {
    !meta.permissions().readonly()
}

/// Read-write, create, truncate.
pub(crate) fn shared_open(mode: u32) -> OpenOptions {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(true);
    set_mode(&mut options, mode);
    options
}

/// Write-only, fails if the file exists (`O_CREAT | O_EXCL`).
pub(crate) fn exclusive_create(mode: u32) -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    set_mode(&mut options, mode);
    options
}

#[cfg(unix)]
fn set_mode(options: &mut OpenOptions, mode: u32) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(mode);
}

#[cfg(not(unix))]
fn set_mode(_options: &mut OpenOptions, _mode: u32) {}
