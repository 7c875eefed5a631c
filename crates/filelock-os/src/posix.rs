//! `flock(2)` backend.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use filelock_core::error::{LockError, LockResult};
use filelock_core::traits::{BackendKind, LockBackend};
use tracing::warn;

use crate::open::{ensure_writable, shared_open};

/// Exclusive advisory lock on an open descriptor.
///
/// The lock file is left in place on release: removing it would race with
/// waiters that already opened the same path and are about to lock the old
/// inode.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixBackend;

impl LockBackend for PosixBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Posix
    }

    fn try_acquire(&self, path: &Path, mode: u32) -> LockResult<Option<File>> {
        ensure_writable(path)?;
        let file = shared_open(mode)
            .open(path)
            .map_err(|e| LockError::from_io(path, e))?;

        match flock(&file, libc::LOCK_EX | libc::LOCK_NB) {
            Ok(()) => Ok(Some(file)),
            // Dropping `file` closes the descriptor.
            Err(e) if is_contention(&e) => Ok(None),
            Err(e) => Err(LockError::from_io(path, e)),
        }
    }

    fn release(&self, path: &Path, file: File) {
        if let Err(e) = flock(&file, libc::LOCK_UN) {
            // Closing the descriptor below drops the lock anyway.
            warn!(lock.path = %path.display(), error = %e, "flock unlock failed");
        }
        drop(file);
    }
}

fn flock(file: &File, operation: libc::c_int) -> io::Result<()> {
    // SAFETY: the descriptor is owned by `file`, which outlives the call.
    let result = unsafe { libc::flock(file.as_raw_fd(), operation) };
    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

fn is_contention(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || matches!(err.raw_os_error(), Some(code) if code == libc::EWOULDBLOCK || code == libc::EAGAIN)
}
