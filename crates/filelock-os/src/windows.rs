//! `LockFileEx` backend.

use std::fs::{self, File};
use std::io;
use std::os::windows::io::AsRawHandle;
use std::path::Path;

use filelock_core::error::{LockError, LockResult};
use filelock_core::traits::{BackendKind, LockBackend};
use tracing::{trace, warn};
use windows_sys::Win32::Foundation::{ERROR_LOCK_VIOLATION, HANDLE};
use windows_sys::Win32::Storage::FileSystem::{
    LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY, LockFileEx, UnlockFileEx,
};
use windows_sys::Win32::System::IO::OVERLAPPED;

use crate::open::{ensure_writable, shared_open};

/// Mandatory byte-range lock on the first byte of the lock file.
///
/// The file is removed on release on a best-effort basis.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsBackend;

impl LockBackend for WindowsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Windows
    }

    fn try_acquire(&self, path: &Path, mode: u32) -> LockResult<Option<File>> {
        ensure_writable(path)?;
        let file = match shared_open(mode).open(path) {
            Ok(file) => file,
            // A writable file we cannot open is being deleted by its previous holder.
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Ok(None),
            Err(e) => return Err(LockError::from_io(path, e)),
        };

        match lock_first_byte(&file) {
            Ok(()) => Ok(Some(file)),
            Err(e) if e.raw_os_error() == Some(ERROR_LOCK_VIOLATION as i32) => Ok(None),
            Err(e) => Err(LockError::from_io(path, e)),
        }
    }

    fn release(&self, path: &Path, file: File) {
        if let Err(e) = unlock_first_byte(&file) {
            warn!(lock.path = %path.display(), error = %e, "UnlockFileEx failed");
        }
        drop(file);

        // Another process may already hold the file.
        if let Err(e) = fs::remove_file(path) {
            trace!(lock.path = %path.display(), error = %e, "lock file not removed");
        }
    }
}

fn lock_first_byte(file: &File) -> io::Result<()> {
    let handle = file.as_raw_handle() as HANDLE;
    // SAFETY: `handle` stays open for the call; a zeroed OVERLAPPED selects offset 0.
    let ok = unsafe {
        let mut overlapped: OVERLAPPED = std::mem::zeroed();
        LockFileEx(
            handle,
            LOCKFILE_EXCLUSIVE_LOCK | LOCKFILE_FAIL_IMMEDIATELY,
            0,
            1,
            0,
            &mut overlapped,
        )
    };
    if ok == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

fn unlock_first_byte(file: &File) -> io::Result<()> {
    let handle = file.as_raw_handle() as HANDLE;
    // SAFETY: same region as `lock_first_byte`, handle still open.
    let ok = unsafe {
        let mut overlapped: OVERLAPPED = std::mem::zeroed();
        UnlockFileEx(handle, 0, 1, 0, &mut overlapped)
    };
    if ok == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}
