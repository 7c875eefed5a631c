//! Exclusive-create backend for hosts without a locking primitive.
//!
//! The lock is the existence of the file. Only processes following the same
//! convention are excluded; anything else can still open the path.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use filelock_core::error::{LockError, LockResult};
use filelock_core::traits::{BackendKind, LockBackend};
use tracing::trace;

use crate::open::{ensure_writable, exclusive_create};

#[derive(Debug, Clone, Copy, Default)]
pub struct SoftBackend;

impl LockBackend for SoftBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Soft
    }

    fn try_acquire(&self, path: &Path, mode: u32) -> LockResult<Option<File>> {
        ensure_writable(path)?;
        match exclusive_create(mode).open(path) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(None),
            // Windows reports a file pending deletion as access denied.
            Err(e) if cfg!(windows) && e.kind() == io::ErrorKind::PermissionDenied => Ok(None),
            Err(e) => Err(LockError::from_io(path, e)),
        }
    }

    fn release(&self, path: &Path, file: File) {
        drop(file);
        if let Err(e) = fs::remove_file(path) {
            trace!(lock.path = %path.display(), error = %e, "lock file not removed");
        }
    }
}
