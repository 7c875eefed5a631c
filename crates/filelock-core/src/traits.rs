//! The platform seam shared by every lock handle.

use std::fmt;
use std::fs::File;
use std::path::Path;

use crate::error::LockResult;

// ============================================================================
// Backend Kind
// ============================================================================

/// Which locking primitive a backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// `flock(2)` advisory lock on an open descriptor.
    Posix,
    /// `LockFileEx` byte-range lock on the first byte of the file.
    Windows,
    /// Exclusive creation of the lock file (`O_CREAT | O_EXCL`).
    Soft,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Posix => "posix",
            BackendKind::Windows => "windows",
            BackendKind::Soft => "soft",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Lock Backend Trait
// ============================================================================

/// A platform-specific locking primitive.
///
/// Backends are stateless with respect to a particular lock: the handle owns
/// the open [`File`] while the lock is held and gives it back on release.
///
/// # Example
///
/// ```rust,ignore
/// match backend.try_acquire(path, 0o644)? {
///     Some(file) => { /* we hold the lock */ backend.release(path, file) }
///     None => { /* somebody else holds it, sleep and retry */ }
/// }
/// ```
pub trait LockBackend: Send + Sync {
    /// Returns the primitive this backend uses.
    fn kind(&self) -> BackendKind;

    /// Makes exactly one non-blocking attempt to lock `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(file))` - Lock acquired, `file` must be kept open while held
    /// * `Ok(None)` - Lock is held by someone else
    /// * `Err(...)` - A genuine failure (missing directory, permissions, ...)
    ///
    /// `mode` is the Unix permission mode used if the file is created.
    fn try_acquire(&self, path: &Path, mode: u32) -> LockResult<Option<File>>;

    /// Releases a lock previously returned by [`LockBackend::try_acquire`].
    ///
    /// Closes the descriptor. Cleanup failures are logged, never returned.
    fn release(&self, path: &Path, file: File);
}

impl<T: LockBackend + ?Sized> LockBackend for Box<T> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn try_acquire(&self, path: &Path, mode: u32) -> LockResult<Option<File>> {
        (**self).try_acquire(path, mode)
    }

    fn release(&self, path: &Path, file: File) {
        (**self).release(path, file)
    }
}
