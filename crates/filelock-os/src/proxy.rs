//! Scoped release token returned by `acquire`.

use std::ops::Deref;

use filelock_core::traits::LockBackend;

use crate::lock::BaseFileLock;

/// Proof of one successful `acquire` on a [`BaseFileLock`].
///
/// Dereferences to the handle. Dropping the proxy (or calling
/// [`AcquireProxy::release`]) performs exactly one non-forced release, so
/// nested proxies unwind the re-entry counter one level at a time.
#[must_use = "dropping the proxy releases the lock immediately"]
pub struct AcquireProxy<'a, B: LockBackend> {
    lock: &'a BaseFileLock<B>,
    released: bool,
}

impl<'a, B: LockBackend> AcquireProxy<'a, B> {
    pub(crate) fn new(lock: &'a BaseFileLock<B>) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Returns the handle this proxy releases.
    pub fn lock(&self) -> &'a BaseFileLock<B> {
        self.lock
    }

    /// Releases now instead of at the end of the scope.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.lock.release();
        }
    }
}

impl<B: LockBackend> Deref for AcquireProxy<'_, B> {
    type Target = BaseFileLock<B>;

    fn deref(&self) -> &Self::Target {
        self.lock
    }
}

impl<B: LockBackend> Drop for AcquireProxy<'_, B> {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl<B: LockBackend> std::fmt::Debug for AcquireProxy<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquireProxy")
            .field("lock_file", &self.lock.lock_file())
            .field("released", &self.released)
            .finish()
    }
}
