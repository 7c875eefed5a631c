//! Reentrant file lock handle.
//!
//! [`BaseFileLock`] owns the per-process half of a file lock: the reentrancy
//! counter, the open lock file while the lock is held, and the retry loop that
//! turns the backend's single non-blocking attempt into a timed acquisition.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use filelock_core::error::{LockError, LockResult};
use filelock_core::timeout::TimeoutValue;
use filelock_core::traits::{BackendKind, LockBackend};
use tracing::{Span, debug, instrument, trace};

use crate::builder::FileLockBuilder;
use crate::proxy::AcquireProxy;

/// Sleep between two acquisition attempts unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Permission mode for newly created lock files.
pub const DEFAULT_MODE: u32 = 0o644;

/// Mutable state, only touched under the handle's mutex.
///
/// `file` is `Some` iff the OS-level lock is held.
#[derive(Debug, Default)]
struct LockState {
    file: Option<File>,
    counter: u32,
}

/// A reentrant, timeout-capable file lock on a single path.
///
/// The handle may be shared between threads (for example behind an `Arc`).
/// Re-entry is counted per handle, not per thread: once the handle holds the
/// lock, every further `acquire` on it succeeds immediately and the OS lock is
/// released when the matching number of releases has happened.
///
/// Dropping the handle force-releases the lock.
///
/// # Example
///
/// ```rust,no_run
/// use filelock_os::FileLock;
///
/// let lock = FileLock::new("/tmp/a.lock");
/// {
///     let _guard = lock.acquire(None)?;
///     // critical section
/// }
/// assert!(!lock.is_locked());
/// # Ok::<(), filelock_core::LockError>(())
/// ```
pub struct BaseFileLock<B: LockBackend> {
    path: PathBuf,
    backend: B,
    /// Default timeout in microseconds, negative for infinite.
    timeout: AtomicI64,
    poll_interval: Duration,
    mode: u32,
    state: Mutex<LockState>,
}

impl<B: LockBackend + Default> BaseFileLock<B> {
    /// Creates a handle that waits forever by default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(path, B::default())
    }

    /// Creates a handle with a default timeout.
    pub fn with_timeout(path: impl Into<PathBuf>, timeout: impl Into<TimeoutValue>) -> Self {
        let lock = Self::new(path);
        lock.set_timeout(timeout);
        lock
    }
}

impl<B: LockBackend> BaseFileLock<B> {
    /// Creates a handle using an explicit backend instance.
    pub fn with_backend(path: impl Into<PathBuf>, backend: B) -> Self {
        Self::from_parts(
            path.into(),
            backend,
            TimeoutValue::INFINITE,
            DEFAULT_POLL_INTERVAL,
            DEFAULT_MODE,
        )
    }

    /// Returns a builder for configuring a handle.
    pub fn builder() -> FileLockBuilder {
        FileLockBuilder::new()
    }

    pub(crate) fn from_parts(
        path: PathBuf,
        backend: B,
        timeout: TimeoutValue,
        poll_interval: Duration,
        mode: u32,
    ) -> Self {
        Self {
            path,
            backend,
            timeout: AtomicI64::new(timeout.as_micros()),
            poll_interval,
            mode,
            state: Mutex::new(LockState::default()),
        }
    }

    /// Returns the path of the lock file.
    pub fn lock_file(&self) -> &Path {
        &self.path
    }

    /// Returns `true` while this handle holds the OS-level lock.
    ///
    /// Only authoritative when the caller itself holds the lock.
    pub fn is_locked(&self) -> bool {
        self.state().file.is_some()
    }

    /// Number of outstanding acquisitions on this handle.
    pub fn lock_counter(&self) -> u32 {
        self.state().counter
    }

    /// Returns the default timeout used when `acquire` gets `None`.
    pub fn timeout(&self) -> TimeoutValue {
        TimeoutValue::from_micros(self.timeout.load(Ordering::Relaxed))
    }

    /// Changes the default timeout.
    pub fn set_timeout(&self, timeout: impl Into<TimeoutValue>) {
        self.timeout
            .store(timeout.into().as_micros(), Ordering::Relaxed);
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Acquires the lock using the handle's poll interval.
    ///
    /// `None` uses the handle's default timeout. The returned proxy releases
    /// the lock once when dropped.
    ///
    /// # Errors
    ///
    /// * `LockError::Timeout` - the deadline passed while the lock was held elsewhere
    /// * `LockError::PermissionDenied` / `LockError::MissingDirectory` - raised on the
    ///   first attempt, never retried
    pub fn acquire(&self, timeout: Option<TimeoutValue>) -> LockResult<AcquireProxy<'_, B>> {
        self.acquire_with(timeout, self.poll_interval)
    }

    /// Acquires the lock, sleeping `poll_interval` between attempts.
    #[instrument(skip(self), fields(lock.path = %self.path.display(), backend = %self.backend.kind(), acquired = tracing::field::Empty))]
    pub fn acquire_with(
        &self,
        timeout: Option<TimeoutValue>,
        poll_interval: Duration,
    ) -> LockResult<AcquireProxy<'_, B>> {
        let timeout = timeout.unwrap_or_else(|| self.timeout());
        debug!(%timeout, "attempting to acquire lock");
        let pending = self.begin_acquire();
        let start = Instant::now();

        loop {
            match self.step(timeout, start, poll_interval)? {
                Step::Acquired => return Ok(pending.complete()),
                Step::Wait(wait) => std::thread::sleep(wait),
            }
        }
    }

    /// Async variant of [`BaseFileLock::acquire_with`].
    ///
    /// The wait between attempts is a `tokio` sleep. Dropping the future while
    /// it waits leaves the handle exactly as it was before the call.
    #[instrument(skip(self), fields(lock.path = %self.path.display(), backend = %self.backend.kind(), acquired = tracing::field::Empty))]
    pub async fn acquire_async(
        &self,
        timeout: Option<TimeoutValue>,
        poll_interval: Duration,
    ) -> LockResult<AcquireProxy<'_, B>> {
        let timeout = timeout.unwrap_or_else(|| self.timeout());
        debug!(%timeout, "attempting to acquire lock");
        let pending = self.begin_acquire();
        let start = Instant::now();

        loop {
            match self.step(timeout, start, poll_interval)? {
                Step::Acquired => return Ok(pending.complete()),
                Step::Wait(wait) => tokio::time::sleep(wait).await,
            }
        }
    }

    /// Makes a single attempt.
    ///
    /// Returns `Ok(None)` if another holder has the lock.
    pub fn try_acquire(&self) -> LockResult<Option<AcquireProxy<'_, B>>> {
        match self.acquire_with(Some(TimeoutValue::ZERO), Duration::ZERO) {
            Ok(proxy) => Ok(Some(proxy)),
            Err(LockError::Timeout { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Runs `f` while holding the lock, releasing it on every exit path.
    pub fn with_lock<R>(&self, f: impl FnOnce(&Self) -> R) -> LockResult<R> {
        let proxy = self.acquire(None)?;
        let result = f(proxy.lock());
        proxy.release();
        Ok(result)
    }

    /// Drops one level of re-entry; the last one releases the OS lock.
    ///
    /// Releasing an unlocked handle is a no-op.
    pub fn release(&self) {
        self.release_inner(false);
    }

    /// Releases the OS lock immediately regardless of the re-entry depth.
    pub fn force_release(&self) {
        self.release_inner(true);
    }

    #[instrument(skip(self), fields(lock.path = %self.path.display(), backend = %self.backend.kind()))]
    fn release_inner(&self, force: bool) {
        let mut state = self.state();
        if state.file.is_none() {
            return;
        }

        state.counter = state.counter.saturating_sub(1);
        if state.counter > 0 && !force {
            trace!(counter = state.counter, "lock still held by outer acquire");
            return;
        }

        if let Some(file) = state.file.take() {
            debug!("releasing lock");
            self.backend.release(&self.path, file);
        }
        state.counter = 0;
        debug!("lock released");
    }

    /// Optimistically counts this call as an outstanding acquisition.
    fn begin_acquire(&self) -> PendingAcquire<'_, B> {
        self.state().counter += 1;
        PendingAcquire {
            lock: self,
            armed: true,
        }
    }

    /// One iteration of the acquisition loop, without the sleep.
    fn step(&self, timeout: TimeoutValue, start: Instant, poll_interval: Duration) -> LockResult<Step> {
        if self.poll_once()? {
            let elapsed = start.elapsed();
            Span::current().record("acquired", true);
            debug!(elapsed_ms = elapsed.as_millis() as u64, "lock acquired");
            return Ok(Step::Acquired);
        }

        if timeout.has_elapsed(start) {
            debug!(%timeout, "timeout on acquiring lock");
            return Err(LockError::Timeout {
                path: self.path.clone(),
            });
        }

        // Don't sleep past the deadline.
        let wait = match timeout.as_duration() {
            Some(limit) => poll_interval.min(limit.saturating_sub(start.elapsed())),
            None => poll_interval,
        };
        trace!(wait_ms = wait.as_millis() as u64, "lock held elsewhere, waiting");
        Ok(Step::Wait(wait))
    }

    /// Calls the backend unless this handle already holds the lock.
    fn poll_once(&self) -> LockResult<bool> {
        let mut state = self.state();
        if state.file.is_none() {
            if let Some(file) = self.backend.try_acquire(&self.path, self.mode)? {
                state.file = Some(file);
            }
        }
        Ok(state.file.is_some())
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        // The state is valid after any panic; ignore poisoning.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Step {
    Acquired,
    Wait(Duration),
}

/// Undoes the counter increment of an acquisition that does not complete.
///
/// Covers error returns, panics inside the backend, and cancelled futures.
struct PendingAcquire<'a, B: LockBackend> {
    lock: &'a BaseFileLock<B>,
    armed: bool,
}

impl<'a, B: LockBackend> PendingAcquire<'a, B> {
    fn complete(mut self) -> AcquireProxy<'a, B> {
        self.armed = false;
        AcquireProxy::new(self.lock)
    }
}

impl<B: LockBackend> Drop for PendingAcquire<'_, B> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.lock.state();
            state.counter = state.counter.saturating_sub(1);
        }
    }
}

impl<B: LockBackend> Drop for BaseFileLock<B> {
    fn drop(&mut self) {
        self.force_release();
    }
}

impl<B: LockBackend> fmt::Debug for BaseFileLock<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("BaseFileLock")
            .field("path", &self.path)
            .field("backend", &self.backend.kind())
            .field("timeout", &self.timeout())
            .field("locked", &state.file.is_some())
            .field("counter", &state.counter)
            .finish()
    }
}
