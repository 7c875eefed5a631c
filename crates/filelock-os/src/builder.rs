//! Builder for lock handle configuration.

use std::path::PathBuf;
use std::time::Duration;

use filelock_core::error::{LockError, LockResult};
use filelock_core::timeout::TimeoutValue;
use filelock_core::traits::LockBackend;

use crate::lock::{BaseFileLock, DEFAULT_MODE, DEFAULT_POLL_INTERVAL};
use crate::selector::{FileLock, PlatformBackend};

/// Builder for [`BaseFileLock`].
///
/// ```rust,no_run
/// use std::time::Duration;
/// use filelock_os::FileLockBuilder;
///
/// let lock = FileLockBuilder::new()
///     .path("/tmp/app.lock")
///     .timeout(Duration::from_secs(5))
///     .poll_interval(Duration::from_millis(20))
///     .build()?;
/// # Ok::<(), filelock_core::LockError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileLockBuilder {
    path: Option<PathBuf>,
    timeout: TimeoutValue,
    poll_interval: Duration,
    mode: u32,
}

impl FileLockBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            path: None,
            timeout: TimeoutValue::INFINITE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            mode: DEFAULT_MODE,
        }
    }

    /// Sets the lock file path.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the default timeout. Negative seconds wait forever.
    pub fn timeout(mut self, timeout: impl Into<TimeoutValue>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Sets the sleep between two acquisition attempts.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the Unix permission mode of a newly created lock file.
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Builds a handle using the host's canonical backend.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is specified.
    pub fn build(self) -> LockResult<FileLock> {
        self.build_with(PlatformBackend::default())
    }

    /// Builds a handle using an explicit backend.
    pub fn build_with<B: LockBackend>(self, backend: B) -> LockResult<BaseFileLock<B>> {
        let path = self
            .path
            .ok_or_else(|| LockError::InvalidName("path not specified".to_string()))?;

        Ok(BaseFileLock::from_parts(
            path,
            backend,
            self.timeout,
            self.poll_interval,
            self.mode,
        ))
    }
}

impl Default for FileLockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
