//! Named locks inside a lock directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use filelock_core::error::{LockError, LockResult};
use filelock_core::timeout::TimeoutValue;
use filelock_core::traits::LockBackend;

use crate::builder::FileLockBuilder;
use crate::lock::{BaseFileLock, DEFAULT_MODE, DEFAULT_POLL_INTERVAL};
use crate::name::lock_file_name;
use crate::selector::FileLock;

/// Builder for file lock provider configuration.
pub struct FileLockProviderBuilder {
    directory: Option<PathBuf>,
    timeout: TimeoutValue,
    poll_interval: Duration,
    mode: u32,
}

impl FileLockProviderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            directory: None,
            timeout: TimeoutValue::INFINITE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            mode: DEFAULT_MODE,
        }
    }

    /// Sets the directory for lock files.
    ///
    /// The directory will be created if it doesn't exist.
    pub fn directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.directory = Some(path.into());
        self
    }

    /// Default timeout for every lock created by the provider.
    pub fn timeout(mut self, timeout: impl Into<TimeoutValue>) -> Self {
        self.timeout = timeout.into();
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Builds the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is specified or if the directory
    /// cannot be created.
    pub fn build(self) -> LockResult<FileLockProvider> {
        let directory = self
            .directory
            .ok_or_else(|| LockError::InvalidName("directory not specified".to_string()))?;

        std::fs::create_dir_all(&directory).map_err(|e| LockError::from_io(&directory, e))?;

        Ok(FileLockProvider {
            directory,
            timeout: self.timeout,
            poll_interval: self.poll_interval,
            mode: self.mode,
        })
    }
}

impl Default for FileLockProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out file locks by name, all stored in one directory.
///
/// Each call to [`FileLockProvider::create_lock`] returns an independent
/// handle; two handles for the same name exclude each other like handles in
/// different processes.
#[derive(Debug, Clone)]
pub struct FileLockProvider {
    directory: PathBuf,
    timeout: TimeoutValue,
    poll_interval: Duration,
    mode: u32,
}

impl FileLockProvider {
    /// Returns a new builder for configuring the provider.
    pub fn builder() -> FileLockProviderBuilder {
        FileLockProviderBuilder::new()
    }

    /// Creates a provider using the specified directory.
    pub fn new(directory: impl Into<PathBuf>) -> LockResult<Self> {
        Self::builder().directory(directory).build()
    }

    /// Returns the directory where lock files are stored.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Creates a lock for `name` using the host's canonical backend.
    pub fn create_lock(&self, name: &str) -> LockResult<FileLock> {
        self.lock_builder(name)?.build()
    }

    /// Creates a lock for `name` using an explicit backend.
    pub fn create_lock_with<B: LockBackend>(
        &self,
        name: &str,
        backend: B,
    ) -> LockResult<BaseFileLock<B>> {
        self.lock_builder(name)?.build_with(backend)
    }

    fn lock_builder(&self, name: &str) -> LockResult<FileLockBuilder> {
        let path = lock_file_name(&self.directory, name)?;
        Ok(FileLockBuilder::new()
            .path(path)
            .timeout(self.timeout)
            .poll_interval(self.poll_interval)
            .mode(self.mode))
    }
}
