//! Error types for file lock operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// Contention is not represented here: a backend that finds the lock held
/// reports `Ok(None)` and the caller retries.
#[derive(Error, Debug)]
pub enum LockError {
    /// Lock acquisition did not complete before the deadline.
    #[error("The file lock '{}' could not be acquired.", .path.display())]
    Timeout { path: PathBuf },

    /// The lock file exists but cannot be opened for writing.
    #[error("permission denied for lock file '{}': {source}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The parent directory of the lock file does not exist.
    #[error("missing directory for lock file '{}': {source}", .path.display())]
    MissingDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other OS failure while opening or locking the file.
    #[error("i/o error on lock file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid lock name or lock configuration.
    #[error("invalid lock name: {0}")]
    InvalidName(String),
}

impl LockError {
    /// Classifies an OS error raised while operating on `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::MissingDirectory { path, source },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path, source },
            _ => Self::Io { path, source },
        }
    }

    /// Returns `true` if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns the lock file path the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Timeout { path }
            | Self::PermissionDenied { path, .. }
            | Self::MissingDirectory { path, .. }
            | Self::Io { path, .. } => Some(path),
            Self::InvalidName(_) => None,
        }
    }
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
