//! Process-wide choice of the canonical backend.

use std::fs::File;
use std::path::Path;
use std::sync::OnceLock;

use filelock_core::error::LockResult;
use filelock_core::traits::{BackendKind, LockBackend};
use tracing::warn;

use crate::lock::BaseFileLock;
#[cfg(unix)]
use crate::posix::PosixBackend;
use crate::soft::SoftBackend;
#[cfg(windows)]
use crate::windows::WindowsBackend;

/// The host's best lock. Prefer this over naming a concrete variant.
pub type FileLock = BaseFileLock<PlatformBackend>;

/// `flock(2)` based lock.
#[cfg(unix)]
pub type PosixFileLock = BaseFileLock<PosixBackend>;

/// `LockFileEx` based lock.
#[cfg(windows)]
pub type WindowsFileLock = BaseFileLock<WindowsBackend>;

/// Exclusive-create based lock, available everywhere.
pub type SoftFileLock = BaseFileLock<SoftBackend>;

static SELECTED: OnceLock<BackendKind> = OnceLock::new();

/// Returns the backend [`FileLock`] uses on this host.
///
/// Decided once per process. Windows gets `LockFileEx`, Unix gets `flock`;
/// targets that are neither fall back to the soft backend, which logs a
/// warning the first time.
pub fn selected_backend() -> BackendKind {
    *SELECTED.get_or_init(|| announce(decide(cfg!(windows), cfg!(unix))))
}

fn decide(windows: bool, unix: bool) -> BackendKind {
    if windows {
        BackendKind::Windows
    } else if unix {
        BackendKind::Posix
    } else {
        BackendKind::Soft
    }
}

/// Logs the fallback; returns `kind` unchanged.
fn announce(kind: BackendKind) -> BackendKind {
    if kind == BackendKind::Soft {
        warn!("no native file locking primitive available, using soft file locks only");
    }
    kind
}

/// Backend chosen by [`selected_backend`].
#[derive(Debug, Clone, Copy)]
pub struct PlatformBackend {
    inner: Inner,
}

#[derive(Debug, Clone, Copy)]
enum Inner {
    #[cfg(unix)]
    Posix(PosixBackend),
    #[cfg(windows)]
    Windows(WindowsBackend),
    Soft(SoftBackend),
}

impl Default for PlatformBackend {
    fn default() -> Self {
        let inner = match selected_backend() {
            #[cfg(unix)]
            BackendKind::Posix => Inner::Posix(PosixBackend),
            #[cfg(windows)]
            BackendKind::Windows => Inner::Windows(WindowsBackend),
            _ => Inner::Soft(SoftBackend),
        };
        Self { inner }
    }
}

impl LockBackend for PlatformBackend {
    fn kind(&self) -> BackendKind {
        match &self.inner {
            #[cfg(unix)]
            Inner::Posix(backend) => backend.kind(),
            #[cfg(windows)]
            Inner::Windows(backend) => backend.kind(),
            Inner::Soft(backend) => backend.kind(),
        }
    }

    fn try_acquire(&self, path: &Path, mode: u32) -> LockResult<Option<File>> {
        match &self.inner {
            #[cfg(unix)]
            Inner::Posix(backend) => backend.try_acquire(path, mode),
            #[cfg(windows)]
            Inner::Windows(backend) => backend.try_acquire(path, mode),
            Inner::Soft(backend) => backend.try_acquire(path, mode),
        }
    }

    fn release(&self, path: &Path, file: File) {
        match &self.inner {
            #[cfg(unix)]
            Inner::Posix(backend) => backend.release(path, file),
            #[cfg(windows)]
            Inner::Windows(backend) => backend.release(path, file),
            Inner::Soft(backend) => backend.release(path, file),
        }
    }
}
