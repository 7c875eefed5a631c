//! OS backends and the reentrant handle for file locks.
//!
//! - [`PosixBackend`] uses `flock(2)` (Unix)
//! - [`WindowsBackend`] uses `LockFileEx` on the first byte (Windows)
//! - [`SoftBackend`] uses exclusive file creation (everywhere)
//!
//! [`FileLock`] picks the best of them for the host.

pub mod builder;
pub mod lock;
pub mod name;
mod open;
#[cfg(unix)]
pub mod posix;
pub mod provider;
pub mod proxy;
pub mod selector;
pub mod soft;
#[cfg(windows)]
pub mod windows;

pub use builder::FileLockBuilder;
pub use lock::{BaseFileLock, DEFAULT_MODE, DEFAULT_POLL_INTERVAL};
#[cfg(unix)]
pub use posix::PosixBackend;
pub use provider::{FileLockProvider, FileLockProviderBuilder};
pub use proxy::AcquireProxy;
#[cfg(unix)]
pub use selector::PosixFileLock;
#[cfg(windows)]
pub use selector::WindowsFileLock;
pub use selector::{FileLock, PlatformBackend, SoftFileLock, selected_backend};
pub use soft::SoftBackend;
#[cfg(windows)]
pub use windows::WindowsBackend;
