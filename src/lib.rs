//! Reentrant, timeout-capable, cross-platform file locks.
//!
//! A [`FileLock`] guards a path against every other handle on that path, in
//! this process or another one. Acquisitions on the same handle nest; the OS
//! lock goes away when the last of them is released.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use filelock::*;
//!
//! fn main() -> Result<(), LockError> {
//!     let lock = FileLock::with_timeout("/tmp/my-resource.lock", 5.0);
//!
//!     {
//!         let _guard = lock.acquire(None)?;
//!         // Critical section - we have exclusive access
//!     }
//!
//!     // Waiting at most 100 ms this time
//!     match lock.acquire(Some(0.1.into())) {
//!         Ok(_guard) => println!("acquired"),
//!         Err(e) if e.is_timeout() => println!("{e}"),
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - `PosixFileLock`: `flock(2)`; the lock file is never deleted.
//! - `WindowsFileLock`: `LockFileEx` on the first byte; the file is removed on release.
//! - [`SoftFileLock`]: exclusive creation of the lock file; removed on release.
//!
//! [`FileLock`] is whichever of these [`selected_backend`] picked for the host.
//!
//! # Async
//!
//! ```rust,no_run
//! # use std::time::Duration;
//! # use filelock::*;
//! # async fn run() -> Result<(), LockError> {
//! let lock = FileLock::new("/tmp/my-resource.lock");
//! let guard = lock.acquire_async(None, Duration::from_millis(50)).await?;
//! guard.release();
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `filelock-core`: error, timeout and backend trait
//! - `filelock-os`: the handle, the proxy, the backends and the selector

// Re-export core types and traits
pub use filelock_core::*;

// Re-export the handle and backends
pub use filelock_os::*;
