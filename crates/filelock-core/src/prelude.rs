//! Convenience prelude for file lock types.

pub use crate::error::{LockError, LockResult};
pub use crate::timeout::TimeoutValue;
pub use crate::traits::{BackendKind, LockBackend};
