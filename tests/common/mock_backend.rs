//! Mock backend for driving the handle state machine.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use filelock_core::error::{LockError, LockResult};
use filelock_core::traits::{BackendKind, LockBackend};

#[derive(Default)]
struct MockState {
    held: Mutex<bool>,
    fail_next: Mutex<Option<io::ErrorKind>>,
    attempts: AtomicUsize,
    releases: AtomicUsize,
}

/// In-memory lock shared by every clone of the backend.
///
/// Clones behave like handles in different processes: only one of them can
/// hold the lock at a time.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `try_acquire` fail with an OS error of `kind`.
    pub fn fail_next(&self, kind: io::ErrorKind) {
        *self.state.fail_next.lock().unwrap() = Some(kind);
    }

    /// Pretends another process holds (or dropped) the lock.
    pub fn set_held(&self, held: bool) {
        *self.state.held.lock().unwrap() = held;
    }

    pub fn is_held(&self) -> bool {
        *self.state.held.lock().unwrap()
    }

    pub fn attempts(&self) -> usize {
        self.state.attempts.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.state.releases.load(Ordering::SeqCst)
    }
}

impl LockBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Soft
    }

    fn try_acquire(&self, path: &Path, _mode: u32) -> LockResult<Option<File>> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(kind) = self.state.fail_next.lock().unwrap().take() {
            return Err(LockError::from_io(path, io::Error::from(kind)));
        }

        let mut held = self.state.held.lock().unwrap();
        if *held {
            return Ok(None);
        }

        let file = tempfile::tempfile().map_err(|e| LockError::from_io(path, e))?;
        *held = true;
        Ok(Some(file))
    }

    fn release(&self, _path: &Path, file: File) {
        drop(file);
        *self.state.held.lock().unwrap() = false;
        self.state.releases.fetch_add(1, Ordering::SeqCst);
    }
}
