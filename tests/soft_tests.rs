//! Integration tests for the exclusive-create backend.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use filelock_core::error::LockError;
use filelock_core::timeout::TimeoutValue;
use filelock_core::traits::BackendKind;
use filelock_os::SoftFileLock;
use tempfile::TempDir;

mod common;

#[cfg(unix)]
fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

fn set_readonly(path: &Path, readonly: bool) {
    let mut perms = fs::metadata(path).unwrap().permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(readonly);
    fs::set_permissions(path, perms).unwrap();
}

#[test]
fn test_soft_lock_creates_and_removes_file() {
    common::init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("soft.lock");

    let lock = SoftFileLock::new(&path);
    assert_eq!(lock.backend_kind(), BackendKind::Soft);

    let proxy = lock.acquire(None).unwrap();
    assert!(path.exists());
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);

    drop(proxy);
    assert!(!lock.is_locked());
    assert!(!path.exists());
}

#[test]
fn test_soft_lock_excludes_other_handles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("excl.lock");

    let h1 = SoftFileLock::new(&path);
    let held = h1.acquire(None).unwrap();

    let h2 = SoftFileLock::new(&path);
    let err = h2.acquire(Some(0.1.into())).unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(
        err.to_string(),
        format!("The file lock '{}' could not be acquired.", path.display())
    );

    drop(held);
    let proxy = h2.acquire(Some(TimeoutValue::ZERO)).unwrap();
    assert!(proxy.is_locked());
}

#[test]
fn test_soft_reentry_keeps_single_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reentry.lock");
    let lock = SoftFileLock::new(&path);

    let outer = lock.acquire(None).unwrap();
    // A second exclusive create would collide; re-entry must not attempt one.
    let inner = lock.acquire(Some(TimeoutValue::ZERO)).unwrap();
    assert_eq!(lock.lock_counter(), 2);

    drop(inner);
    assert!(path.exists());
    drop(outer);
    assert!(!path.exists());
}

#[test]
fn test_read_only_lock_file_fails_immediately() {
    // Root may write any file, read-only or not.
    if is_root() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ro.lock");
    fs::write(&path, b"").unwrap();
    set_readonly(&path, true);

    let lock = SoftFileLock::new(&path);
    let start = Instant::now();
    let err = lock.acquire(None).unwrap_err();
    assert!(matches!(err, LockError::PermissionDenied { .. }));
    assert!(start.elapsed() < Duration::from_millis(50));
    assert!(!lock.is_locked());
    assert_eq!(lock.lock_counter(), 0);

    set_readonly(&path, false);
}

#[cfg(unix)]
const FOREIGN_LOCK_ENV: &str = "FILELOCK_FOREIGN_LOCK";

/// uid/gid of `nobody` on common Linux distributions.
#[cfg(unix)]
const NOBODY: u32 = 65534;

#[cfg(unix)]
#[test]
fn test_lock_file_of_another_user_fails_immediately() {
    use std::os::unix::fs::PermissionsExt;
    use std::os::unix::process::CommandExt;

    if let Some(path) = std::env::var_os(FOREIGN_LOCK_ENV) {
        // Child side, running unprivileged against a file owned by root.
        let lock = SoftFileLock::new(std::path::PathBuf::from(path));
        let start = Instant::now();
        let err = lock.acquire(None).unwrap_err();
        assert!(matches!(err, LockError::PermissionDenied { .. }), "{err:?}");
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(lock.lock_counter(), 0);
        return;
    }
    // Switching to another user needs root.
    if !is_root() {
        return;
    }

    let dir = tempfile::Builder::new().tempdir_in("/tmp").unwrap();
    fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
    let path = dir.path().join("foreign.lock");
    fs::write(&path, b"").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    // The build directory may not be reachable by `nobody`; run a copy.
    let exe = dir.path().join("soft_tests");
    fs::copy(std::env::current_exe().unwrap(), &exe).unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

    let mut command = common::child_command(
        &exe,
        "test_lock_file_of_another_user_fails_immediately",
        &[(FOREIGN_LOCK_ENV, path.as_os_str())],
    );
    command.current_dir(dir.path()).gid(NOBODY).uid(NOBODY);
    let output = match command.output() {
        Ok(output) => output,
        // e.g. /tmp mounted noexec
        Err(e) => {
            eprintln!("cannot run as another user: {e}");
            return;
        }
    };
    common::assert_child_passed(&output);
    assert!(path.exists());
}

#[test]
fn test_soft_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope").join("soft.lock");

    let lock = SoftFileLock::new(&path);
    let err = lock.acquire(None).unwrap_err();
    assert!(matches!(err, LockError::MissingDirectory { .. }));
    assert_eq!(lock.lock_counter(), 0);
}

#[test]
fn test_stale_soft_lock_blocks_until_removed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stale.lock");
    // Left behind by a crashed holder.
    fs::write(&path, b"").unwrap();

    let lock = SoftFileLock::new(&path);
    assert!(lock.try_acquire().unwrap().is_none());

    fs::remove_file(&path).unwrap();
    assert!(lock.try_acquire().unwrap().is_some());
}
