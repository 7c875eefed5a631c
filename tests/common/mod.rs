//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mock_backend;

/// Routes `tracing` output through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Re-runs a single test of the current test binary in a child process.
///
/// The child sees `envs` and nothing else differs; it reports success only if
/// exactly that test ran and passed.
pub fn run_test_in_child(
    test_name: &str,
    envs: &[(&str, &std::ffi::OsStr)],
) -> std::process::Output {
    let exe = std::env::current_exe().unwrap();
    child_command(&exe, test_name, envs).output().unwrap()
}

/// Builds the command used by [`run_test_in_child`] without running it.
pub fn child_command(
    exe: &std::path::Path,
    test_name: &str,
    envs: &[(&str, &std::ffi::OsStr)],
) -> std::process::Command {
    let mut command = std::process::Command::new(exe);
    command.args([test_name, "--exact", "--nocapture", "--test-threads=1"]);
    for (key, value) in envs {
        command.env(key, value);
    }
    command
}

/// Asserts that a child started by [`run_test_in_child`] ran its test and passed.
pub fn assert_child_passed(output: &std::process::Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "child failed:\n{stdout}\n{stderr}");
    assert!(stdout.contains("1 passed"), "child ran no test:\n{stdout}");
}
