//! Common test utilities for hopsh integration tests.

use std::path::Path;
use std::time::Duration;

use assert_cmd::assert::Assert;
use assert_cmd::Command;

/// Feed `script` to the shell on stdin inside `dir` and return the assert.
/// HOME is pointed at `dir` so history files stay inside the sandbox.
pub fn run_script(dir: &Path, script: &str) -> Assert {
    Command::cargo_bin("hopsh")
        .unwrap()
        .current_dir(dir)
        .env("HOME", dir)
        .timeout(Duration::from_secs(10))
        .write_stdin(script.to_string())
        .assert()
}

/// Stdout of a finished script run as a String.
#[allow(dead_code)]
pub fn stdout_of(assert: Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).to_string()
}
