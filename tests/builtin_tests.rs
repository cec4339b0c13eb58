//! Builtins: hop/cd navigation, reveal listings, log history, ping.

#[path = "common/mod.rs"]
mod common;

use std::fs;

use common::{run_script, stdout_of};
use predicates::prelude::*;

#[test]
fn hop_changes_the_shell_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    run_script(dir.path(), "hop sub\npwd\n")
        .success()
        .stdout(predicate::str::contains("/sub"));
}

#[test]
fn hop_walks_multiple_targets_in_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a/b")).unwrap();
    run_script(dir.path(), "hop a b ..\npwd\n")
        .success()
        .stdout(predicate::str::contains("/a\n"));
}

#[test]
fn cd_dash_returns_to_previous_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let root = dir.path().canonicalize().unwrap();
    let output = stdout_of(run_script(dir.path(), "cd sub\ncd -\npwd\n").success());
    let lines: Vec<&str> = output.lines().collect();
    assert!(
        lines.contains(&root.to_str().unwrap()),
        "expected to be back in {}, got: {output}",
        root.display()
    );
    assert!(!lines.contains(&root.join("sub").to_str().unwrap()));
}

#[test]
fn cd_rejects_extra_arguments() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "cd a b\n")
        .success()
        .stdout(predicate::str::contains("cd: too many arguments"));
}

#[test]
fn missing_directory_prints_fixed_message() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "cd nowhere_qq\n")
        .success()
        .stdout(predicate::str::contains("No such directory!"));
    run_script(dir.path(), "reveal nowhere_qq\n")
        .success()
        .stdout(predicate::str::contains("No such directory!"));
}

#[test]
fn reveal_sorts_and_hides_dotfiles() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "").unwrap();
    fs::write(dir.path().join("a.txt"), "").unwrap();
    fs::write(dir.path().join(".hidden"), "").unwrap();
    run_script(dir.path(), "reveal -l\n")
        .success()
        .stdout(
            predicate::str::contains("a.txt\nb.txt")
                .and(predicate::str::contains(".hidden").not()),
        );
    run_script(dir.path(), "reveal -a -l\n")
        .success()
        .stdout(predicate::str::contains(".hidden"));
}

#[test]
fn reveal_rejects_unknown_flags() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "reveal -z\n")
        .success()
        .stdout(predicate::str::contains("reveal: Invalid Syntax!"));
}

#[test]
fn reveal_participates_in_pipes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("needle.txt"), "").unwrap();
    run_script(dir.path(), "reveal -l | grep needle\n")
        .success()
        .stdout(predicate::str::contains("needle.txt"));
}

#[test]
fn log_lists_stored_commands_without_storing_itself() {
    let dir = tempfile::tempdir().unwrap();
    let output = stdout_of(run_script(dir.path(), "echo dup\necho dup\nlog\n").success());
    // Stored once despite being typed twice, and the `log` line itself is
    // never stored.
    assert_eq!(output.matches("echo dup").count(), 1);
    assert_eq!(output.matches("log").count(), 1); // just the logout line
}

#[test]
fn log_execute_reruns_a_stored_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = stdout_of(run_script(dir.path(), "echo alpha\nlog execute 1\n").success());
    assert!(output.matches("alpha").count() >= 2, "got: {output}");
}

#[test]
fn log_purge_clears_history() {
    let dir = tempfile::tempdir().unwrap();
    let output = stdout_of(run_script(dir.path(), "echo keepme\nlog purge\nlog\n").success());
    assert_eq!(output.matches("echo keepme").count(), 0);
}

#[test]
fn ping_validates_its_arguments() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "ping 1\n")
        .success()
        .stdout(predicate::str::contains("ping: Invalid Syntax!"));
    run_script(dir.path(), "ping notapid 9\n")
        .success()
        .stdout(predicate::str::contains("No such process found"));
}

#[test]
fn ping_reports_missing_processes() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "ping 3999999 0\n")
        .success()
        .stdout(predicate::str::contains("No such process found"));
}

#[test]
fn builtins_run_forked_when_redirected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("z.txt"), "").unwrap();
    run_script(dir.path(), "reveal -l > listing.txt\n").success();
    let listing = fs::read_to_string(dir.path().join("listing.txt")).unwrap();
    assert!(listing.contains("z.txt"));
}
