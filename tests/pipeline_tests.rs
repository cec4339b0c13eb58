//! Pipeline execution: piping, exit-status propagation, `&&`/`;` chaining.

#[path = "common/mod.rs"]
mod common;

use common::run_script;
use predicates::prelude::*;

#[test]
fn runs_a_simple_command() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "echo hello\n")
        .success()
        .stdout(predicate::str::contains("hello"));
}

#[test]
fn pipes_connect_stages_in_order() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "echo hello | tr a-z A-Z\n")
        .success()
        .stdout(predicate::str::contains("HELLO"));
}

#[test]
fn pipeline_status_is_the_final_stage_only() {
    let dir = tempfile::tempdir().unwrap();
    // The middle stage's success must not mask the failing final stage.
    run_script(dir.path(), "false | true | false && echo nope\n")
        .success()
        .stdout(predicate::str::contains("nope").not());
    // And a clean final stage hides earlier failures.
    run_script(dir.path(), "true | false | true && echo yep\n")
        .success()
        .stdout(predicate::str::contains("yep"));
}

#[test]
fn and_then_short_circuits_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "false && echo skipped\n")
        .success()
        .stdout(predicate::str::contains("skipped").not());
    run_script(dir.path(), "true && echo ran\n")
        .success()
        .stdout(predicate::str::contains("ran"));
}

#[test]
fn failed_and_chain_resumes_after_semicolon() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "false && echo a && echo b ; echo c\n")
        .success()
        .stdout(
            predicate::str::contains("c")
                .and(predicate::str::contains("a").not())
                .and(predicate::str::contains("b").not()),
        );
}

#[test]
fn semicolon_runs_groups_in_sequence() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "echo first ; echo second\n")
        .success()
        .stdout(predicate::str::contains("first").and(predicate::str::contains("second")));
}

#[test]
fn unknown_commands_report_and_exit_127() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "definitely_not_a_command_qq\n")
        .success()
        .stderr(predicate::str::contains("Command not found!"));
}

#[test]
fn failing_stage_does_not_abort_siblings() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "definitely_not_a_command_qq | echo survived\n")
        .success()
        .stdout(predicate::str::contains("survived"))
        .stderr(predicate::str::contains("Command not found!"));
}

#[test]
fn malformed_lines_print_invalid_syntax() {
    let dir = tempfile::tempdir().unwrap();
    run_script(dir.path(), "| ls\n")
        .success()
        .stdout(predicate::str::contains("Invalid Syntax!"));
    run_script(dir.path(), "echo hi |\n")
        .success()
        .stdout(predicate::str::contains("Invalid Syntax!"));
}

#[test]
fn stage_limit_reports_resource_error() {
    let dir = tempfile::tempdir().unwrap();
    let line = vec!["true"; 17].join(" | ");
    run_script(dir.path(), &format!("{line}\n"))
        .success()
        .stderr(predicate::str::contains("too many pipeline stages (max 16)"));
}
