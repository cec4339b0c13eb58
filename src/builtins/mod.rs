//! Builtin commands.
//!
//! Every builtin follows one contract: run with a full argv (its own name at
//! index 0) against the shell state and return a status code. The executor
//! calls through here directly for a lone, redirection-free builtin, or from
//! inside a forked stage when the invocation is piped or redirected.

mod activities;
mod hop;
mod log;
mod ping;
mod reveal;

use crate::jobs;
use crate::shell::Shell;

const BUILTINS: &[&str] = &[
    "hop",
    "cd",
    "reveal",
    "ping",
    "log",
    "activities",
    "fg",
    "bg",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Dispatch on argv[0]; `None` when the name is not a builtin.
pub fn run(shell: &mut Shell, argv: &[String]) -> Option<i32> {
    let status = match argv.first().map(String::as_str)? {
        "hop" => hop::run_hop(shell, argv),
        "cd" => hop::run_cd(shell, argv),
        "reveal" => reveal::run(shell, argv),
        "ping" => ping::run(argv),
        "log" => log::run(shell, argv),
        "activities" => activities::run(shell, argv),
        "fg" => jobs::fg(shell, job_number_arg(argv)),
        "bg" => jobs::bg(shell, job_number_arg(argv)),
        _ => return None,
    };
    Some(status)
}

fn job_number_arg(argv: &[String]) -> Option<u32> {
    // Unparsable or zero arguments fall back to the most recent job.
    argv.get(1).and_then(|s| s.parse().ok()).filter(|&n| n != 0)
}
