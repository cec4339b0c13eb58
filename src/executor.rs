//! Process launching and foreground control.
//!
//! A pipeline becomes one forked process per stage, all joined into a single
//! process group so the terminal driver can signal the whole pipeline at
//! once. Adjacent stages are connected with pipes; explicit redirections are
//! applied after the pipe wiring so they override it, and the last
//! redirection of a direction wins. Builtins run inside the forked stage so
//! they can take part in pipes and redirections; a lone builtin with no
//! redirections runs in the shell process itself so `hop`/`cd` can move the
//! shell's own directory.
//!
//! Synchronous pipelines are waited on with a polled non-blocking loop
//! rather than a single blocking wait: short sweeps of
//! `waitpid(WNOHANG | WUNTRACED | WCONTINUED)` with a sleep in between keep
//! stop detection responsive without a watcher thread. If any stage stops,
//! the whole pipeline is demoted into the job table as one stopped job and
//! the synchronous call returns [`STOPPED_STATUS`].

use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, IntoRawFd, RawFd};
use std::path::Path;
use std::thread;
use std::time::Duration;

use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{
    close, dup2, execvp, fork, getpgrp, getpid, pipe, setpgid, tcsetpgrp, ForkResult, Pid,
};
use thiserror::Error;

use crate::ast::{Connector, Pipeline, RedirKind, Stage};
use crate::builtins;
use crate::jobs::{ForegroundJob, StageEvent, StageStatus};
use crate::lexer::lex;
use crate::parser::{parse_pipeline, split_groups};
use crate::shell::Shell;
use crate::signals;

/// Sentinel status for a foreground pipeline that was stopped and demoted,
/// distinct from any normal exit code.
pub const STOPPED_STATUS: i32 = 148;

/// Delay between non-blocking wait sweeps.
const POLL_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("pipe: {0}")]
    Pipe(nix::Error),
    #[error("fork: {0}")]
    Fork(nix::Error),
}

/// How a pipeline is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Foreground,
    Background,
}

/// Result of launching a pipeline: per-stage tracking records plus the
/// process group they all joined.
pub struct Launched {
    pub pgid: Pid,
    pub stages: Vec<StageStatus>,
}

/// Outcome of waiting on a set of stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every stage finished; the value is the final stage's exit status.
    Completed(i32),
    /// At least one stage was stopped by a signal.
    Stopped,
}

/// Hand the terminal to a process group. Best-effort: without a controlling
/// terminal (scripts, tests) the call fails and the shell keeps going.
pub fn give_terminal(pgid: Pid) {
    let _ = tcsetpgrp(io::stdin().as_raw_fd(), pgid);
}

/// Take the terminal back for the shell's own process group.
pub fn reclaim_terminal() {
    let _ = tcsetpgrp(io::stdin().as_raw_fd(), getpgrp());
}

/// Fork one process per stage, wiring pipes, process group, and
/// redirections. Stages that fail to start after the first are reported and
/// skipped; the pipeline keeps whichever stages did start.
pub fn launch(
    shell: &mut Shell,
    pipeline: &Pipeline,
    mode: LaunchMode,
) -> Result<Launched, ExecError> {
    let count = pipeline.stages.len();
    let mut stages: Vec<StageStatus> = Vec::with_capacity(count);
    let mut pgid: Option<Pid> = None;
    let mut prev_read: Option<RawFd> = None;

    for (i, stage) in pipeline.stages.iter().enumerate() {
        let pipe_fds = if i + 1 < count {
            match pipe() {
                Ok((r, w)) => Some((r.into_raw_fd(), w.into_raw_fd())),
                Err(err) => {
                    if stages.is_empty() {
                        if let Some(fd) = prev_read {
                            let _ = close(fd);
                        }
                        return Err(ExecError::Pipe(err));
                    }
                    eprintln!("pipe: {err}");
                    break;
                }
            }
        } else {
            None
        };

        match unsafe { fork() } {
            Ok(ForkResult::Child) => run_stage_child(shell, stage, mode, pgid, prev_read, pipe_fds),
            Ok(ForkResult::Parent { child }) => {
                let group = *pgid.get_or_insert(child);
                // Mirror the child's own setpgid so the group exists before
                // the terminal is handed over, whichever side runs first.
                let _ = setpgid(child, group);
                stages.push(StageStatus::new(child, stage.name().to_string()));
                if let Some(fd) = prev_read.take() {
                    let _ = close(fd);
                }
                if let Some((r, w)) = pipe_fds {
                    let _ = close(w);
                    prev_read = Some(r);
                }
            }
            Err(err) => {
                if let Some((r, w)) = pipe_fds {
                    let _ = close(r);
                    let _ = close(w);
                }
                if stages.is_empty() {
                    if let Some(fd) = prev_read {
                        let _ = close(fd);
                    }
                    return Err(ExecError::Fork(err));
                }
                eprintln!("fork: {err}");
                break;
            }
        }
    }

    if let Some(fd) = prev_read {
        let _ = close(fd);
    }

    let pgid = pgid.unwrap_or_else(getpgrp);
    Ok(Launched { pgid, stages })
}

/// Everything the child does between fork and exec. Never returns.
fn run_stage_child(
    shell: &mut Shell,
    stage: &Stage,
    mode: LaunchMode,
    pgid: Option<Pid>,
    prev_read: Option<RawFd>,
    pipe_fds: Option<(RawFd, RawFd)>,
) -> ! {
    signals::reset_for_child();

    // Join the pipeline's group before anything can exec, so the terminal
    // driver can signal the whole pipeline atomically.
    let group = pgid.unwrap_or_else(getpid);
    let _ = setpgid(Pid::from_raw(0), group);

    if let Some(fd) = prev_read {
        let _ = dup2(fd, 0);
    }
    if let Some((_, w)) = pipe_fds {
        let _ = dup2(w, 1);
    }

    // Background stages must never contend for the terminal: stdin goes to
    // /dev/null unless a pipe or an explicit `<` already feeds it.
    if mode == LaunchMode::Background && prev_read.is_none() && !stage.input_redirected() {
        if let Ok(fd) = open(Path::new("/dev/null"), OFlag::O_RDONLY, Mode::empty()) {
            let _ = dup2(fd, 0);
            let _ = close(fd);
        }
    }

    // Redirections come after pipe wiring, in source order, so an explicit
    // redirection overrides its pipe and the last one of a direction wins.
    for redir in &stage.redirections {
        match redir.kind {
            RedirKind::Input => match open(Path::new(&redir.path), OFlag::O_RDONLY, Mode::empty()) {
                Ok(fd) => {
                    let _ = dup2(fd, 0);
                    let _ = close(fd);
                }
                Err(_) => {
                    eprintln!("No such file or directory");
                    unsafe { libc::_exit(1) }
                }
            },
            kind => {
                let disposition = if kind == RedirKind::OutputAppend {
                    OFlag::O_APPEND
                } else {
                    OFlag::O_TRUNC
                };
                let flags = OFlag::O_WRONLY | OFlag::O_CREAT | disposition;
                match open(Path::new(&redir.path), flags, Mode::from_bits_truncate(0o644)) {
                    Ok(fd) => {
                        let _ = dup2(fd, 1);
                        let _ = close(fd);
                    }
                    Err(_) => {
                        eprintln!("Unable to create file for writing");
                        unsafe { libc::_exit(1) }
                    }
                }
            }
        }
    }

    if let Some(fd) = prev_read {
        let _ = close(fd);
    }
    if let Some((r, w)) = pipe_fds {
        let _ = close(r);
        let _ = close(w);
    }

    // Builtins participate in pipes and redirections by running inside the
    // forked stage and exiting with their status.
    if let Some(status) = builtins::run(shell, &stage.argv) {
        let _ = io::stdout().flush();
        unsafe { libc::_exit(status) }
    }

    let argv: Vec<CString> = stage
        .argv
        .iter()
        .filter_map(|arg| CString::new(arg.as_str()).ok())
        .collect();
    if argv.len() == stage.argv.len() {
        let _ = execvp(&argv[0], &argv);
    }
    eprintln!("Command not found!");
    unsafe { libc::_exit(127) }
}

/// Poll every unfinished stage until all have finished or one stops.
pub fn wait_stages(stages: &mut [StageStatus]) -> WaitOutcome {
    let mut status_code = 0;
    let last = stages.len().saturating_sub(1);
    loop {
        let mut all_done = true;
        let mut saw_stop = false;
        for (i, stage) in stages.iter_mut().enumerate() {
            if stage.finished {
                continue;
            }
            match stage.check() {
                StageEvent::Exited(code) => {
                    if i == last {
                        status_code = code;
                    }
                }
                StageEvent::Stopped => {
                    saw_stop = true;
                    all_done = false;
                }
                StageEvent::Running | StageEvent::Continued => all_done = false,
            }
        }
        if saw_stop {
            return WaitOutcome::Stopped;
        }
        if all_done {
            return WaitOutcome::Completed(status_code);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Run a pipeline synchronously: launch, hand over the terminal, wait, and
/// either return the final stage's status or demote the stopped pipeline
/// into the job table.
pub fn run_foreground(shell: &mut Shell, pipeline: &Pipeline) -> i32 {
    let launched = match launch(shell, pipeline, LaunchMode::Foreground) {
        Ok(launched) => launched,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    if launched.stages.is_empty() {
        return 1;
    }

    let display_name = pipeline.stages[0].name().to_string();
    shell.foreground = Some(ForegroundJob {
        pgid: launched.pgid,
        pids: launched.stages.iter().map(|s| s.pid).collect(),
        display_name: display_name.clone(),
    });
    give_terminal(launched.pgid);

    let mut stages = launched.stages;
    let outcome = wait_stages(&mut stages);

    reclaim_terminal();
    shell.foreground = None;

    match outcome {
        WaitOutcome::Completed(code) => code,
        WaitOutcome::Stopped => {
            // The whole pipeline moves to the table as one stopped job, not
            // just the stage that stopped.
            let number = shell.jobs.add(stages, display_name.clone());
            println!("[{}] Stopped {}", number, display_name);
            STOPPED_STATUS
        }
    }
}

/// Launch a pipeline in the background and register it as a job, printing
/// the `[n] pid` acknowledgement. Returns without waiting.
pub fn run_background(shell: &mut Shell, pipeline: &Pipeline) {
    let launched = match launch(shell, pipeline, LaunchMode::Background) {
        Ok(launched) => launched,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    let mut stages = launched.stages;
    let last_pid = match stages.last() {
        Some(stage) => stage.pid,
        None => return,
    };

    // A lone command displays as typed (`sleep 5 &`); longer pipelines go by
    // their first stage's name.
    let display_name = if pipeline.stages.len() == 1 {
        let mut name = pipeline.stages[0].argv.join(" ");
        name.push_str(" &");
        name
    } else {
        pipeline.stages[0].name().to_string()
    };
    if pipeline.stages.len() == 1 {
        stages[0].name = display_name.clone();
    }

    let number = shell.jobs.add(stages, display_name);
    println!("[{}] {}", number, last_pid);
}

/// A lone builtin with no pipe and no redirections runs in the shell process
/// itself, so state like the current directory sticks. This is the only case
/// where a builtin is not an independent process.
fn run_builtin_direct(shell: &mut Shell, pipeline: &Pipeline) -> Option<i32> {
    if pipeline.stages.len() != 1 {
        return None;
    }
    let stage = &pipeline.stages[0];
    if !stage.redirections.is_empty() || !builtins::is_builtin(stage.name()) {
        return None;
    }
    builtins::run(shell, &stage.argv)
}

/// Run one validated input line: every `;`/`&`/`&&`-delimited command group
/// in order, backgrounding groups followed by `&` and short-circuiting after
/// a failed `&&` left-hand side until the next `;` or `&`.
pub fn execute_line(shell: &mut Shell, line: &str) -> i32 {
    let tokens = match lex(line) {
        Ok(tokens) => tokens,
        Err(_) => {
            println!("Invalid Syntax!");
            return 1;
        }
    };

    let mut last_status = 0;
    let mut prev = Connector::Sequence;
    for (group_tokens, connector) in split_groups(&tokens) {
        let skip = prev == Connector::AndThen && last_status != 0;
        prev = connector;
        if skip {
            continue;
        }

        match parse_pipeline(group_tokens) {
            Ok(pipeline) => {
                if connector == Connector::Background {
                    // Background launches leave the previous status alone.
                    run_background(shell, &pipeline);
                } else if let Some(status) = run_builtin_direct(shell, &pipeline) {
                    last_status = status;
                } else {
                    last_status = run_foreground(shell, &pipeline);
                }
            }
            Err(err) if err.is_resource_limit() => eprintln!("{err}"),
            Err(_) => println!("Invalid Syntax!"),
        }
    }
    last_status
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::{kill, Signal};
    use std::process::Command;

    fn spawn_stage(program: &str, args: &[&str]) -> StageStatus {
        let child = Command::new(program).args(args).spawn().unwrap();
        StageStatus::new(Pid::from_raw(child.id() as i32), program.to_string())
    }

    #[test]
    fn wait_stages_returns_final_stage_status() {
        let mut stages = vec![spawn_stage("true", &[]), spawn_stage("false", &[])];
        assert_eq!(wait_stages(&mut stages), WaitOutcome::Completed(1));
        assert!(stages.iter().all(|s| s.finished));

        let mut stages = vec![spawn_stage("false", &[]), spawn_stage("true", &[])];
        assert_eq!(wait_stages(&mut stages), WaitOutcome::Completed(0));
    }

    #[test]
    fn wait_stages_detects_a_stop_without_finishing() {
        let mut stages = vec![spawn_stage("sleep", &["5"])];
        let pid = stages[0].pid;
        kill(pid, Signal::SIGSTOP).unwrap();

        assert_eq!(wait_stages(&mut stages), WaitOutcome::Stopped);
        assert!(stages[0].stopped);
        assert!(!stages[0].finished);

        // Resuming and terminating drains the stage as an abnormal exit.
        kill(pid, Signal::SIGCONT).unwrap();
        kill(pid, Signal::SIGTERM).unwrap();
        assert_eq!(wait_stages(&mut stages), WaitOutcome::Completed(1));
        assert!(stages[0].finished);
        assert!(!stages[0].stopped);
    }
}
