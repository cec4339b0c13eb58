//! The job table and background poller.
//!
//! A job is one pipeline whose stages share a process group, tracked from
//! launch (or demotion out of the foreground) until every stage has
//! finished. State changes are discovered by polling with
//! `waitpid(WNOHANG | WUNTRACED | WCONTINUED)` once per main-loop iteration;
//! there is no asynchronous child notification, so completion messages are
//! flushed at well-defined points around each prompt cycle.
//!
//! Job numbers come from a strictly increasing counter starting at 1 and are
//! never reused, even after a job is removed.

use nix::sys::signal::{killpg, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::executor::{self, WaitOutcome, STOPPED_STATUS};
use crate::shell::Shell;

/// Tracking record for one pipeline stage.
#[derive(Debug, Clone)]
pub struct StageStatus {
    pub pid: Pid,
    /// Display name for the stage, normally its argv[0].
    pub name: String,
    pub finished: bool,
    pub stopped: bool,
}

impl StageStatus {
    pub fn new(pid: Pid, name: String) -> Self {
        StageStatus {
            pid,
            name,
            finished: false,
            stopped: false,
        }
    }

    /// Non-blocking status check with stop/continue visibility, updating the
    /// stage flags in place.
    pub(crate) fn check(&mut self) -> StageEvent {
        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        match waitpid(self.pid, Some(flags)) {
            Ok(WaitStatus::StillAlive) => StageEvent::Running,
            Ok(WaitStatus::Stopped(..)) => {
                self.stopped = true;
                StageEvent::Stopped
            }
            Ok(WaitStatus::Continued(..)) => {
                self.stopped = false;
                StageEvent::Continued
            }
            Ok(WaitStatus::Exited(_, code)) => {
                self.finished = true;
                self.stopped = false;
                StageEvent::Exited(code)
            }
            Ok(WaitStatus::Signaled(..)) => {
                self.finished = true;
                self.stopped = false;
                StageEvent::Exited(1)
            }
            Ok(_) => StageEvent::Running,
            // The child is already gone; count it as finished so the job can
            // still drain.
            Err(_) => {
                self.finished = true;
                self.stopped = false;
                StageEvent::Exited(1)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageEvent {
    Running,
    Stopped,
    Continued,
    Exited(i32),
}

/// The transient record of the pipeline currently owning the terminal.
/// At most one exists, only while a synchronous pipeline or an `fg`
/// resumption is in flight; it is cleared unconditionally afterwards.
#[derive(Debug)]
pub struct ForegroundJob {
    pub pgid: Pid,
    pub pids: Vec<Pid>,
    pub display_name: String,
}

/// One background or stopped job.
#[derive(Debug)]
pub struct Job {
    pub number: u32,
    pub stages: Vec<StageStatus>,
    pub display_name: String,
    /// Classification of the final stage: 0 for a clean exit, 1 otherwise.
    pub last_status: i32,
}

impl Job {
    /// The pipeline's process group: the first stage's pid.
    pub fn pgid(&self) -> Pid {
        self.stages[0].pid
    }

    pub fn last_pid(&self) -> Pid {
        self.stages[self.stages.len() - 1].pid
    }

    /// Fully finished, independent of stage stop history.
    pub fn finished(&self) -> bool {
        self.stages.iter().all(|s| s.finished)
    }

    /// Stopped for display purposes: at least one unfinished stage stopped.
    pub fn any_stopped(&self) -> bool {
        self.stages.iter().any(|s| !s.finished && s.stopped)
    }
}

/// Registry of background and stopped jobs, owned by the shell and polled
/// once per main-loop iteration.
#[derive(Debug)]
pub struct JobTable {
    jobs: Vec<Job>,
    next_number: u32,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    pub fn new() -> Self {
        JobTable {
            jobs: Vec::new(),
            next_number: 1,
        }
    }

    /// Adopt a launched pipeline's stages as a new job and return its number.
    pub fn add(&mut self, stages: Vec<StageStatus>, display_name: String) -> u32 {
        let number = self.next_number;
        self.next_number += 1;
        self.jobs.push(Job {
            number,
            stages,
            display_name,
            last_status: 0,
        });
        number
    }

    /// Look up a job by number, or the most recently registered one.
    pub fn get(&mut self, number: Option<u32>) -> Option<&mut Job> {
        match number {
            Some(n) => self.jobs.iter_mut().find(|j| j.number == n),
            None => self.jobs.last_mut(),
        }
    }

    pub fn remove(&mut self, number: u32) -> Option<Job> {
        let idx = self.jobs.iter().position(|j| j.number == number)?;
        Some(self.jobs.remove(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Check every unfinished stage of every job once. Jobs whose stages
    /// have all finished print their completion message and leave the table.
    pub fn poll(&mut self) {
        let mut i = 0;
        while i < self.jobs.len() {
            let job = &mut self.jobs[i];
            let last = job.stages.len().saturating_sub(1);
            for (si, stage) in job.stages.iter_mut().enumerate() {
                if stage.finished {
                    continue;
                }
                if let StageEvent::Exited(code) = stage.check() {
                    if si == last {
                        job.last_status = if code == 0 { 0 } else { 1 };
                    }
                }
            }
            if job.finished() {
                let verdict = if job.last_status == 0 {
                    "normally"
                } else {
                    "abnormally"
                };
                println!(
                    "{} with pid {} exited {}",
                    job.display_name,
                    job.last_pid(),
                    verdict
                );
                self.jobs.remove(i);
            } else {
                i += 1;
            }
        }
    }

    /// Visit `(pid, stage name, stopped)` for every unfinished stage, in
    /// job-then-stage order. The accumulator lives with the caller.
    pub fn for_each_active<F: FnMut(Pid, &str, bool)>(&self, mut visit: F) {
        for job in &self.jobs {
            for stage in &job.stages {
                if stage.finished {
                    continue;
                }
                visit(stage.pid, &stage.name, stage.stopped);
            }
        }
    }
}

/// The `fg` builtin: print the job's command line, hand it the terminal,
/// continue it if stopped, and wait with the foreground wait loop against
/// the job's own table entry.
pub fn fg(shell: &mut Shell, number: Option<u32>) -> i32 {
    let (number, pgid, display_name, pids, need_cont) = match shell.jobs.get(number) {
        Some(job) => (
            job.number,
            job.pgid(),
            job.display_name.clone(),
            job.stages.iter().map(|s| s.pid).collect::<Vec<_>>(),
            job.any_stopped(),
        ),
        None => {
            println!("No such job");
            return 1;
        }
    };

    println!("{}", display_name);
    shell.foreground = Some(ForegroundJob {
        pgid,
        pids,
        display_name: display_name.clone(),
    });
    executor::give_terminal(pgid);
    if need_cont {
        let _ = killpg(pgid, Signal::SIGCONT);
    }

    let outcome = match shell.jobs.get(Some(number)) {
        Some(job) => executor::wait_stages(&mut job.stages),
        None => WaitOutcome::Completed(0),
    };
    executor::reclaim_terminal();
    shell.foreground = None;

    match outcome {
        WaitOutcome::Stopped => {
            println!("[{}] Stopped {}", number, display_name);
            STOPPED_STATUS
        }
        WaitOutcome::Completed(code) => {
            shell.jobs.remove(number);
            code
        }
    }
}

/// The `bg` builtin: continue a stopped job in the background.
pub fn bg(shell: &mut Shell, number: Option<u32>) -> i32 {
    let Some(job) = shell.jobs.get(number) else {
        println!("No such job");
        return 1;
    };
    if !job.any_stopped() {
        println!("Job already running");
        return 1;
    }
    let _ = killpg(job.pgid(), Signal::SIGCONT);
    for stage in &mut job.stages {
        stage.stopped = false;
    }
    println!("[{}] {} &", job.number, job.display_name);
    0
}
