//! Shell state shared across the REPL, executor, and builtins.

use std::env;
use std::path::PathBuf;

use crate::history::History;
use crate::jobs::{ForegroundJob, JobTable};

/// Owner of everything that outlives a single command: the job table, the
/// transient foreground record, the directory tracking used by
/// `hop`/`cd`/`reveal`, and the command history. One instance exists for the
/// life of the shell process; forked children only ever see their own copy.
pub struct Shell {
    /// The shell's home: the directory it was started from.
    pub home: PathBuf,
    /// Previous working directory, set once a navigation builtin has moved.
    pub prev_cwd: Option<PathBuf>,
    pub jobs: JobTable,
    /// At most one synchronous pipeline owns the terminal at a time.
    pub foreground: Option<ForegroundJob>,
    pub history: History,
}

impl Shell {
    pub fn new() -> Self {
        Shell {
            home: env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
            prev_cwd: None,
            jobs: JobTable::new(),
            foreground: None,
            history: History::load(),
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}
