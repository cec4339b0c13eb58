//! `activities`: list every tracked running or stopped pipeline stage.

use crate::shell::Shell;

pub fn run(shell: &Shell, _argv: &[String]) -> i32 {
    let mut entries: Vec<(i32, String, bool)> = Vec::new();
    shell.jobs.for_each_active(|pid, name, stopped| {
        entries.push((pid.as_raw(), name.to_string(), stopped));
    });

    entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
    for (pid, name, stopped) in entries {
        let state = if stopped { "Stopped" } else { "Running" };
        println!("[{pid}] : {name} - {state}");
    }
    0
}
