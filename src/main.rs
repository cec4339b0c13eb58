use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use nix::sys::signal::{kill, Signal};
use nix::unistd::{getpid, setpgid};

use hopsh::executor;
use hopsh::parser;
use hopsh::prompt::Prompt;
use hopsh::shell::Shell;
use hopsh::signals;

fn main() {
    signals::install_shell_handlers();

    // Put the shell in its own process group and take the terminal, so
    // foreground handoff works and the shell itself is never stopped.
    let shell_pgid = getpid();
    let _ = setpgid(shell_pgid, shell_pgid);
    executor::reclaim_terminal();

    let mut shell = Shell::new();
    let prompt = Prompt::new();
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("hopsh: {err}");
            std::process::exit(1);
        }
    };

    loop {
        // Background jobs are polled before the prompt and again right after
        // a line is read, so completion messages always land before the next
        // command's own output.
        shell.jobs.poll();
        signals::take_interrupt();

        let prompt_text = prompt.render(&shell.home, std::env::current_dir().ok().as_deref());
        match editor.readline(&prompt_text) {
            Ok(line) => {
                shell.jobs.poll();
                if line.trim().is_empty() {
                    continue;
                }
                if !parser::validate(&line) {
                    println!("Invalid Syntax!");
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                shell.history.maybe_store(&line);
                executor::execute_line(&mut shell, &line);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                // Ctrl-D: kill everything still tracked and leave cleanly.
                println!("logout");
                let mut doomed = Vec::new();
                shell.jobs.for_each_active(|pid, _, _| doomed.push(pid));
                for pid in doomed {
                    let _ = kill(pid, Signal::SIGKILL);
                }
                break;
            }
            Err(err) => {
                eprintln!("hopsh: {err}");
                break;
            }
        }
    }
}
