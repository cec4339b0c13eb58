//! `log`: the command-history builtin.
//!
//! `log` prints the stored history oldest to newest, `log purge` clears it,
//! and `log execute <n>` re-runs the n-th most recent entry (1 = newest)
//! through the executor without storing it again.

use crate::executor;
use crate::shell::Shell;

pub fn run(shell: &mut Shell, argv: &[String]) -> i32 {
    match argv.len() {
        1 => {
            for entry in shell.history.entries() {
                println!("{entry}");
            }
            0
        }
        2 if argv[1] == "purge" => {
            shell.history.purge();
            0
        }
        3 if argv[1] == "execute" => {
            let Ok(index) = argv[2].parse::<i64>() else {
                println!("log: Invalid Syntax!");
                return 1;
            };
            if index <= 0 {
                return 1;
            }
            match shell.history.nth_most_recent(index as usize) {
                Some(line) => executor::execute_line(shell, &line),
                None => 1,
            }
        }
        _ => {
            println!("log: Invalid Syntax!");
            1
        }
    }
}
