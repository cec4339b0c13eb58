//! Directory navigation: `hop` and `cd`.
//!
//! `hop` takes any number of targets and moves through them one by one;
//! `cd` is the classic single-argument form. Both share the same target
//! rules: `~` is the shell home (the directory the shell started in), `.`
//! is a no-op, `..` the parent, `-` the previous working directory, and
//! anything else a path. The previous directory also backs `reveal -`.

use std::env;
use std::path::Path;

use crate::shell::Shell;

/// chdir to `target`, recording the previous working directory on success.
fn change_dir(shell: &mut Shell, target: &Path) -> bool {
    let before = env::current_dir().ok();
    if env::set_current_dir(target).is_err() {
        println!("No such directory!");
        return false;
    }
    if let Some(before) = before {
        shell.prev_cwd = Some(before);
    }
    true
}

/// Go back to the previous directory, swapping it with the current one.
/// Returns false when no previous directory has been recorded yet.
fn swap_previous(shell: &mut Shell) -> bool {
    let Some(prev) = shell.prev_cwd.clone() else {
        return false;
    };
    let Ok(current) = env::current_dir() else {
        return false;
    };
    if env::set_current_dir(&prev).is_ok() {
        shell.prev_cwd = Some(current);
    }
    true
}

fn hop_one(shell: &mut Shell, arg: &str) {
    match arg {
        "~" => {
            let home = shell.home.clone();
            change_dir(shell, &home);
        }
        "." => {}
        ".." => {
            change_dir(shell, Path::new(".."));
        }
        "-" => {
            swap_previous(shell);
        }
        path => {
            change_dir(shell, Path::new(path));
        }
    }
}

pub fn run_hop(shell: &mut Shell, argv: &[String]) -> i32 {
    if argv.len() == 1 {
        let home = shell.home.clone();
        change_dir(shell, &home);
        return 0;
    }
    for arg in &argv[1..] {
        hop_one(shell, arg);
    }
    0
}

pub fn run_cd(shell: &mut Shell, argv: &[String]) -> i32 {
    if argv.len() > 2 {
        println!("cd: too many arguments");
        return 1;
    }
    match argv.get(1).map(String::as_str) {
        None | Some("~") => {
            let home = shell.home.clone();
            change_dir(shell, &home);
            0
        }
        Some(".") => 0,
        Some("..") => {
            change_dir(shell, Path::new(".."));
            0
        }
        Some("-") => {
            if swap_previous(shell) {
                0
            } else {
                println!("No such directory!");
                1
            }
        }
        Some(path) => {
            change_dir(shell, Path::new(path));
            0
        }
    }
}
