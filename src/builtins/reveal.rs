//! `reveal`: a minimal sorted directory listing.
//!
//! Usage: `reveal [-a] [-l] [path]`. `-a` includes hidden entries, `-l`
//! prints one per line; otherwise entries go space-separated on one line.
//! Path arguments follow the same rules as `hop`, including `-` for the
//! previous working directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::shell::Shell;

pub fn run(shell: &Shell, argv: &[String]) -> i32 {
    let mut show_all = false;
    let mut line_by_line = false;
    let mut target: Option<&str> = None;

    for arg in &argv[1..] {
        // A bare `-` is a positional target, not a flag cluster.
        if let Some(flags) = arg.strip_prefix('-').filter(|f| !f.is_empty()) {
            for flag in flags.chars() {
                match flag {
                    'a' => show_all = true,
                    'l' => line_by_line = true,
                    _ => {
                        println!("reveal: Invalid Syntax!");
                        return 1;
                    }
                }
            }
            continue;
        }
        if target.is_some() {
            println!("reveal: Invalid Syntax!");
            return 1;
        }
        target = Some(arg);
    }

    let path: PathBuf = match target {
        None | Some(".") => PathBuf::from("."),
        Some("~") => shell.home.clone(),
        Some("..") => PathBuf::from(".."),
        Some("-") => match &shell.prev_cwd {
            Some(prev) => prev.clone(),
            None => {
                println!("No such directory!");
                return 1;
            }
        },
        Some(path) => PathBuf::from(path),
    };

    list_dir(&path, show_all, line_by_line);
    0
}

fn list_dir(path: &Path, show_all: bool, line_by_line: bool) {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(_) => {
            println!("No such directory!");
            return;
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| show_all || !name.starts_with('.'))
        .collect();
    names.sort();

    if line_by_line {
        for name in &names {
            println!("{name}");
        }
    } else if !names.is_empty() {
        println!("{}", names.join(" "));
    }
}
