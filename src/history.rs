//! Persistent command history backing the `log` builtin.
//!
//! A 15-entry ring persisted one command per line. Consecutive duplicates
//! are not stored, and neither is any line that names `log` in a command
//! position anywhere in it.

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

use crate::lexer::{lex, Token};

const CAPACITY: usize = 15;

#[derive(Debug)]
pub struct History {
    entries: VecDeque<String>,
    path: PathBuf,
}

impl History {
    /// Load history from `$HOME/.hopsh_history`, falling back to the current
    /// directory when HOME is unset.
    pub fn load() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self::load_from(PathBuf::from(home).join(".hopsh_history"))
    }

    pub fn load_from(path: PathBuf) -> Self {
        let mut entries = VecDeque::with_capacity(CAPACITY);
        if let Ok(contents) = fs::read_to_string(&path) {
            for line in contents.lines() {
                if line.is_empty() {
                    continue;
                }
                if entries.len() == CAPACITY {
                    entries.pop_front();
                }
                entries.push_back(line.to_string());
            }
        }
        History { entries, path }
    }

    /// Stored commands, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The n-th most recent entry, 1 = newest.
    pub fn nth_most_recent(&self, n: usize) -> Option<String> {
        if n == 0 {
            return None;
        }
        self.entries.iter().rev().nth(n - 1).cloned()
    }

    /// Store a typed line, subject to the filtering rules.
    pub fn maybe_store(&mut self, line: &str) {
        let trimmed = line.trim_end_matches(|c| c == '\n' || c == '\r');
        if trimmed.is_empty() || invokes_log(trimmed) {
            return;
        }
        if self.entries.back().map(String::as_str) == Some(trimmed) {
            return;
        }
        if self.entries.len() == CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(trimmed.to_string());
        self.save();
    }

    pub fn purge(&mut self) {
        self.entries.clear();
        self.save();
    }

    fn save(&self) {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        let _ = fs::write(&self.path, out);
    }
}

/// True when any command position in the line names `log`: the first word of
/// the line and every word following `|`, `;`, `&`, or `&&`. Redirection
/// targets don't count.
fn invokes_log(line: &str) -> bool {
    let Ok(tokens) = lex(line) else {
        return false;
    };
    let mut command_position = true;
    let mut skip_filename = false;
    for token in &tokens {
        match token {
            Token::Word(word) => {
                if skip_filename {
                    skip_filename = false;
                    continue;
                }
                if command_position {
                    if word == "log" {
                        return true;
                    }
                    command_position = false;
                }
            }
            Token::RedirIn | Token::RedirOut | Token::RedirAppend => skip_filename = true,
            Token::Pipe | Token::Semi | Token::Background | Token::AndIf => {
                command_position = true;
                skip_filename = false;
            }
        }
    }
    false
}
