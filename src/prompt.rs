//! Prompt rendering: `<user@host:path>` with the shell home shown as `~`.
//!
//! The shell's "home" is the directory it was started from, not the
//! account's HOME; descendants of it display as `~/rest`.

use std::env;
use std::path::Path;

pub struct Prompt {
    username: String,
    hostname: String,
}

impl Prompt {
    pub fn new() -> Self {
        let username = env::var("USER").unwrap_or_else(|_| "?".to_string());
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "host".to_string());
        Prompt { username, hostname }
    }

    /// Render the prompt for `cwd`, abbreviating `home` and its descendants.
    pub fn render(&self, home: &Path, cwd: Option<&Path>) -> String {
        let path = match cwd {
            Some(cwd) => shorten(home, cwd),
            None => "?".to_string(),
        };
        format!("<{}@{}:{}> ", self.username, self.hostname, path)
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}

fn shorten(home: &Path, cwd: &Path) -> String {
    if cwd == home {
        return "~".to_string();
    }
    match cwd.strip_prefix(home) {
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => cwd.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_itself_is_tilde() {
        assert_eq!(shorten(Path::new("/code"), Path::new("/code")), "~");
    }

    #[test]
    fn descendants_are_tilde_relative() {
        assert_eq!(
            shorten(Path::new("/code"), Path::new("/code/src/bin")),
            "~/src/bin"
        );
    }

    #[test]
    fn unrelated_paths_stay_absolute() {
        assert_eq!(shorten(Path::new("/code"), Path::new("/tmp")), "/tmp");
        // A sibling with a shared name prefix is not a descendant.
        assert_eq!(
            shorten(Path::new("/code"), Path::new("/codebase")),
            "/codebase"
        );
    }

    #[test]
    fn root_home_treats_everything_as_descendant() {
        assert_eq!(shorten(Path::new("/"), Path::new("/")), "~");
        assert_eq!(shorten(Path::new("/"), Path::new("/a/b")), "~/a/b");
    }
}
