//! Syntax types for command lines.
//!
//! A validated line breaks into command groups separated by `;`, `&`, and
//! `&&`; each group is a [`Pipeline`] of one or more [`Stage`]s connected
//! stdout to stdin in declaration order. These types are built once by the
//! parser and never mutated afterwards.

/// Kind of a redirection operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirKind {
    /// `< file`
    Input,
    /// `> file`
    OutputTruncate,
    /// `>> file`
    OutputAppend,
}

/// One redirection attached to a pipeline stage.
///
/// Redirections are kept in source order; when several of the same direction
/// appear, the last one is the one left applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub kind: RedirKind,
    pub path: String,
}

/// One program invocation within a pipeline: argv plus its redirections.
/// `argv[0]` is the program or builtin name and is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub argv: Vec<String>,
    pub redirections: Vec<Redirection>,
}

impl Stage {
    /// The program or builtin name.
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    /// Whether the stage carries an explicit `<` redirection.
    pub fn input_redirected(&self) -> bool {
        self.redirections
            .iter()
            .any(|r| r.kind == RedirKind::Input)
    }
}

/// An ordered, non-empty sequence of stages launched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

/// What follows a command group on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// `;` or end of line: run synchronously, then continue.
    Sequence,
    /// `&`: launch the group in the background.
    Background,
    /// `&&`: run the next group only if this one succeeded.
    AndThen,
}
