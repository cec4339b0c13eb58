//! Line validation, command-group splitting, and pipeline parsing.
//!
//! Validation is a pure grammar check run before anything is executed, so
//! the shell can answer `Invalid Syntax!` without side effects:
//!
//! ```text
//! shell_cmd -> cmd_group (('&&' | '&' | ';') cmd_group)* ('&' | ';')?
//! cmd_group -> atomic ('|' atomic)*
//! atomic    -> name (name | '<' name | ('>' | '>>') name)*
//! ```
//!
//! [`parse_pipeline`] then turns one command group's tokens into a
//! [`Pipeline`] and enforces the per-group resource limits. Limit errors are
//! a separate failure class from syntax errors: they are reported on their
//! own and only abandon the group that exceeded them.

use crate::ast::{Connector, Pipeline, RedirKind, Redirection, Stage};
use crate::lexer::{lex, Token};
use thiserror::Error;

/// Upper bound on stages in a single pipeline.
pub const MAX_STAGES: usize = 16;
/// Upper bound on argv entries per stage, argv[0] included.
pub const MAX_ARGS: usize = 64;
/// Upper bound on redirections per stage.
pub const MAX_REDIRECTIONS: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid syntax")]
    Syntax,
    #[error("empty pipeline stage")]
    EmptyStage,
    #[error("redirection: missing file name")]
    MissingRedirectionTarget,
    #[error("too many pipeline stages (max 16)")]
    TooManyStages,
    #[error("too many arguments (max 63)")]
    TooManyArgs,
    #[error("too many redirections (max 16)")]
    TooManyRedirections,
}

impl ParseError {
    /// Resource-limit errors are reported as themselves rather than as
    /// `Invalid Syntax!`.
    pub fn is_resource_limit(&self) -> bool {
        matches!(
            self,
            ParseError::TooManyStages | ParseError::TooManyArgs | ParseError::TooManyRedirections
        )
    }
}

/// Check a whole input line against the grammar. Returns false for anything
/// the shell should refuse before execution.
pub fn validate(line: &str) -> bool {
    let tokens = match lex(line) {
        Ok(tokens) => tokens,
        Err(_) => return false,
    };
    if tokens.is_empty() {
        return false;
    }
    Validator { tokens: &tokens, pos: 0 }.shell_cmd()
}

struct Validator<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Validator<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn at_end(&self) -> bool {
        self.pos == self.tokens.len()
    }

    fn name(&mut self) -> bool {
        if matches!(self.peek(), Some(Token::Word(_))) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn atomic(&mut self) -> bool {
        if !self.name() {
            return false;
        }
        loop {
            match self.peek() {
                Some(Token::Word(_)) => self.pos += 1,
                Some(Token::RedirIn) | Some(Token::RedirOut) | Some(Token::RedirAppend) => {
                    self.pos += 1;
                    if !self.name() {
                        return false;
                    }
                }
                _ => return true,
            }
        }
    }

    fn cmd_group(&mut self) -> bool {
        if !self.atomic() {
            return false;
        }
        while matches!(self.peek(), Some(Token::Pipe)) {
            self.pos += 1;
            if !self.atomic() {
                return false;
            }
        }
        true
    }

    fn shell_cmd(&mut self) -> bool {
        if !self.cmd_group() {
            return false;
        }
        loop {
            match self.peek() {
                // `;` and `&` may trail the line; `&&` may not.
                Some(Token::Semi) | Some(Token::Background) => {
                    self.pos += 1;
                    if self.at_end() {
                        return true;
                    }
                    if !self.cmd_group() {
                        return false;
                    }
                }
                Some(Token::AndIf) => {
                    self.pos += 1;
                    if self.at_end() || !self.cmd_group() {
                        return false;
                    }
                }
                None => return true,
                _ => return false,
            }
        }
    }
}

/// Split a token stream into command groups with the connector that follows
/// each one. The final group's connector is [`Connector::Sequence`] unless
/// the line trails with `&`.
pub fn split_groups(tokens: &[Token]) -> Vec<(&[Token], Connector)> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        let connector = match token {
            Token::Semi => Connector::Sequence,
            Token::Background => Connector::Background,
            Token::AndIf => Connector::AndThen,
            _ => continue,
        };
        if i > start {
            groups.push((&tokens[start..i], connector));
        }
        start = i + 1;
    }
    if start < tokens.len() {
        groups.push((&tokens[start..], Connector::Sequence));
    }
    groups
}

/// Parse one command group's tokens into a pipeline, enforcing the stage,
/// argv, and redirection bounds.
pub fn parse_pipeline(tokens: &[Token]) -> Result<Pipeline, ParseError> {
    let mut stages = Vec::new();
    for segment in tokens.split(|t| *t == Token::Pipe) {
        if segment.is_empty() {
            return Err(ParseError::EmptyStage);
        }
        if stages.len() == MAX_STAGES {
            return Err(ParseError::TooManyStages);
        }
        stages.push(parse_stage(segment)?);
    }
    if stages.is_empty() {
        return Err(ParseError::EmptyStage);
    }
    Ok(Pipeline { stages })
}

fn parse_stage(tokens: &[Token]) -> Result<Stage, ParseError> {
    let mut argv: Vec<String> = Vec::new();
    let mut redirections = Vec::new();
    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        match token {
            Token::Word(word) => {
                if argv.len() == MAX_ARGS - 1 {
                    return Err(ParseError::TooManyArgs);
                }
                argv.push(word.clone());
            }
            Token::RedirIn | Token::RedirOut | Token::RedirAppend => {
                let kind = match token {
                    Token::RedirIn => RedirKind::Input,
                    Token::RedirOut => RedirKind::OutputTruncate,
                    _ => RedirKind::OutputAppend,
                };
                let path = match iter.next() {
                    Some(Token::Word(word)) => word.clone(),
                    _ => return Err(ParseError::MissingRedirectionTarget),
                };
                if redirections.len() == MAX_REDIRECTIONS {
                    return Err(ParseError::TooManyRedirections);
                }
                redirections.push(Redirection { kind, path });
            }
            _ => return Err(ParseError::Syntax),
        }
    }
    if argv.is_empty() {
        return Err(ParseError::EmptyStage);
    }
    Ok(Stage { argv, redirections })
}
