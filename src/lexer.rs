//! Tokenization of command lines.
//!
//! A line is a flat sequence of words and operators; words stop at
//! whitespace and at the special characters `| & ; < >`, so both the
//! attached (`>file`) and spaced (`> file`) redirection forms tokenize the
//! same way. Quotes and escapes are not part of the grammar.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::multispace0,
    combinator::{map, value},
    multi::many0,
    sequence::preceded,
    IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A command name, argument, or redirection target.
    Word(String),
    /// `|`
    Pipe,
    /// `&`
    Background,
    /// `&&`
    AndIf,
    /// `;`
    Semi,
    /// `<`
    RedirIn,
    /// `>`
    RedirOut,
    /// `>>`
    RedirAppend,
}

#[derive(Error, Debug)]
pub enum LexError {
    #[error("unexpected input near '{0}'")]
    Trailing(String),
}

fn operator(input: &str) -> IResult<&str, Token> {
    // Two-character operators first so `&&`/`>>` never lex as two singles.
    alt((
        value(Token::AndIf, tag("&&")),
        value(Token::RedirAppend, tag(">>")),
        value(Token::Pipe, tag("|")),
        value(Token::Background, tag("&")),
        value(Token::Semi, tag(";")),
        value(Token::RedirIn, tag("<")),
        value(Token::RedirOut, tag(">")),
    ))(input)
}

fn word(input: &str) -> IResult<&str, Token> {
    map(
        take_while1(|c: char| !c.is_whitespace() && !"|&;<>".contains(c)),
        |w: &str| Token::Word(w.to_string()),
    )(input)
}

/// Tokenize one input line.
pub fn lex(input: &str) -> Result<Vec<Token>, LexError> {
    let (rest, tokens) = many0(preceded(multispace0, alt((operator, word))))(input)
        .map_err(|_| LexError::Trailing(input.to_string()))?;
    if !rest.trim().is_empty() {
        return Err(LexError::Trailing(rest.trim().to_string()));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn lex_words_and_pipe() {
        let tokens = lex("ls -l | grep txt").unwrap();
        assert_eq!(
            tokens,
            vec![word("ls"), word("-l"), Token::Pipe, word("grep"), word("txt")]
        );
    }

    #[test]
    fn lex_attached_redirection() {
        let tokens = lex("echo hi >out.txt").unwrap();
        assert_eq!(
            tokens,
            vec![word("echo"), word("hi"), Token::RedirOut, word("out.txt")]
        );
    }

    #[test]
    fn lex_append_is_one_token() {
        let tokens = lex("echo hi >> log").unwrap();
        assert_eq!(
            tokens,
            vec![word("echo"), word("hi"), Token::RedirAppend, word("log")]
        );
    }

    #[test]
    fn lex_and_if_vs_background() {
        let tokens = lex("a && b & c").unwrap();
        assert_eq!(
            tokens,
            vec![
                word("a"),
                Token::AndIf,
                word("b"),
                Token::Background,
                word("c")
            ]
        );
    }

    #[test]
    fn lex_empty_and_blank() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("   \t ").unwrap().is_empty());
    }
}
