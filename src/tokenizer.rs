//! Lexer for the textual syntax.
//!
//! The tokenizer exposes a one-token lookahead interface over a text
//! line: [`Tokenizer::current`] returns the token under the cursor,
//! [`Tokenizer::advance`] moves to the next one, and
//! [`Tokenizer::is_end`] reports exhaustion. The first token is primed
//! on construction.
//!
//! The token grammar itself is written with `nom` combinators. Two
//! lexical quirks worth knowing about:
//!
//! - `+` and `-` lex as a signed integer only when immediately followed
//!   by a digit; otherwise they are the operator symbols. `(+1 2)` is
//!   therefore the list `(1 2)`, not an application of `+`.
//! - an integer literal is parsed as a digit-run magnitude and negated
//!   afterwards, so a literal that does not fit in `i64` is a syntax
//!   error even when the negated value would fit.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while,
    character::complete::{anychar, char, digit1, one_of, satisfy},
    combinator::{map, opt, recognize, value},
    sequence::pair,
};

use crate::Error;
use crate::ast::NumberType;

/// One lexical unit of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Integer(NumberType),
    Symbol(String),
    OpenParen,
    CloseParen,
    /// The `'` prefix.
    Quote,
    /// The `.` separating head from tail of a dotted pair.
    Dot,
    /// An unrecognized character; the reader rejects it.
    Unknown(char),
}

/// Raw lexeme produced by the combinator layer, before integer
/// conversion (which can fail and is handled by the tokenizer).
#[derive(Clone)]
enum Lexeme<'a> {
    Number { negative: bool, digits: &'a str },
    Name(&'a str),
    Operator(char),
    Open,
    Close,
    Quote,
    Dot,
    Unknown(char),
}

// [a-zA-Z<>=*#]
fn is_symbol_beginning(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '<' | '>' | '=' | '*' | '#')
}

fn is_symbol_character(c: char) -> bool {
    is_symbol_beginning(c) || c.is_ascii_digit() || matches!(c, '?' | '!' | '-')
}

/// A digit run with an optional sign. Tried before the punctuation rule
/// so that `+1`/`-1` win over the bare operator symbols.
fn lex_number(input: &str) -> IResult<&str, Lexeme<'_>> {
    map(pair(opt(one_of("+-")), digit1), |(sign, digits)| {
        Lexeme::Number {
            negative: sign == Some('-'),
            digits,
        }
    })
    .parse(input)
}

fn lex_symbol(input: &str) -> IResult<&str, Lexeme<'_>> {
    map(
        recognize(pair(
            satisfy(is_symbol_beginning),
            take_while(is_symbol_character),
        )),
        Lexeme::Name,
    )
    .parse(input)
}

fn lex_punctuation(input: &str) -> IResult<&str, Lexeme<'_>> {
    alt((
        value(Lexeme::Open, char('(')),
        value(Lexeme::Close, char(')')),
        value(Lexeme::Quote, char('\'')),
        value(Lexeme::Dot, char('.')),
        map(one_of("+-/"), Lexeme::Operator),
    ))
    .parse(input)
}

fn lex_token(input: &str) -> IResult<&str, Lexeme<'_>> {
    alt((
        lex_number,
        lex_symbol,
        lex_punctuation,
        map(anychar, Lexeme::Unknown),
    ))
    .parse(input)
}

/// Lazy token stream with one token of lookahead.
pub struct Tokenizer<'a> {
    rest: &'a str,
    current: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `text` and prime the first token.
    pub fn new(text: &'a str) -> Result<Self, Error> {
        let mut tokenizer = Tokenizer {
            rest: text,
            current: None,
        };
        tokenizer.advance()?;
        Ok(tokenizer)
    }

    /// The token under the cursor, or `None` once the input is exhausted.
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// True once all input has been consumed.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Move the cursor to the next token. Fails on an integer literal
    /// that does not fit the number type.
    pub fn advance(&mut self) -> Result<(), Error> {
        self.rest = self
            .rest
            .trim_start_matches(|c: char| !c.is_ascii_graphic());
        if self.rest.is_empty() {
            self.current = None;
            return Ok(());
        }

        let (rest, lexeme) = lex_token(self.rest)
            .map_err(|_| Error::syntax(format!("unrecognized input: '{}'", self.rest)))?;
        self.rest = rest;
        self.current = Some(match lexeme {
            Lexeme::Number { negative, digits } => {
                let magnitude: NumberType = digits.parse().map_err(|_| {
                    Error::syntax(format!("integer literal '{digits}' is out of range"))
                })?;
                Token::Integer(if negative { -magnitude } else { magnitude })
            }
            Lexeme::Name(name) => Token::Symbol(name.to_owned()),
            Lexeme::Operator(op) => Token::Symbol(op.to_string()),
            Lexeme::Open => Token::OpenParen,
            Lexeme::Close => Token::CloseParen,
            Lexeme::Quote => Token::Quote,
            Lexeme::Dot => Token::Dot,
            Lexeme::Unknown(c) => Token::Unknown(c),
        });
        Ok(())
    }
}
