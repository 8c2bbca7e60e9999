//! Reader: token stream to value tree.
//!
//! One call to [`read_expression`] consumes exactly one expression from
//! the tokenizer. Lists are read recursively; the dotted-pair rule is
//! the one non-LL(1) spot in the grammar, resolved by peeking for `.`
//! only after a head element has been read.

use crate::ast::Value;
use crate::tokenizer::{Token, Tokenizer};
use crate::{Error, MAX_READ_DEPTH};

/// Read one expression off the token stream.
pub fn read_expression(tokens: &mut Tokenizer<'_>) -> Result<Value, Error> {
    read_at_depth(tokens, 0)
}

fn read_at_depth(tokens: &mut Tokenizer<'_>, depth: usize) -> Result<Value, Error> {
    if depth >= MAX_READ_DEPTH {
        return Err(Error::syntax(format!(
            "expression nesting exceeds the maximum depth ({MAX_READ_DEPTH})"
        )));
    }

    let Some(token) = tokens.current().cloned() else {
        return Err(Error::syntax("unexpected end of input"));
    };
    tokens.advance()?;

    match token {
        Token::Integer(n) => Ok(Value::Number(n)),
        Token::Symbol(name) => Ok(match name.as_str() {
            "#t" => Value::Bool(true),
            "#f" => Value::Bool(false),
            _ => Value::Symbol(name),
        }),
        Token::Quote => {
            let quoted = read_at_depth(tokens, depth + 1)?;
            Ok(Value::list(vec![Value::Symbol("quote".to_owned()), quoted]))
        }
        Token::OpenParen => read_list(tokens, depth),
        Token::CloseParen => Err(Error::syntax("unexpected ')'")),
        Token::Dot => Err(Error::syntax("unexpected '.'")),
        Token::Unknown(c) => Err(Error::syntax(format!("unrecognized character '{c}'"))),
    }
}

/// Read the remainder of a list after its opening parenthesis.
fn read_list(tokens: &mut Tokenizer<'_>, depth: usize) -> Result<Value, Error> {
    let Some(token) = tokens.current() else {
        return Err(Error::syntax("unexpected end of input inside a list"));
    };

    match token {
        Token::CloseParen => {
            tokens.advance()?;
            return Ok(Value::Nil);
        }
        // A dot cannot begin a list
        Token::Dot => return Err(Error::syntax("unexpected appearance of '.'")),
        _ => {}
    }

    let head = read_at_depth(tokens, depth + 1)?;

    match tokens.current() {
        None => Err(Error::syntax("unexpected end of input inside a list")),
        Some(Token::CloseParen) => {
            tokens.advance()?;
            Ok(Value::cons(head, Value::Nil))
        }
        Some(Token::Dot) => {
            tokens.advance()?;
            let tail = read_at_depth(tokens, depth + 1)?;
            match tokens.current() {
                Some(Token::CloseParen) => {
                    tokens.advance()?;
                    Ok(Value::cons(head, tail))
                }
                _ => Err(Error::syntax(
                    "')' expected after the tail of a dotted pair",
                )),
            }
        }
        Some(_) => {
            let tail = read_list(tokens, depth)?;
            Ok(Value::cons(head, tail))
        }
    }
}
