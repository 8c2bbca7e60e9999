//! Schemette - an interpreter for a small dialect of Scheme
//!
//! This crate implements a read-eval-print core: one expression per
//! interaction is parsed, evaluated against a persistent top-level
//! environment and rendered back to text.
//!
//! ```scheme
//! (define fact (lambda (n) (if (< n 2) 1 (* n (fact (- n 1))))))
//! (fact 5)                ; => 120
//! (cons 1 (cons 2 '()))   ; => (1 2)
//! (define x '(1 2))
//! (set-car! x 10)
//! x                       ; => (10 2)
//! ```
//!
//! ## Language
//!
//! The dialect has exact integers, the booleans `#t`/`#f`, symbols,
//! mutable cons cells (both proper and dotted lists) and first-class
//! procedures. Lambdas are lexically scoped closures; a lambda declared
//! with a single symbol instead of a parameter list receives all of its
//! arguments packaged as one list. Only `#f` is false.
//!
//! Special forms (`quote`, `lambda`, `define`, `set!`, `if`) receive
//! their operands unevaluated and decide themselves which positions to
//! evaluate; every other built-in evaluates its arguments left to right.
//!
//! ## Modules
//!
//! - `tokenizer`: one-token-lookahead lexer over a text line
//! - `reader`: token stream to value tree, including dotted pairs
//! - `ast`: the tagged runtime value universe
//! - `evaluator`: lexical environments and expression evaluation
//! - `builtinops`: registry of built-in operations
//! - `engine`: the facade owning the root environment (`init`/`interpret`)
//!
//! ## Example
//!
//! ```
//! use schemette::engine::Engine;
//!
//! let mut engine = Engine::new();
//! engine.init();
//! assert_eq!(engine.interpret("(+ 1 2 3)").unwrap(), "6");
//! ```

use std::fmt;

/// Maximum parenthesis nesting accepted by the reader.
/// Deeper input is rejected with a syntax error before it can exhaust
/// the native stack.
pub const MAX_READ_DEPTH: usize = 64;

/// Maximum evaluation nesting. A user-level recursive call consumes a
/// few levels (combination, branch, argument), so this allows on the
/// order of a hundred recursive applications.
pub const MAX_EVAL_DEPTH: usize = 512;

/// Error raised by the interpreter core.
///
/// The three kinds are the ones the shell distinguishes: syntax errors
/// (ill-formed input, or an arity violation on a special form), name
/// errors (unbound variables) and runtime errors (everything that goes
/// wrong while evaluating well-formed input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SyntaxError(String),
    NameError(String),
    RuntimeError(String),
}

impl Error {
    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Error::SyntaxError(message.into())
    }

    pub(crate) fn name(message: impl Into<String>) -> Self {
        Error::NameError(message.into())
    }

    pub(crate) fn runtime(message: impl Into<String>) -> Self {
        Error::RuntimeError(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::SyntaxError(msg) => write!(f, "Syntax error: {msg}"),
            Error::NameError(msg) => write!(f, "Name error: {msg}"),
            Error::RuntimeError(msg) => write!(f, "Runtime error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub mod ast;
pub mod builtinops;
pub mod engine;
pub mod evaluator;
pub mod reader;
pub mod tokenizer;
