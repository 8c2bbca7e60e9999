//! Engine facade: the surface the interactive shell drives.
//!
//! An [`Engine`] owns one root environment that survives across
//! `interpret` calls, so definitions and mutations accumulate the way a
//! REPL session expects. Each call accepts exactly one expression and
//! returns its printed representation.

use std::rc::Rc;

use crate::Error;
use crate::builtinops;
use crate::evaluator::{Environment, eval};
use crate::reader::read_expression;
use crate::tokenizer::Tokenizer;

/// The interpreter engine: a root environment plus the
/// tokenize-read-eval-print pipeline.
pub struct Engine {
    root: Rc<Environment>,
}

impl Engine {
    /// Create an engine with an empty root environment. Call
    /// [`Engine::init`] before interpreting.
    pub fn new() -> Self {
        Engine {
            root: Environment::new(),
        }
    }

    /// Install every built-in under its published name. Idempotent:
    /// calling it again re-installs the built-ins and leaves user
    /// definitions alone.
    pub fn init(&mut self) {
        builtinops::install(&self.root);
    }

    /// Evaluate one expression and return its printed representation.
    ///
    /// The input must contain exactly one expression; trailing tokens
    /// are a syntax error. Evaluation happens in the persistent root
    /// environment, so side effects survive into later calls even when
    /// a subsequent expression fails.
    pub fn interpret(&mut self, text: &str) -> Result<String, Error> {
        let mut tokens = Tokenizer::new(text)?;
        let expression = read_expression(&mut tokens)?;
        if !tokens.is_end() {
            return Err(Error::syntax(format!(
                "only one expression is expected, given: {text}"
            )));
        }
        let value = eval(&expression, &self.root)?;
        Ok(value.to_string())
    }
}

impl Default for Engine {
    fn default() -> Self {
        let mut engine = Engine::new();
        engine.init();
        engine
    }
}
