//! Lexical environments and expression evaluation.
//!
//! The evaluator maps `(value, environment)` to a value. Numbers,
//! booleans and procedures are self-evaluating, symbols are looked up,
//! the empty list is an error, and a pair is a *combination*: its head
//! is evaluated to a procedure which is then applied to the flattened
//! tail.
//!
//! Every built-in receives its argument vector unevaluated together
//! with the caller's environment; non-special built-ins evaluate each
//! argument they consume, in order, while special forms pick and choose.
//! The special forms themselves (`quote`, `lambda`, `define`, `set!`,
//! `if`) live in this module because they are part of the evaluation
//! rules; everything else is in [`crate::builtinops`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Lambda, Params, Value};
use crate::{Error, MAX_EVAL_DEPTH};

/// One frame of the lexical environment: a mutable name-to-value map
/// plus an optional parent link.
///
/// Frames are shared through `Rc` and mutated through `RefCell`, so a
/// closure and its caller can observe each other's `define`/`set!`
/// effects on a common frame. A frame lives for as long as any lambda
/// or ongoing evaluation references it.
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Create a root frame.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Create a child frame whose lookups fall through to `parent`.
    pub fn with_parent(parent: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Bind `name` in this frame, overwriting any prior binding here.
    pub fn define(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_owned(), value);
    }

    /// Walk from this frame to the root and return the first binding.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            Some(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.lookup(name)
        } else {
            None
        }
    }

    /// True if `name` is bound in this frame or any ancestor.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
            || self.parent.as_ref().is_some_and(|p| p.contains(name))
    }

    /// Replace the binding of `name` in the nearest frame that has one.
    pub fn set(&self, name: &str, value: Value) -> Result<(), Error> {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_owned(), value);
            Ok(())
        } else if let Some(parent) = &self.parent {
            parent.set(name, value)
        } else {
            Err(unbound_name(name))
        }
    }
}

fn unbound_name(name: &str) -> Error {
    Error::name(format!("no variable with name '{name}' is defined"))
}

pub(crate) fn wrong_arity(special: bool, count: usize, name: &str) -> Error {
    let message = format!("wrong number of arguments ({count}) for {name}");
    if special {
        Error::syntax(message)
    } else {
        Error::runtime(message)
    }
}

/// Evaluate one expression in the given environment.
pub fn eval(expr: &Value, env: &Rc<Environment>) -> Result<Value, Error> {
    eval_at_depth(expr, env, 0)
}

/// Evaluate with explicit nesting depth; every recursive evaluation
/// step goes through here so runaway recursion surfaces as an error
/// instead of exhausting the native stack.
pub(crate) fn eval_at_depth(
    expr: &Value,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, Error> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(Error::runtime(format!(
            "evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})"
        )));
    }
    match expr {
        Value::Number(_) | Value::Bool(_) | Value::Builtin(_) | Value::Lambda(_) => {
            Ok(expr.clone())
        }
        Value::Symbol(name) => env.lookup(name).ok_or_else(|| unbound_name(name)),
        Value::Nil => Err(Error::runtime("cannot evaluate the empty list")),
        Value::Pair(_) => eval_combination(expr, env, depth),
    }
}

/// Apply the evaluated head of a combination to the unevaluated rest.
fn eval_combination(expr: &Value, env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let elements = expr.flatten();
    let Some((head, args)) = elements.split_first() else {
        return Err(Error::runtime("cannot evaluate the empty list"));
    };
    let callee = eval_at_depth(head, env, depth + 1)?;

    match callee {
        Value::Builtin(op) => {
            if !op.arity.accepts(args.len()) {
                return Err(wrong_arity(op.is_special_form(), args.len(), op.name));
            }
            (op.apply_fn())(args, env, depth)
        }
        Value::Lambda(lambda) => apply_lambda(&lambda, args, env, depth),
        other => Err(Error::runtime(format!(
            "first element of '{expr}' has to be a procedure, got {other}"
        ))),
    }
}

/// Apply a user lambda: evaluate the arguments in the caller's
/// environment, bind them in a fresh frame whose parent is the lambda's
/// captured environment, then evaluate the body left to right.
fn apply_lambda(
    lambda: &Rc<Lambda>,
    args: &[Value],
    caller_env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, Error> {
    let frame = match &lambda.params {
        Params::Fixed(names) => {
            if names.len() != args.len() {
                return Err(wrong_arity(false, args.len(), "lambda-function"));
            }
            let frame = Environment::with_parent(&lambda.env);
            for (name, expr) in names.iter().zip(args) {
                frame.define(name, eval_at_depth(expr, caller_env, depth + 1)?);
            }
            frame
        }
        Params::Rest(name) => {
            let mut values = Vec::with_capacity(args.len());
            for expr in args {
                values.push(eval_at_depth(expr, caller_env, depth + 1)?);
            }
            let frame = Environment::with_parent(&lambda.env);
            frame.define(name, Value::list(values));
            frame
        }
    };

    let mut result = Value::Nil;
    for expr in &lambda.body {
        result = eval_at_depth(expr, &frame, depth + 1)?;
    }
    Ok(result)
}

/// Build a lambda value from a parameter specification and a body,
/// capturing the current environment. Shared by `lambda` and the
/// function-definition sugar of `define`.
fn make_lambda(params: &Value, body: &[Value], env: &Rc<Environment>) -> Result<Value, Error> {
    let params = match params {
        Value::Symbol(name) => Params::Rest(name.clone()),
        Value::Nil => Params::Fixed(Vec::new()),
        Value::Pair(_) => {
            let mut names = Vec::new();
            for element in params.flatten() {
                match element {
                    Value::Symbol(name) => names.push(name),
                    other => {
                        return Err(Error::runtime(format!(
                            "a symbol is expected, got {other}"
                        )));
                    }
                }
            }
            Params::Fixed(names)
        }
        other => {
            return Err(Error::syntax(format!(
                "a symbol or a sequence of symbols is expected in lambda, got {other}"
            )));
        }
    };
    Ok(Value::Lambda(Rc::new(Lambda {
        params,
        body: body.to_vec(),
        env: Rc::clone(env),
    })))
}

//
// Special forms. These receive their operands unevaluated and are
// installed in the root environment like any other built-in; the
// registry entry marks them special so arity failures are reported as
// syntax errors.
//

pub(crate) fn eval_quote(
    args: &[Value],
    _env: &Rc<Environment>,
    _depth: usize,
) -> Result<Value, Error> {
    match args {
        [expr] => Ok(expr.clone()),
        _ => Err(wrong_arity(true, args.len(), "quote")),
    }
}

pub(crate) fn eval_lambda(
    args: &[Value],
    env: &Rc<Environment>,
    _depth: usize,
) -> Result<Value, Error> {
    match args {
        [params, body @ ..] if !body.is_empty() => make_lambda(params, body, env),
        _ => Err(wrong_arity(true, args.len(), "lambda")),
    }
}

pub(crate) fn eval_define(
    args: &[Value],
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, Error> {
    match args {
        // (define (f p...) body) is sugar for (define f (lambda (p...) body))
        [Value::Pair(signature), body] => {
            let (name_value, params) = {
                let cell = signature.borrow();
                (cell.head.clone(), cell.tail.clone())
            };
            let Value::Symbol(name) = name_value else {
                return Err(Error::syntax(format!(
                    "a symbol is expected as the first element of '{}'",
                    Value::Pair(Rc::clone(signature))
                )));
            };
            let lambda = make_lambda(&params, std::slice::from_ref(body), env)?;
            env.define(&name, lambda);
            Ok(Value::Nil)
        }
        [Value::Symbol(name), expr] => {
            let value = eval_at_depth(expr, env, depth + 1)?;
            env.define(name, value);
            Ok(Value::Nil)
        }
        [Value::Nil, _] => Err(Error::syntax(
            "a symbol is expected as the first element of '()'",
        )),
        [other, _] => Err(Error::runtime(format!("a symbol is expected, got {other}"))),
        _ => Err(wrong_arity(true, args.len(), "define")),
    }
}

pub(crate) fn eval_set(
    args: &[Value],
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, Error> {
    match args {
        [Value::Symbol(name), expr] => {
            // The binding must be reachable before the new value is
            // even computed
            if !env.contains(name) {
                return Err(Error::name(format!(
                    "variable '{name}' is not defined in the current scope"
                )));
            }
            let value = eval_at_depth(expr, env, depth + 1)?;
            env.set(name, value)?;
            Ok(Value::Nil)
        }
        [other, _] => Err(Error::runtime(format!("a symbol is expected, got {other}"))),
        _ => Err(wrong_arity(true, args.len(), "set!")),
    }
}

pub(crate) fn eval_if(
    args: &[Value],
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Value, Error> {
    match args {
        [test, branches @ ..] if matches!(branches.len(), 1 | 2) => {
            if eval_at_depth(test, env, depth + 1)?.is_truthy() {
                eval_at_depth(&branches[0], env, depth + 1)
            } else if let Some(alternative) = branches.get(1) {
                eval_at_depth(alternative, env, depth + 1)
            } else {
                Ok(Value::Nil)
            }
        }
        _ => Err(wrong_arity(true, args.len(), "if")),
    }
}
