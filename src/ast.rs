//! The runtime value universe.
//!
//! [`Value`] covers every datum the interpreter manipulates: exact
//! integers, the two booleans, symbols, the empty list, mutable cons
//! cells and procedures (built-in or user lambda). Pairs are the only
//! mutable values: a `Value::Pair` is a shared handle, so cloning one
//! aliases the same two-slot cell and mutation through any handle is
//! observable through all others.
//!
//! `Display` produces the printed representation used by the REPL and
//! by error messages; `PartialEq` is the structural equality used by
//! tests (procedures and aliased pairs compare by identity first).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::builtinops::BuiltinOp;
use crate::evaluator::Environment;

/// Type alias for number values in the interpreter.
pub(crate) type NumberType = i64;

/// A mutable two-slot cons cell. Either slot may hold any value,
/// including another pair or the empty list.
#[derive(Debug)]
pub struct Pair {
    pub head: Value,
    pub tail: Value,
}

/// Parameter specification of a user lambda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// An ordered list of parameter names; the call must supply exactly
    /// as many arguments.
    Fixed(Vec<String>),
    /// A single rest name; the call's evaluated arguments are packaged
    /// into a proper list bound to it.
    Rest(String),
}

/// A user-defined procedure: the environment captured at construction,
/// the parameter specification and a non-empty body sequence.
pub struct Lambda {
    pub params: Params,
    pub body: Vec<Value>,
    pub env: Rc<Environment>,
}

/// Core value type of the interpreter.
#[derive(Clone)]
pub enum Value {
    /// Exact integers.
    Number(NumberType),
    /// `#t` and `#f`.
    Bool(bool),
    /// Identifiers.
    Symbol(String),
    /// The sole canonical empty list `()`. Not a pair.
    Nil,
    /// Shared handle to a mutable cons cell.
    Pair(Rc<RefCell<Pair>>),
    /// A built-in operation from the registry.
    Builtin(&'static BuiltinOp),
    /// A user lambda.
    Lambda(Rc<Lambda>),
}

impl Value {
    /// Allocate a fresh pair.
    pub fn cons(head: Value, tail: Value) -> Value {
        Value::Pair(Rc::new(RefCell::new(Pair { head, tail })))
    }

    /// Build a proper list, right to left.
    pub fn list(elements: Vec<Value>) -> Value {
        elements
            .into_iter()
            .rev()
            .fold(Value::Nil, |tail, head| Value::cons(head, tail))
    }

    /// Only `#f` is false; every other value, including `0` and `()`,
    /// is true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    /// Walk the tail links of a pair into an ordered argument vector.
    /// Each pair contributes its head; a non-pair, non-`()` tail is
    /// appended as the last element, so `(a b . c)` flattens to
    /// `[a, b, c]`. `()` flattens to the empty sequence.
    pub(crate) fn flatten(&self) -> Vec<Value> {
        let mut elements = Vec::new();
        let mut cursor = self.clone();
        loop {
            match cursor {
                Value::Pair(pair) => {
                    let next = {
                        let cell = pair.borrow();
                        elements.push(cell.head.clone());
                        cell.tail.clone()
                    };
                    cursor = next;
                }
                Value::Nil => break,
                other => {
                    elements.push(other);
                    break;
                }
            }
        }
        elements
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Nil => write!(f, "Nil"),
            Value::Pair(pair) => {
                let cell = pair.borrow();
                write!(f, "Pair({:?} . {:?})", cell.head, cell.tail)
            }
            Value::Builtin(op) => write!(f, "Builtin({})", op.name),
            Value::Lambda(lambda) => write!(f, "Lambda(params={:?})", lambda.params),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Nil => write!(f, "()"),
            Value::Pair(pair) => {
                write!(f, "(")?;
                let mut pair = Rc::clone(pair);
                loop {
                    let (head, tail) = {
                        let cell = pair.borrow();
                        (cell.head.clone(), cell.tail.clone())
                    };
                    write!(f, "{head}")?;
                    match tail {
                        Value::Nil => break,
                        // A pair tail splices into the same parentheses
                        Value::Pair(next) => {
                            write!(f, " ")?;
                            pair = next;
                        }
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Builtin(op) => write!(f, "{}", op.name),
            Value::Lambda(_) => write!(f, "lambda-function"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Pair(a), Value::Pair(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (left, right) = (a.borrow(), b.borrow());
                    left.head == right.head && left.tail == right.tail
                }
            }
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Helper for creating symbols in tests.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(name.as_ref().to_owned())
}

/// Helper for creating numbers in tests.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn num(value: NumberType) -> Value {
    Value::Number(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num_list(values: &[NumberType]) -> Value {
        Value::list(values.iter().copied().map(Value::Number).collect())
    }

    #[test]
    fn test_display() {
        let test_cases: Vec<(Value, &str)> = vec![
            (num(42), "42"),
            (num(-7), "-7"),
            (Value::Bool(true), "#t"),
            (Value::Bool(false), "#f"),
            (sym("foo-bar?"), "foo-bar?"),
            (Value::Nil, "()"),
            (num_list(&[1, 2, 3]), "(1 2 3)"),
            (Value::cons(num(1), num(2)), "(1 . 2)"),
            (
                Value::cons(num(1), Value::cons(num(2), num(3))),
                "(1 2 . 3)",
            ),
            (Value::cons(Value::Nil, Value::Nil), "(())"),
            // A nested empty list is an ordinary element
            (
                Value::list(vec![Value::Nil, num(1)]),
                "(() 1)",
            ),
            (
                Value::list(vec![sym("quote"), sym("x")]),
                "(quote x)",
            ),
            (
                Value::list(vec![num_list(&[1]), num_list(&[2, 3])]),
                "((1) (2 3))",
            ),
        ];

        for (value, expected) in test_cases {
            assert_eq!(value.to_string(), expected);
        }
    }

    #[test]
    fn test_flatten() {
        // () flattens to nothing
        assert_eq!(Value::Nil.flatten(), Vec::<Value>::new());
        // A proper list flattens to its elements
        assert_eq!(
            num_list(&[1, 2, 3]).flatten(),
            vec![num(1), num(2), num(3)]
        );
        // A dotted tail is appended as the last element
        assert_eq!(
            Value::cons(num(1), num(2)).flatten(),
            vec![num(1), num(2)]
        );
        assert_eq!(
            Value::cons(num(1), Value::cons(num(2), num(3))).flatten(),
            vec![num(1), num(2), num(3)]
        );
        // A nested empty list stays an element
        assert_eq!(
            Value::list(vec![Value::Nil, num(1)]).flatten(),
            vec![Value::Nil, num(1)]
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(num(0).is_truthy());
        assert!(Value::Nil.is_truthy());
        assert!(sym("x").is_truthy());
        assert!(num_list(&[1]).is_truthy());
    }

    #[test]
    fn test_pair_sharing() {
        let shared = Value::cons(num(1), num(2));
        let alias = shared.clone();
        let holder = Value::list(vec![shared.clone(), shared.clone()]);

        // Mutation through one handle is visible through every other
        if let Value::Pair(pair) = &shared {
            pair.borrow_mut().head = num(99);
        }
        assert_eq!(alias.to_string(), "(99 . 2)");
        assert_eq!(holder.to_string(), "((99 . 2) (99 . 2))");
        assert_eq!(shared, alias);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(num_list(&[1, 2]), num_list(&[1, 2]));
        assert_ne!(num_list(&[1, 2]), num_list(&[1, 3]));
        assert_ne!(num_list(&[1, 2]), num_list(&[1, 2, 3]));
        assert_ne!(num(1), Value::Bool(true));
        assert_ne!(Value::Nil, num_list(&[1]));
        assert_eq!(
            Value::cons(num(1), num(2)),
            Value::cons(num(1), num(2))
        );
    }
}
