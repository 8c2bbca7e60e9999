//! Built-in operations registry.
//!
//! Every operation the root environment exposes is described by a
//! [`BuiltinOp`]: a published name, an arity predicate and an
//! application routine. The routine always receives the argument
//! vector **unevaluated** together with the caller's environment; a
//! regular function evaluates each argument it consumes, in order,
//! while a special form decides itself which positions to evaluate
//! (`quote` evaluates none, `if` evaluates the test and one branch,
//! and so on).
//!
//! The special/function distinction also selects the error kind for an
//! arity violation: syntax error for special forms, runtime error for
//! everything else. The special forms' application routines live in
//! [`crate::evaluator`] next to the evaluation rules; this module
//! implements the rest of the library:
//!
//! - arithmetic: `+`, `-`, `*`, `/`, `max`, `min`, `abs`
//! - comparison: `<`, `<=`, `>`, `>=`, `=`
//! - logic: `and`, `or`, `not`
//! - pairs and lists: `cons`, `car`, `cdr`, `list`, `list-ref`,
//!   `list-tail`, `set-car!`, `set-cdr!`
//! - predicates: `boolean?`, `number?`, `symbol?`, `pair?`, `list?`,
//!   `null?`
//!
//! All arithmetic is checked; overflow is a runtime error.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use crate::Error;
use crate::ast::{NumberType, Value};
use crate::evaluator::{
    Environment, eval_at_depth, eval_define, eval_if, eval_lambda, eval_quote, eval_set,
    wrong_arity,
};

/// Canonical application signature: unevaluated arguments, the
/// caller's environment and the current evaluation depth.
pub type ApplyFn = fn(&[Value], &Rc<Environment>, usize) -> Result<Value, Error>;

/// How a built-in treats its arguments.
#[derive(Clone, Copy)]
pub enum OpKind {
    /// Evaluates every argument it consumes, left to right.
    Function(ApplyFn),
    /// Receives the arguments untouched and applies its own evaluation
    /// discipline.
    SpecialForm(ApplyFn),
}

impl std::fmt::Debug for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Function(_) => write!(f, "Function(<fn>)"),
            OpKind::SpecialForm(_) => write!(f, "SpecialForm(<fn>)"),
        }
    }
}

/// Number of arguments an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    /// Inclusive range.
    Range(usize, usize),
    /// Zero arguments, or at least the given number. The comparison
    /// chain operators use this: `(<)` is vacuously true while
    /// `(< 1)` has nothing to compare against.
    NoneOrAtLeast(usize),
    Any,
}

impl Arity {
    pub(crate) fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::NoneOrAtLeast(n) => count == 0 || count >= n,
            Arity::Any => true,
        }
    }
}

/// Definition of a built-in operation.
#[derive(Debug)]
pub struct BuiltinOp {
    /// The name the operation is installed under; also its printed
    /// representation.
    pub name: &'static str,
    pub kind: OpKind,
    pub arity: Arity,
}

impl BuiltinOp {
    pub(crate) fn is_special_form(&self) -> bool {
        matches!(self.kind, OpKind::SpecialForm(_))
    }

    pub(crate) fn apply_fn(&self) -> ApplyFn {
        match self.kind {
            OpKind::Function(f) | OpKind::SpecialForm(f) => f,
        }
    }
}

//
// Argument helpers
//

fn eval_number(expr: &Value, env: &Rc<Environment>, depth: usize) -> Result<NumberType, Error> {
    match eval_at_depth(expr, env, depth + 1)? {
        Value::Number(n) => Ok(n),
        other => Err(Error::runtime(format!("a number is expected, got {other}"))),
    }
}

fn pair_expected(value: &Value) -> Error {
    Error::runtime(format!("a pair is expected, got {value}"))
}

fn overflow(operation: &str) -> Error {
    Error::runtime(format!("integer overflow in {operation}"))
}

//
// Arithmetic
//

fn builtin_add(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let mut sum: NumberType = 0;
    for expr in args {
        let n = eval_number(expr, env, depth)?;
        sum = sum.checked_add(n).ok_or_else(|| overflow("addition"))?;
    }
    Ok(Value::Number(sum))
}

fn builtin_sub(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [first, rest @ ..] = args else {
        return Err(wrong_arity(false, args.len(), "-"));
    };
    let mut result = eval_number(first, env, depth)?;
    if rest.is_empty() {
        return result
            .checked_neg()
            .map(Value::Number)
            .ok_or_else(|| overflow("negation"));
    }
    for expr in rest {
        let n = eval_number(expr, env, depth)?;
        result = result.checked_sub(n).ok_or_else(|| overflow("subtraction"))?;
    }
    Ok(Value::Number(result))
}

fn builtin_mul(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let mut product: NumberType = 1;
    for expr in args {
        let n = eval_number(expr, env, depth)?;
        product = product
            .checked_mul(n)
            .ok_or_else(|| overflow("multiplication"))?;
    }
    Ok(Value::Number(product))
}

fn builtin_div(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [first, rest @ ..] = args else {
        return Err(wrong_arity(false, args.len(), "/"));
    };
    let mut result = eval_number(first, env, depth)?;
    for expr in rest {
        let divisor = eval_number(expr, env, depth)?;
        if divisor == 0 {
            return Err(Error::runtime("division by zero"));
        }
        result = result
            .checked_div(divisor)
            .ok_or_else(|| overflow("division"))?;
    }
    Ok(Value::Number(result))
}

fn builtin_max(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [first, rest @ ..] = args else {
        return Err(wrong_arity(false, args.len(), "max"));
    };
    let mut result = eval_number(first, env, depth)?;
    for expr in rest {
        result = result.max(eval_number(expr, env, depth)?);
    }
    Ok(Value::Number(result))
}

fn builtin_min(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [first, rest @ ..] = args else {
        return Err(wrong_arity(false, args.len(), "min"));
    };
    let mut result = eval_number(first, env, depth)?;
    for expr in rest {
        result = result.min(eval_number(expr, env, depth)?);
    }
    Ok(Value::Number(result))
}

fn builtin_abs(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [expr] = args else {
        return Err(wrong_arity(false, args.len(), "abs"));
    };
    eval_number(expr, env, depth)?
        .checked_abs()
        .map(Value::Number)
        .ok_or_else(|| overflow("abs"))
}

//
// Comparison: the adjacent-pairs relation must hold throughout the
// chain. Zero arguments are vacuously true; a single argument is an
// arity error (enforced by the registry entry).
//

macro_rules! numeric_comparison {
    ($fn_name:ident, $op:tt) => {
        fn $fn_name(
            args: &[Value],
            env: &Rc<Environment>,
            depth: usize,
        ) -> Result<Value, Error> {
            let [first, rest @ ..] = args else {
                return Ok(Value::Bool(true));
            };
            let mut previous = eval_number(first, env, depth)?;
            for expr in rest {
                let current = eval_number(expr, env, depth)?;
                if !(previous $op current) {
                    return Ok(Value::Bool(false));
                }
                previous = current;
            }
            Ok(Value::Bool(true))
        }
    };
}

numeric_comparison!(builtin_lt, <);
numeric_comparison!(builtin_le, <=);
numeric_comparison!(builtin_gt, >);
numeric_comparison!(builtin_ge, >=);
numeric_comparison!(builtin_num_eq, ==);

//
// Logic. `and` and `or` are ordinary builtins for arity purposes but
// short-circuit internally: the deciding value itself is returned and
// the remaining arguments stay unevaluated.
//

fn builtin_and(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let Some((last, leading)) = args.split_last() else {
        return Ok(Value::Bool(true));
    };
    for expr in leading {
        let value = eval_at_depth(expr, env, depth + 1)?;
        if !value.is_truthy() {
            return Ok(value);
        }
    }
    eval_at_depth(last, env, depth + 1)
}

fn builtin_or(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let Some((last, leading)) = args.split_last() else {
        return Ok(Value::Bool(false));
    };
    for expr in leading {
        let value = eval_at_depth(expr, env, depth + 1)?;
        if value.is_truthy() {
            return Ok(value);
        }
    }
    eval_at_depth(last, env, depth + 1)
}

fn builtin_not(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [expr] = args else {
        return Err(wrong_arity(false, args.len(), "not"));
    };
    let value = eval_at_depth(expr, env, depth + 1)?;
    Ok(Value::Bool(!value.is_truthy()))
}

//
// Pairs and lists
//

fn builtin_cons(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [head_expr, tail_expr] = args else {
        return Err(wrong_arity(false, args.len(), "cons"));
    };
    let head = eval_at_depth(head_expr, env, depth + 1)?;
    let tail = eval_at_depth(tail_expr, env, depth + 1)?;
    Ok(Value::cons(head, tail))
}

fn builtin_car(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [expr] = args else {
        return Err(wrong_arity(false, args.len(), "car"));
    };
    match eval_at_depth(expr, env, depth + 1)? {
        Value::Pair(pair) => Ok(pair.borrow().head.clone()),
        Value::Nil => Err(Error::runtime("cannot take the head of an empty list")),
        other => Err(pair_expected(&other)),
    }
}

fn builtin_cdr(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [expr] = args else {
        return Err(wrong_arity(false, args.len(), "cdr"));
    };
    match eval_at_depth(expr, env, depth + 1)? {
        Value::Pair(pair) => Ok(pair.borrow().tail.clone()),
        Value::Nil => Err(Error::runtime("cannot take the tail of an empty list")),
        other => Err(pair_expected(&other)),
    }
}

fn builtin_list(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let mut values = Vec::with_capacity(args.len());
    for expr in args {
        values.push(eval_at_depth(expr, env, depth + 1)?);
    }
    Ok(Value::list(values))
}

/// Evaluate a `list-ref`/`list-tail` subject: a pair or the empty
/// list, flattened into its elements (a dotted tail counts as the last
/// element).
fn eval_list_argument(
    expr: &Value,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<(Value, Vec<Value>), Error> {
    let list = eval_at_depth(expr, env, depth + 1)?;
    let elements = match &list {
        Value::Pair(_) => list.flatten(),
        Value::Nil => Vec::new(),
        other => return Err(pair_expected(other)),
    };
    Ok((list, elements))
}

fn builtin_list_ref(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [list_expr, index_expr] = args else {
        return Err(wrong_arity(false, args.len(), "list-ref"));
    };
    let (list, elements) = eval_list_argument(list_expr, env, depth)?;
    let index = eval_number(index_expr, env, depth)?;
    usize::try_from(index)
        .ok()
        .and_then(|i| elements.get(i).cloned())
        .ok_or_else(|| Error::runtime(format!("list index out of range: {list}, {index}")))
}

fn builtin_list_tail(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [list_expr, index_expr] = args else {
        return Err(wrong_arity(false, args.len(), "list-tail"));
    };
    let (list, elements) = eval_list_argument(list_expr, env, depth)?;
    let index = eval_number(index_expr, env, depth)?;
    let out_of_range =
        || Error::runtime(format!("list tail index out of range: {list}, {index}"));

    let mut remaining = usize::try_from(index).map_err(|_| out_of_range())?;
    if remaining > elements.len() {
        return Err(out_of_range());
    }
    let mut cursor = list;
    while remaining > 0 {
        let Value::Pair(pair) = cursor else {
            // A dotted tail ends the walk early
            break;
        };
        cursor = pair.borrow().tail.clone();
        remaining -= 1;
    }
    Ok(cursor)
}

fn builtin_set_car(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [pair_expr, value_expr] = args else {
        return Err(wrong_arity(false, args.len(), "set-car!"));
    };
    match eval_at_depth(pair_expr, env, depth + 1)? {
        Value::Pair(pair) => {
            let value = eval_at_depth(value_expr, env, depth + 1)?;
            pair.borrow_mut().head = value;
            Ok(Value::Nil)
        }
        other => Err(pair_expected(&other)),
    }
}

fn builtin_set_cdr(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [pair_expr, value_expr] = args else {
        return Err(wrong_arity(false, args.len(), "set-cdr!"));
    };
    match eval_at_depth(pair_expr, env, depth + 1)? {
        Value::Pair(pair) => {
            let value = eval_at_depth(value_expr, env, depth + 1)?;
            pair.borrow_mut().tail = value;
            Ok(Value::Nil)
        }
        other => Err(pair_expected(&other)),
    }
}

//
// Predicates
//

macro_rules! type_predicate {
    ($fn_name:ident, $name:expr, $pattern:pat) => {
        fn $fn_name(
            args: &[Value],
            env: &Rc<Environment>,
            depth: usize,
        ) -> Result<Value, Error> {
            let [expr] = args else {
                return Err(wrong_arity(false, args.len(), $name));
            };
            let value = eval_at_depth(expr, env, depth + 1)?;
            Ok(Value::Bool(matches!(value, $pattern)))
        }
    };
}

type_predicate!(builtin_is_boolean, "boolean?", Value::Bool(_));
type_predicate!(builtin_is_number, "number?", Value::Number(_));
type_predicate!(builtin_is_symbol, "symbol?", Value::Symbol(_));
type_predicate!(builtin_is_pair, "pair?", Value::Pair(_));
type_predicate!(builtin_is_null, "null?", Value::Nil);

fn builtin_is_list(args: &[Value], env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
    let [expr] = args else {
        return Err(wrong_arity(false, args.len(), "list?"));
    };
    let mut cursor = eval_at_depth(expr, env, depth + 1)?;
    loop {
        match cursor {
            Value::Nil => return Ok(Value::Bool(true)),
            Value::Pair(pair) => {
                let next = pair.borrow().tail.clone();
                cursor = next;
            }
            _ => return Ok(Value::Bool(false)),
        }
    }
}

/// The registry of every built-in operation, special forms included.
/// All of them are installed in the root environment as ordinary,
/// first-class bindings.
static BUILTIN_OPS: &[BuiltinOp] = &[
    // Binding forms and control flow (special)
    BuiltinOp {
        name: "quote",
        kind: OpKind::SpecialForm(eval_quote),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "lambda",
        kind: OpKind::SpecialForm(eval_lambda),
        arity: Arity::AtLeast(2),
    },
    BuiltinOp {
        name: "define",
        kind: OpKind::SpecialForm(eval_define),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        name: "set!",
        kind: OpKind::SpecialForm(eval_set),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        name: "if",
        kind: OpKind::SpecialForm(eval_if),
        arity: Arity::Range(2, 3),
    },
    // Arithmetic
    BuiltinOp {
        name: "+",
        kind: OpKind::Function(builtin_add),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "-",
        kind: OpKind::Function(builtin_sub),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        name: "*",
        kind: OpKind::Function(builtin_mul),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "/",
        kind: OpKind::Function(builtin_div),
        arity: Arity::AtLeast(2),
    },
    BuiltinOp {
        name: "max",
        kind: OpKind::Function(builtin_max),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        name: "min",
        kind: OpKind::Function(builtin_min),
        arity: Arity::AtLeast(1),
    },
    BuiltinOp {
        name: "abs",
        kind: OpKind::Function(builtin_abs),
        arity: Arity::Exact(1),
    },
    // Comparison
    BuiltinOp {
        name: "<",
        kind: OpKind::Function(builtin_lt),
        arity: Arity::NoneOrAtLeast(2),
    },
    BuiltinOp {
        name: "<=",
        kind: OpKind::Function(builtin_le),
        arity: Arity::NoneOrAtLeast(2),
    },
    BuiltinOp {
        name: ">",
        kind: OpKind::Function(builtin_gt),
        arity: Arity::NoneOrAtLeast(2),
    },
    BuiltinOp {
        name: ">=",
        kind: OpKind::Function(builtin_ge),
        arity: Arity::NoneOrAtLeast(2),
    },
    BuiltinOp {
        name: "=",
        kind: OpKind::Function(builtin_num_eq),
        arity: Arity::NoneOrAtLeast(2),
    },
    // Logic
    BuiltinOp {
        name: "and",
        kind: OpKind::Function(builtin_and),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "or",
        kind: OpKind::Function(builtin_or),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "not",
        kind: OpKind::Function(builtin_not),
        arity: Arity::Exact(1),
    },
    // Pairs and lists
    BuiltinOp {
        name: "cons",
        kind: OpKind::Function(builtin_cons),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        name: "car",
        kind: OpKind::Function(builtin_car),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "cdr",
        kind: OpKind::Function(builtin_cdr),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "list",
        kind: OpKind::Function(builtin_list),
        arity: Arity::Any,
    },
    BuiltinOp {
        name: "list-ref",
        kind: OpKind::Function(builtin_list_ref),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        name: "list-tail",
        kind: OpKind::Function(builtin_list_tail),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        name: "set-car!",
        kind: OpKind::Function(builtin_set_car),
        arity: Arity::Exact(2),
    },
    BuiltinOp {
        name: "set-cdr!",
        kind: OpKind::Function(builtin_set_cdr),
        arity: Arity::Exact(2),
    },
    // Predicates
    BuiltinOp {
        name: "boolean?",
        kind: OpKind::Function(builtin_is_boolean),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "number?",
        kind: OpKind::Function(builtin_is_number),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "symbol?",
        kind: OpKind::Function(builtin_is_symbol),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "pair?",
        kind: OpKind::Function(builtin_is_pair),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "list?",
        kind: OpKind::Function(builtin_is_list),
        arity: Arity::Exact(1),
    },
    BuiltinOp {
        name: "null?",
        kind: OpKind::Function(builtin_is_null),
        arity: Arity::Exact(1),
    },
];

/// Name index over the registry.
static OPS_BY_NAME: LazyLock<HashMap<&'static str, &'static BuiltinOp>> =
    LazyLock::new(|| BUILTIN_OPS.iter().map(|op| (op.name, op)).collect());

/// All registered operations.
pub fn builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS
}

/// Find an operation by its published name.
pub fn find_op(name: &str) -> Option<&'static BuiltinOp> {
    OPS_BY_NAME.get(name).copied()
}

/// Install every operation into `env` under its published name.
pub fn install(env: &Environment) {
    for op in BUILTIN_OPS {
        env.define(op.name, Value::Builtin(op));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::eval;
    use crate::reader::read_expression;
    use crate::tokenizer::Tokenizer;

    fn global_env() -> Rc<Environment> {
        let env = Environment::new();
        install(&env);
        env
    }

    fn eval_str(input: &str, env: &Rc<Environment>) -> Result<Value, Error> {
        let mut tokens = Tokenizer::new(input)?;
        let expr = read_expression(&mut tokens)?;
        eval(&expr, env)
    }

    /// Expected outcome: `Ok` compares the printed representation,
    /// `Fails` expects a runtime error.
    enum Expected {
        Ok(&'static str),
        Fails,
    }

    /// Run each case in a fresh environment and compare printed output.
    fn run_cases(test_cases: Vec<(&str, Expected)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let env = global_env();
            let result = eval_str(input, &env);
            match (result, expected) {
                (Ok(actual), Expected::Ok(text)) => {
                    assert_eq!(
                        actual.to_string(),
                        *text,
                        "case #{}: '{input}'",
                        i + 1
                    );
                }
                (Err(Error::RuntimeError(_)), Expected::Fails) => {}
                (actual, _) => panic!("case #{}: '{input}': got {actual:?}", i + 1),
            }
        }
    }

    #[test]
    fn test_registry() {
        // Special forms are flagged; arity failures on them become
        // syntax errors in the evaluator
        for name in ["quote", "lambda", "define", "set!", "if"] {
            let op = find_op(name).unwrap();
            assert!(op.is_special_form(), "{name} must be a special form");
        }
        for name in ["+", "car", "and", "null?"] {
            let op = find_op(name).unwrap();
            assert!(!op.is_special_form(), "{name} must not be a special form");
        }

        assert_eq!(find_op("+").unwrap().arity, Arity::Any);
        assert_eq!(find_op("/").unwrap().arity, Arity::AtLeast(2));
        assert_eq!(find_op("if").unwrap().arity, Arity::Range(2, 3));
        assert_eq!(find_op("<").unwrap().arity, Arity::NoneOrAtLeast(2));
        assert!(find_op("unknown-op").is_none());

        // install() binds every registry entry
        let env = global_env();
        for op in builtin_ops() {
            assert!(
                matches!(env.lookup(op.name), Some(Value::Builtin(_))),
                "{} missing from the root environment",
                op.name
            );
        }
    }

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::Exact(2).accepts(2));
        assert!(!Arity::Exact(2).accepts(1));
        assert!(!Arity::Exact(2).accepts(3));

        assert!(Arity::AtLeast(1).accepts(1));
        assert!(Arity::AtLeast(1).accepts(5));
        assert!(!Arity::AtLeast(1).accepts(0));

        assert!(Arity::Range(2, 3).accepts(2));
        assert!(Arity::Range(2, 3).accepts(3));
        assert!(!Arity::Range(2, 3).accepts(1));
        assert!(!Arity::Range(2, 3).accepts(4));

        assert!(Arity::NoneOrAtLeast(2).accepts(0));
        assert!(!Arity::NoneOrAtLeast(2).accepts(1));
        assert!(Arity::NoneOrAtLeast(2).accepts(2));
        assert!(Arity::NoneOrAtLeast(2).accepts(9));

        assert!(Arity::Any.accepts(0));
        assert!(Arity::Any.accepts(100));
    }

    #[test]
    fn test_arithmetic() {
        use Expected::*;

        run_cases(vec![
            // Addition folds from its identity
            ("(+)", Ok("0")),
            ("(+ 42)", Ok("42")),
            ("(+ 1 2 3)", Ok("6")),
            ("(+ -5 10)", Ok("5")),
            // Unary minus negates
            ("(- 10)", Ok("-10")),
            ("(- -5)", Ok("5")),
            ("(- 10 3 2)", Ok("5")),
            ("(-)", Fails),
            // Multiplication folds from its identity
            ("(*)", Ok("1")),
            ("(* 7)", Ok("7")),
            ("(* 2 3 4)", Ok("24")),
            ("(* -2 3)", Ok("-6")),
            // Integer division, left fold, at least two arguments
            ("(/ 7 2)", Ok("3")),
            ("(/ -7 2)", Ok("-3")),
            ("(/ 100 5 2)", Ok("10")),
            ("(/ 5)", Fails),
            ("(/ 1 0)", Fails),
            ("(/ 10 2 0)", Fails),
            // max/min need at least one argument
            ("(max 5)", Ok("5")),
            ("(max 1 3 2)", Ok("3")),
            ("(min -5 -1 -10)", Ok("-10")),
            ("(max)", Fails),
            ("(min)", Fails),
            ("(abs -7)", Ok("7")),
            ("(abs 7)", Ok("7")),
            ("(abs 0)", Ok("0")),
            ("(abs 1 2)", Fails),
            // Type errors
            ("(+ 1 #t)", Fails),
            ("(* 2 '(1))", Fails),
            ("(abs '())", Fails),
            // Checked arithmetic
            ("(+ 9223372036854775807 1)", Fails),
            ("(- 0 9223372036854775807 9223372036854775807)", Fails),
            ("(* 4611686018427387904 2)", Fails),
            ("(+ 9223372036854775807 0)", Ok("9223372036854775807")),
            // Nesting
            ("(+ (* 2 3) (- 8 2))", Ok("12")),
        ]);
    }

    #[test]
    fn test_comparisons() {
        use Expected::*;

        run_cases(vec![
            // Zero arguments are vacuously true, one is an arity error
            ("(<)", Ok("#t")),
            ("(< 1)", Fails),
            ("(=)", Ok("#t")),
            ("(= 1)", Fails),
            // Adjacent-pairs chains
            ("(< 1 2)", Ok("#t")),
            ("(< 2 1)", Ok("#f")),
            ("(< 1 2 3)", Ok("#t")),
            ("(< 1 3 2)", Ok("#f")),
            ("(< 1 1)", Ok("#f")),
            ("(<= 1 1 2)", Ok("#t")),
            ("(<= 1 0)", Ok("#f")),
            ("(> 3 2 1)", Ok("#t")),
            ("(> 3 3)", Ok("#f")),
            ("(>= 3 3 2)", Ok("#t")),
            ("(>= 2 3)", Ok("#f")),
            ("(= 7 7 7)", Ok("#t")),
            ("(= 7 7 4)", Ok("#f")),
            // Only numbers compare
            ("(< 1 #t)", Fails),
            ("(= 1 '())", Fails),
        ]);
    }

    #[test]
    fn test_logic() {
        use Expected::*;

        run_cases(vec![
            // The deciding value itself is returned
            ("(and)", Ok("#t")),
            ("(and 1 2 3)", Ok("3")),
            ("(and #f 2)", Ok("#f")),
            ("(and 1 #f 3)", Ok("#f")),
            ("(and 0 '())", Ok("()")),
            ("(or)", Ok("#f")),
            ("(or #f #f)", Ok("#f")),
            ("(or #f 2 3)", Ok("2")),
            ("(or 1 2)", Ok("1")),
            // Short-circuit: the rest is never evaluated
            ("(and #f (/ 1 0))", Ok("#f")),
            ("(or 1 (/ 1 0))", Ok("1")),
            ("(and #f undefined-var)", Ok("#f")),
            ("(or 1 undefined-var)", Ok("1")),
            // not uses general truthiness
            ("(not #f)", Ok("#t")),
            ("(not #t)", Ok("#f")),
            ("(not 0)", Ok("#f")),
            ("(not '())", Ok("#f")),
            ("(not (quote x))", Ok("#f")),
            ("(not #t #f)", Fails),
        ]);
    }

    #[test]
    fn test_pairs_and_lists() {
        use Expected::*;

        run_cases(vec![
            // cons builds both proper and dotted structure
            ("(cons 1 2)", Ok("(1 . 2)")),
            ("(cons 1 '())", Ok("(1)")),
            ("(cons 1 (cons 2 '()))", Ok("(1 2)")),
            ("(cons '(1) '(2))", Ok("((1) 2)")),
            ("(cons 1)", Fails),
            // car/cdr
            ("(car '(1 2 3))", Ok("1")),
            ("(car (cons 1 2))", Ok("1")),
            ("(cdr (cons 1 2))", Ok("2")),
            ("(cdr '(1 2 3))", Ok("(2 3)")),
            ("(cdr '(1))", Ok("()")),
            ("(car '())", Fails),
            ("(cdr '())", Fails),
            ("(car 5)", Fails),
            ("(cdr #t)", Fails),
            // list
            ("(list)", Ok("()")),
            ("(list 1 2 3)", Ok("(1 2 3)")),
            ("(list 1 '(2) #t)", Ok("(1 (2) #t)")),
            // list-ref indexes the flattened elements
            ("(list-ref '(1 2 3) 0)", Ok("1")),
            ("(list-ref '(1 2 3) 2)", Ok("3")),
            ("(list-ref '(1 2 3) 3)", Fails),
            ("(list-ref '(1 2 3) -1)", Fails),
            ("(list-ref '() 0)", Fails),
            ("(list-ref 5 0)", Fails),
            // A dotted tail is addressable as the last element
            ("(list-ref '(1 . 2) 1)", Ok("2")),
            // list-tail may consume the whole list
            ("(list-tail '(1 2 3) 0)", Ok("(1 2 3)")),
            ("(list-tail '(1 2 3) 1)", Ok("(2 3)")),
            ("(list-tail '(1 2 3) 3)", Ok("()")),
            ("(list-tail '(1 2 3) 4)", Fails),
            ("(list-tail '() 0)", Ok("()")),
            ("(list-tail '(1 . 2) 1)", Ok("2")),
        ]);
    }

    #[test]
    fn test_predicates() {
        use Expected::*;

        run_cases(vec![
            ("(boolean? #t)", Ok("#t")),
            ("(boolean? #f)", Ok("#t")),
            ("(boolean? 0)", Ok("#f")),
            ("(number? 42)", Ok("#t")),
            ("(number? #t)", Ok("#f")),
            ("(symbol? 'x)", Ok("#t")),
            ("(symbol? 42)", Ok("#f")),
            // The empty list is not a pair
            ("(pair? '(1))", Ok("#t")),
            ("(pair? '(1 . 2))", Ok("#t")),
            ("(pair? '())", Ok("#f")),
            ("(pair? 1)", Ok("#f")),
            // list? requires a ()-terminated chain
            ("(list? '())", Ok("#t")),
            ("(list? '(1 2 3))", Ok("#t")),
            ("(list? '(1 . 2))", Ok("#f")),
            ("(list? '(1 2 . 3))", Ok("#f")),
            ("(list? 5)", Ok("#f")),
            ("(null? '())", Ok("#t")),
            ("(null? '(1))", Ok("#f")),
            ("(null? 0)", Ok("#f")),
            ("(null? #f)", Ok("#f")),
            // Predicates take exactly one argument
            ("(null?)", Fails),
            ("(pair? 1 2)", Fails),
        ]);
    }

    #[test]
    fn test_pair_mutation_aliasing() {
        let env = global_env();

        eval_str("(define x (list 1 2 3))", &env).unwrap();
        eval_str("(define y x)", &env).unwrap();
        eval_str("(set-car! x 10)", &env).unwrap();
        // Both names alias the same cells
        assert_eq!(eval_str("y", &env).unwrap().to_string(), "(10 2 3)");

        eval_str("(set-cdr! (cdr x) 99)", &env).unwrap();
        assert_eq!(eval_str("y", &env).unwrap().to_string(), "(10 2 . 99)");

        // Mutation returns ()
        assert_eq!(eval_str("(set-car! x 1)", &env).unwrap(), Value::Nil);

        // The empty list is not a pair, and neither are atoms
        assert!(eval_str("(set-car! '() 1)", &env).is_err());
        assert!(eval_str("(set-cdr! 5 1)", &env).is_err());

        // A cycle built through set-cdr! is observable via pair?
        eval_str("(define c (list 1))", &env).unwrap();
        eval_str("(set-cdr! c c)", &env).unwrap();
        assert_eq!(
            eval_str("(pair? (cdr c))", &env).unwrap(),
            Value::Bool(true)
        );
    }
}
