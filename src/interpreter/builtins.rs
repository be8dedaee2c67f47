//! The fixed built-in function table: `len`, `key`, `mod`, `bar`.
//!
//! Consulted before user-defined functions. Each handler receives the raw,
//! unevaluated argument expressions and decides its own evaluation
//! discipline, mirroring the reference's per-function arity checks.
use std::collections::HashSet;
use std::io::Write;

use lazy_static::lazy_static;

use crate::ast::Expr;

use super::value::{format_number, Value};
use super::{EvalContext, Interpreter};

lazy_static! {
    static ref BUILTIN_NAMES: HashSet<&'static str> = ["len", "key", "mod", "bar"].into_iter().collect();
}

impl Interpreter {
    pub(super) fn call_builtin(
        &mut self,
        name: &str,
        args: &[Expr],
        out: &mut dyn Write,
    ) -> Option<Value> {
        if !BUILTIN_NAMES.contains(name) {
            return None;
        }

        Some(match name {
            "len" => self.builtin_len(args, out),
            "key" => self.builtin_key(args, out),
            "mod" => self.builtin_mod(args, out),
            "bar" => self.builtin_bar(args),
            _ => unreachable!("checked against BUILTIN_NAMES above"),
        })
    }

    fn builtin_len(&mut self, args: &[Expr], out: &mut dyn Write) -> Value {
        if args.len() != 1 {
            eprintln!("Error: len() requires exactly one argument");
            return Value::Number(0.0);
        }

        let value = self.eval_or_default(&args[0], EvalContext::Print, out);
        let length = match value {
            Value::Array(array) => array.len(),
            Value::Number(_) | Value::Str(_) => 1,
        };
        Value::Number(length as f64)
    }

    /// For an identifier, the first key of its variable's array. For an
    /// array-access expression, the string form of the index. Anything else
    /// yields the empty string (unspecified by the reference, resolved
    /// that way — see DESIGN.md).
    fn builtin_key(&mut self, args: &[Expr], out: &mut dyn Write) -> Value {
        if args.len() != 1 {
            eprintln!("Error: key() requires exactly one argument");
            return Value::Str(String::new());
        }

        match &args[0] {
            Expr::Identifier(name) => match self.env.get(name) {
                Some(array) => {
                    let key = array.iter().next().map(|(k, _)| k.clone()).unwrap_or_default();
                    Value::Str(key)
                }
                None => Value::Str(String::new()),
            },
            Expr::ArrayAccess { index, .. } => {
                match self.eval_or_default(index, EvalContext::Arithmetic, out) {
                    Value::Number(n) => Value::Str(format_number(n)),
                    Value::Str(s) => Value::Str(s),
                    Value::Array(_) => {
                        eprintln!("Error: Array index must be a string or number");
                        Value::Str(String::new())
                    }
                }
            }
            _ => Value::Str(String::new()),
        }
    }

    fn builtin_mod(&mut self, args: &[Expr], out: &mut dyn Write) -> Value {
        if args.len() != 2 {
            eprintln!("Error: mod() requires exactly two arguments");
            return Value::Number(0.0);
        }

        let a = self.eval_or_default(&args[0], EvalContext::Arithmetic, out);
        let b = self.eval_or_default(&args[1], EvalContext::Arithmetic, out);

        match (a, b) {
            (Value::Number(a), Value::Number(b)) => {
                Value::Number(((a as i64) % (b as i64)) as f64)
            }
            _ => Value::Number(0.0),
        }
    }

    /// Reserved extension slot: does nothing, returns `0`. Kept as a named
    /// placeholder for future standard-library growth.
    fn builtin_bar(&mut self, _args: &[Expr]) -> Value {
        Value::Number(0.0)
    }
}
