//! The tree-walking evaluator: statement/expression execution, the call
//! stack, and the built-in library.
mod builtins;
mod environment;
mod value;

pub use value::{AssocArray, Value};

use std::io::Write;

use log::{debug, trace};

use crate::ast::parser::Parser;
use crate::ast::{AssignTarget, BinaryOp, Block, Expr, FunctionTable, Stmt};
use crate::error::EvalError;
use crate::lexer::Lexer;

use environment::Environment;
use value::text_to_value;

/// Which rule identifier/literal resolution follows. Both variants behave
/// identically for plain identifiers today (the scalar-collapse rule is the
/// same either way); the flag exists because array-index evaluation and
/// assignment-index evaluation deliberately use different ones (see
/// `exec_assignment`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalContext {
    Arithmetic,
    Print,
}

/// Whether a block finished normally or is unwinding with a return value.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Normal,
    Returning(Value),
}

/// One running program: its variable frames and the table of functions
/// registered so far. Persists across repeated calls to `run` so a REPL can
/// submit one block at a time and still see earlier definitions.
pub struct Interpreter {
    env: Environment,
    functions: FunctionTable,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            env: Environment::new(),
            functions: FunctionTable::new(),
        }
    }

    /// Lex and parse `source`, executing each statement as soon as it is
    /// parsed (not after the whole buffer parses) so a function defined by
    /// one statement is callable from a later statement in the same
    /// submission. A parse error stops the rest of this submission but
    /// leaves earlier side effects in place.
    pub fn run<W: Write>(&mut self, source: &str, out: &mut W) {
        let tokens = match Lexer::new(source).lex() {
            Ok(tokens) => tokens,
            Err(err) => {
                eprintln!("{err}");
                return;
            }
        };
        trace!("lexed {} tokens", tokens.len());

        let mut parser = Parser::new(tokens, &mut self.functions);

        while let Some(result) = parser.next_statement() {
            let stmt = match result {
                Ok(stmt) => stmt,
                Err(err) => {
                    eprintln!("{err}");
                    break;
                }
            };

            if let ControlFlow::Returning(_) = self.exec_stmt(&stmt, out) {
                debug!("top-level return; stopping remaining statements in this submission");
                break;
            }
        }
    }

    fn exec_block(&mut self, block: &Block, out: &mut dyn Write) -> ControlFlow {
        for stmt in block {
            let flow = self.exec_stmt(stmt, out);
            if let ControlFlow::Returning(_) = flow {
                return flow;
            }
        }
        ControlFlow::Normal
    }

    fn exec_stmt(&mut self, stmt: &Stmt, out: &mut dyn Write) -> ControlFlow {
        match stmt {
            Stmt::Assignment { target, value } => {
                self.exec_assignment(target, value, out);
                ControlFlow::Normal
            }
            Stmt::Print(expr) => {
                let value = self.eval_or_default(expr, EvalContext::Print, out);
                let _ = writeln!(out, "{}", format_for_print(&value));
                ControlFlow::Normal
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
            } => {
                let condition = self.eval_or_default(condition, EvalContext::Arithmetic, out);
                if condition.is_truthy() {
                    self.exec_block(then_block, out)
                } else if let Some(else_block) = else_block {
                    self.exec_block(else_block, out)
                } else {
                    ControlFlow::Normal
                }
            }
            Stmt::While { condition, body } => {
                loop {
                    let condition = self.eval_or_default(condition, EvalContext::Arithmetic, out);
                    if !condition.is_truthy() {
                        break;
                    }
                    let flow = self.exec_block(body, out);
                    if let ControlFlow::Returning(_) = flow {
                        return flow;
                    }
                }
                ControlFlow::Normal
            }
            Stmt::For { var, expr, body } => self.exec_for(var, expr, body, out),
            Stmt::FunctionDef { .. } => ControlFlow::Normal,
            Stmt::Call { name, args } => {
                self.call_function(name, args, out);
                ControlFlow::Normal
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_or_default(expr, EvalContext::Arithmetic, out),
                    None => text_to_value("0"),
                };
                ControlFlow::Returning(value)
            }
        }
    }

    fn exec_for(&mut self, var: &str, expr: &Expr, body: &Block, out: &mut dyn Write) -> ControlFlow {
        let iterable = self.eval_or_default(expr, EvalContext::Print, out);
        let elements: Vec<(String, String)> = match iterable {
            Value::Array(array) => array.iter().cloned().collect(),
            other => vec![(String::new(), other.as_scalar_text())],
        };

        for (key, value) in elements {
            if let Err(err) = self.env.set(var, AssocArray::pair(key, value)) {
                eprintln!("{err}");
                continue;
            }

            let flow = self.exec_block(body, out);

            if let Some(array) = self.env.get_mut(var) {
                array.clear();
            }

            if let ControlFlow::Returning(_) = flow {
                return flow;
            }
        }

        ControlFlow::Normal
    }

    fn exec_assignment(&mut self, target: &AssignTarget, value: &Expr, out: &mut dyn Write) {
        let value = self.eval_or_default(value, EvalContext::Arithmetic, out);

        match target {
            AssignTarget::Identifier(name) => match value {
                Value::Array(array) => {
                    if let Err(err) = self.env.set(name, array) {
                        eprintln!("{err}");
                    }
                }
                other => match self.env.get_or_create_mut(name) {
                    Ok(array) => array.set(String::new(), other.as_scalar_text()),
                    Err(err) => eprintln!("{err}"),
                },
            },
            AssignTarget::ArrayAccess { name, index } => {
                if matches!(value, Value::Array(_)) {
                    eprintln!("{}", EvalError::InvalidAssignmentTarget);
                    return;
                }

                let index_value = self.eval_or_default(index, EvalContext::Print, out);
                let key = match value_to_key_text(&index_value) {
                    Ok(key) => key,
                    Err(err) => {
                        eprintln!("{err}");
                        return;
                    }
                };

                match self.env.get_or_create_mut(name) {
                    Ok(array) => array.set(key, value.as_scalar_text()),
                    Err(err) => eprintln!("{err}"),
                }
            }
        }
    }

    /// Evaluate `expr`; on error, log the diagnostic and substitute number
    /// `0` so the surrounding statement can still complete (the Language
    /// has no exception-like unwinding visible to programs).
    fn eval_or_default(&mut self, expr: &Expr, ctx: EvalContext, out: &mut dyn Write) -> Value {
        match self.eval_expr(expr, ctx, out) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("{err}");
                Value::Number(0.0)
            }
        }
    }

    fn eval_expr(
        &mut self,
        expr: &Expr,
        ctx: EvalContext,
        out: &mut dyn Write,
    ) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(text) => Ok(text_to_value(text)),

            Expr::Identifier(name) => {
                let array = self
                    .env
                    .get(name)
                    .ok_or_else(|| EvalError::UndefinedVariable(name.clone()))?
                    .clone();

                let _ = ctx; // both contexts collapse identically
                match array.collapse_scalar() {
                    Some((_, v)) => Ok(text_to_value(v)),
                    None => Ok(Value::Array(array)),
                }
            }

            Expr::ArrayAccess { name, index } => {
                let index_value = self.eval_expr(index, EvalContext::Arithmetic, out)?;
                let key = value_to_key_text(&index_value)?;

                let array = self
                    .env
                    .get(name)
                    .ok_or_else(|| EvalError::UndefinedVariable(name.clone()))?;

                match array.get(&key) {
                    Some(value) => Ok(text_to_value(value)),
                    None => Err(EvalError::MissingKey {
                        key,
                        variable: name.clone(),
                    }),
                }
            }

            Expr::BinaryOp { op, lhs, rhs } => {
                let lhs = self.eval_expr(lhs, EvalContext::Arithmetic, out)?;
                let rhs = self.eval_expr(rhs, EvalContext::Arithmetic, out)?;
                apply_binary_op(*op, &lhs, &rhs)
            }

            Expr::FunctionCall { name, args } => Ok(self.call_function(name, args, out)),
        }
    }

    /// Dispatch a call by name: built-ins first, then user-defined
    /// functions. Arity/type errors inside a built-in or an undefined
    /// function name are diagnosed here and degrade to number `0`, matching
    /// the Language's general "log and substitute a default" error model.
    fn call_function(&mut self, name: &str, args: &[Expr], out: &mut dyn Write) -> Value {
        if let Some(value) = self.call_builtin(name, args, out) {
            return value;
        }

        let Some(entry) = self.functions.get(name).cloned() else {
            eprintln!("{}", EvalError::UndefinedFunction(name.to_owned()));
            return Value::Number(0.0);
        };

        let evaluated_args: Vec<Value> = args
            .iter()
            .map(|arg| self.eval_or_default(arg, EvalContext::Arithmetic, out))
            .collect();

        if let Err(err) = self.env.push() {
            eprintln!("{err}");
            return Value::Number(0.0);
        }

        for (i, param) in entry.params.iter().enumerate() {
            // Extra parameters beyond the argument count default to "0".
            let arg = evaluated_args
                .get(i)
                .cloned()
                .unwrap_or_else(|| Value::Str("0".to_owned()));

            let bound = match arg {
                Value::Array(array) => self.env.set(param, array),
                other => self
                    .env
                    .get_or_create_mut(param)
                    .map(|array| array.set(String::new(), other.as_scalar_text())),
            };
            if let Err(err) = bound {
                eprintln!("{err}");
            }
        }

        let flow = self.exec_block(&entry.body, out);

        if let Err(err) = self.env.pop() {
            eprintln!("{err}");
        }

        match flow {
            ControlFlow::Returning(value) => value,
            ControlFlow::Normal => Value::Number(0.0),
        }
    }
}

fn apply_binary_op(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let (a, b) = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => (*a, *b),
        _ if op.is_comparison() => return Err(EvalError::TypeMismatch("comparison")),
        _ => return Err(EvalError::TypeMismatch("arithmetic")),
    };

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => a / b,
        BinaryOp::LessThan => bool_to_number(a < b),
        BinaryOp::GreaterThan => bool_to_number(a > b),
        BinaryOp::Equal => bool_to_number(a == b),
        BinaryOp::NotEqual => bool_to_number(a != b),
        BinaryOp::LessEqual => bool_to_number(a <= b),
        BinaryOp::GreaterEqual => bool_to_number(a >= b),
    };

    Ok(Value::Number(result))
}

fn bool_to_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// The key text an index value contributes: a number in shortest-decimal
/// form, a string as-is. An array index is never valid.
fn value_to_key_text(value: &Value) -> Result<String, EvalError> {
    match value {
        Value::Number(n) => Ok(value::format_number(*n)),
        Value::Str(s) => Ok(s.clone()),
        Value::Array(_) => Err(EvalError::InvalidIndex),
    }
}

fn format_for_print(value: &Value) -> String {
    match value {
        Value::Number(n) => value::format_number(*n),
        Value::Str(s) => s.clone(),
        Value::Array(array) => array.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> String {
        let mut interpreter = Interpreter::new();
        let mut out = Vec::new();
        interpreter.run(source, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scalar_assignment_and_print_round_trip() {
        assert_eq!(run("x = 10\nprint(x)\n"), "10\n");
    }

    #[test]
    fn array_element_round_trips() {
        assert_eq!(run("a[\"k\"] = 3\nprint(a[\"k\"])\n"), "3\n");
    }

    #[test]
    fn numeric_index_matches_string_index() {
        assert_eq!(run("a[1] = \"x\"\nprint(a[\"1\"])\n"), "x\n");
    }

    #[test]
    fn function_returns_its_value() {
        assert_eq!(run("def square(n)\nreturn n*n\nend\nprint(square(7))\n"), "49\n");
    }

    #[test]
    fn empty_function_body_returns_zero() {
        assert_eq!(run("def f()\nend\nprint(f())\n"), "0\n");
    }

    #[test]
    fn missing_else_branch_is_a_no_op() {
        assert_eq!(run("if 0\nprint(1)\nend\nprint(2)\n"), "2\n");
    }

    #[test]
    fn truthiness_rules() {
        assert_eq!(run("if 0\nprint(1)\nend\n"), "");
        assert_eq!(run("if \"\"\nprint(1)\nend\n"), "");
        assert_eq!(run("if 1\nprint(1)\nend\n"), "1\n");
        assert_eq!(run("if \"x\"\nprint(1)\nend\n"), "1\n");
    }

    #[test]
    fn return_inside_nested_loop_unwinds() {
        let src = "def f()\nwhile 1\nreturn 9\nend\nreturn 1\nend\nprint(f())\n";
        assert_eq!(run(src), "9\n");
    }

    #[test]
    fn return_at_top_level_stops_remaining_statements() {
        assert_eq!(run("print(1)\nreturn\nprint(2)\n"), "1\n");
    }

    #[test]
    fn division_by_zero_follows_ieee754() {
        assert_eq!(run("print(1/0)\n"), "inf\n");
    }

    #[test]
    fn for_loop_clears_variable_after_each_iteration() {
        let src = "a[\"x\"] = 1\na[\"y\"] = 2\nfor k in a\nprint(k)\nend\nprint(k)\n";
        assert_eq!(run(src), "1\n2\n{}\n");
    }

    #[test]
    fn function_call_frame_hides_caller_variables() {
        let src = "x = 5\ndef f()\nreturn x\nend\nprint(f())\n";
        assert_eq!(run(src), "0\n");
    }

    #[test]
    fn redefining_a_function_overwrites_it() {
        let src = "def f()\nreturn 1\nend\ndef f()\nreturn 2\nend\nprint(f())\n";
        assert_eq!(run(src), "2\n");
    }
}
