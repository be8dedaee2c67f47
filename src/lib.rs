//! Keyva: a small dynamically-typed scripting language.
//!
//! The crate is split into the usual front-to-back pipeline: [`lexer`] turns
//! source text into a flat token stream, [`ast`] turns that stream into a
//! syntax tree via a recursive-descent parser, and [`interpreter`] walks the
//! tree to produce output.
pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;

use std::io::Write;

pub use interpreter::Interpreter;

/// Lex, parse and execute `source` against a fresh interpreter, writing any
/// `print`ed output to `out`.
///
/// This is the single entry point both the CLI binary and the integration
/// tests drive; it mirrors the reference implementation's
/// `tokenize -> parse_and_execute` pipeline, run once over the whole buffer.
pub fn run_program<W: Write>(source: &str, out: &mut W) {
    let mut interpreter = Interpreter::new();
    interpreter.run(source, out);
}
