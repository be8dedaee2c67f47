//! Error types for each stage of the pipeline.
//!
//! None of these unwind the process: the driver logs a `Display` of the
//! error and substitutes a default value so the surrounding statement, loop
//! or function can keep going, matching the Language's error model (§7 of
//! the design doc this crate implements).
use std::fmt;

/// A lexical error: malformed token text.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    UnterminatedString,
    UnknownOperator(String),
    UnknownCharacter(char),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedString => write!(f, "Error: Unterminated string literal"),
            LexError::UnknownOperator(op) => write!(f, "Error: Unknown operator '{op}'"),
            LexError::UnknownCharacter(c) => write!(f, "Error: Unknown character '{c}'"),
        }
    }
}

impl std::error::Error for LexError {}

/// A syntactic error produced by the recursive-descent parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// A semantic/runtime error raised while evaluating the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    UndefinedVariable(String),
    UndefinedFunction(String),
    MissingKey { key: String, variable: String },
    TypeMismatch(&'static str),
    InvalidIndex,
    InvalidAssignmentTarget,
    TooManyVariables,
    ScopeOverflow,
    ScopeUnderflow,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UndefinedVariable(name) => {
                write!(f, "Error: Undefined variable '{name}'")
            }
            EvalError::UndefinedFunction(name) => {
                write!(f, "Error: Undefined function '{name}'")
            }
            EvalError::MissingKey { key, variable } => {
                write!(f, "Error: Key '{key}' not found in variable '{variable}'")
            }
            EvalError::TypeMismatch(context) => {
                write!(
                    f,
                    "Error: Both operands must be numbers for {context} operations"
                )
            }
            EvalError::InvalidIndex => {
                write!(f, "Error: Array index must be a string or number")
            }
            EvalError::InvalidAssignmentTarget => {
                write!(f, "Error: Cannot assign an associative array to an array element")
            }
            EvalError::TooManyVariables => {
                write!(f, "Error: Maximum number of variables reached")
            }
            EvalError::ScopeOverflow => write!(f, "Error: Scope stack overflow"),
            EvalError::ScopeUnderflow => write!(f, "Error: Scope stack underflow"),
        }
    }
}

impl std::error::Error for EvalError {}
