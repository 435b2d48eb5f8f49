//! Error taxonomy for the Logo pipeline
//!
//! Lexing never fails (unrecognized lexemes become ERROR tokens); parse and
//! runtime failures are represented here. Parse errors are collected with
//! recovery so several can be reported per run; a runtime error aborts the
//! in-flight execution.

use thiserror::Error;

/// A grammar violation, with the position of the offending token.
#[derive(Debug, Clone, Error)]
#[error("line {line}, col {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// A failure during execution. Aborts the current run immediately; the
/// interpreter catches it at the top level and appends it to the trace.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("line {line}: I don't know how to {name}")]
    UnknownProcedure { name: String, line: usize },

    #[error("line {line}: :{name} has no value")]
    UndefinedVariable { name: String, line: usize },

    #[error("line {line}: {name} expects {expected} inputs, got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
        line: usize,
    },

    #[error("line {line}: {message}")]
    TypeMismatch { message: String, line: usize },

    #[error("line {line}: division by zero")]
    DivisionByZero { line: usize },

    #[error("line {line}: REPEAT count must be a non-negative whole number")]
    BadRepeatCount { line: usize },

    #[error("line {line}: RANDOM needs a positive whole number")]
    BadRandomBound { line: usize },

    #[error("line {line}: too many nested procedure calls")]
    RecursionLimit { line: usize },

    #[error("line {line}: {name} did not output a value")]
    NoOutput { name: String, line: usize },

    #[error("line {line}: OUTPUT can only be used inside a procedure")]
    StrayOutput { line: usize },
}
