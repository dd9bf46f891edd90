//! Centralised error hierarchy for the **debug expression evaluator**.
//!
//! Every subsystem (scanner, parser, walker, lvalues, evaluators, CLI) reports
//! failure through one of the variants defined here.  This enables a uniform
//! `Result<T>` alias throughout the crate and ergonomic inter‑operation with
//! `anyhow` in the binary, while still preserving the typed taxonomy callers
//! match on (parse vs. unresolved vs. unsupported vs. storage failures).
//!
//! Constructors log each error at `info` level as it is created; showing
//! errors to the user is left to the binary.

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the evaluator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// Lexical (scanner) error with source position.
    #[error("line {line}:{column} {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,

        /// 1‑based column where the offending lexeme starts.
        column: usize,
    },

    /// Malformed expression syntax.  Carries the grammar diagnostic.
    #[error("line {line}:{column} {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// A bare identifier matched neither a local variable nor a field of the
    /// implicit receiver.
    #[error("Unable to resolve '{name}': no such local variable or field")]
    UnresolvedIdentifier { name: String },

    /// The construct parses but evaluation of it is not implemented.
    #[error("Unsupported operation: {construct}")]
    Unsupported { construct: String },

    /// The debug target refused a read or write (thread not suspended, no
    /// frame, unknown field, index out of range, immutable target ...).
    #[error("Storage access failed: {0}")]
    StorageAccess(String),

    /// `set` on a computed (read‑only) value.
    #[error("Cannot assign to a computed value")]
    ImmutableValue,

    /// `set` with a value whose runtime type does not fit the location.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Any other failure raised by an evaluator primitive (bad operands, no
    /// matching method, invalid literal text ...).
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Snapshot (de)serialisation failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, column: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}:{}, msg={}", line, column, message);

        EvalError::Lex {
            message,
            line,
            column,
        }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, column: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}:{}, msg={}", line, column, message);

        EvalError::Parse {
            message,
            line,
            column,
        }
    }

    pub fn unresolved<S: Into<String>>(name: S) -> Self {
        EvalError::UnresolvedIdentifier { name: name.into() }
    }

    /// Helper constructor for recognised‑but‑unimplemented constructs.
    pub fn unsupported<S: Into<String>>(construct: S) -> Self {
        let construct: String = construct.into();

        info!("Creating Unsupported error: {}", construct);

        EvalError::Unsupported { construct }
    }

    pub fn storage<S: Into<String>>(msg: S) -> Self {
        EvalError::StorageAccess(msg.into())
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn evaluation<S: Into<String>>(msg: S) -> Self {
        EvalError::Evaluation(msg.into())
    }

    /// True for errors raised while turning text into an AST.
    pub fn is_syntax(&self) -> bool {
        matches!(self, EvalError::Lex { .. } | EvalError::Parse { .. })
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, EvalError>;
