//! Error types for cellgrid-core

use crate::cell::{CellKind, ErrorKind};
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cellgrid-core
///
/// These are request-level failures (a malformed address handed to the API,
/// input that no longer matches its kind). Cell-level failures are values,
/// see [`CellValue::Error`](crate::CellValue::Error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid or non-linear cell range
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Input does not satisfy the predicate of its kind
    #[error("Value '{input}' is not a valid {expected}")]
    TypeMismatch { expected: CellKind, input: String },
}

impl Error {
    /// The cell error kind this failure corresponds to
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidAddress(_) => ErrorKind::InvalidReference,
            Error::InvalidRange(_) => ErrorKind::RangeMismatch,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        }
    }
}
