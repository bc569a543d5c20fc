//! Formula error types

use cellgrid_core::ErrorKind;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing a formula
///
/// Every variant records the byte offset of the offending token within the
/// formula text (the text after the leading `=`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula does not follow the grammar
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Unknown function
    #[error("Unknown function at position {position}: {name}")]
    UnknownFunction { position: usize, name: String },

    /// Malformed, rectangular or oversized range
    #[error("Invalid range at position {position}: {message}")]
    RangeMismatch { position: usize, message: String },

    /// Reference to invalid cell
    #[error("Invalid reference at position {position}: {message}")]
    InvalidReference { position: usize, message: String },
}

impl FormulaError {
    pub(crate) fn parse<S: Into<String>>(position: usize, message: S) -> Self {
        FormulaError::Parse {
            position,
            message: message.into(),
        }
    }

    /// Byte offset of the offending token
    pub fn position(&self) -> usize {
        match self {
            FormulaError::Parse { position, .. }
            | FormulaError::UnknownFunction { position, .. }
            | FormulaError::RangeMismatch { position, .. }
            | FormulaError::InvalidReference { position, .. } => *position,
        }
    }

    /// The cell error kind a formula failing this way evaluates to
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::Parse { .. } => ErrorKind::ParseError,
            FormulaError::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            FormulaError::RangeMismatch { .. } => ErrorKind::RangeMismatch,
            FormulaError::InvalidReference { .. } => ErrorKind::InvalidReference,
        }
    }
}
