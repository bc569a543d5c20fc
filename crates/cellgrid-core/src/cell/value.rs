//! Cell value types

use chrono::NaiveDate;
use std::fmt;

/// Represents the value stored in a cell
///
/// Exactly one variant is active. Blank cells are not materialized; they read
/// as an empty [`CellValue::Text`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Text value (also the value of a blank or cleared cell)
    Text(String),

    /// Numeric value
    Number(f64),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Calendar date
    Date(NaiveDate),

    /// Error value produced while computing the cell
    Error(ErrorKind),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// The value of a cell that was never written
    pub fn blank() -> Self {
        CellValue::Text(String::new())
    }

    /// Check if this is blank text
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    /// Check if the cell contains an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Get the error if this is one
    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            CellValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Try to get the value as a number
    ///
    /// Booleans count as 1/0, dates as their serial day number, and text only
    /// when it is blank (0) or spells a decimal number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(true) => Some(1.0),
            CellValue::Boolean(false) => Some(0.0),
            CellValue::Date(d) => Some(date_to_serial(*d)),
            CellValue::Text(s) if s.trim().is_empty() => Some(0.0),
            CellValue::Text(s) => crate::infer::parse_number(s),
            CellValue::Error(_) => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::blank()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<ErrorKind> for CellValue {
    fn from(e: ErrorKind) -> Self {
        CellValue::Error(e)
    }
}

/// Days since 1899-12-30, the spreadsheet serial date epoch
fn date_to_serial(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}

/// The kinds of error a cell value can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Formula text does not follow the grammar
    ParseError,
    /// Formula depends on itself
    CircularReference,
    /// Formula calls a function that is not registered
    UnknownFunction,
    /// Range is malformed, rectangular, or used where it is not allowed
    RangeMismatch,
    /// Operand cannot be used as a number
    TypeMismatch,
    /// Division by zero (including AVERAGE of nothing)
    DivideByZero,
    /// Reference does not name a valid cell
    InvalidReference,
}

impl ErrorKind {
    /// Short diagnostic code shown after `#ERROR!`
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::ParseError => "PARSE",
            ErrorKind::CircularReference => "CIRCULAR",
            ErrorKind::UnknownFunction => "NAME",
            ErrorKind::RangeMismatch => "RANGE",
            ErrorKind::TypeMismatch => "VALUE",
            ErrorKind::DivideByZero => "DIV/0",
            ErrorKind::InvalidReference => "REF",
        }
    }

    /// Render for display, with or without the diagnostic code
    pub fn display_text(&self, with_detail: bool) -> String {
        if with_detail {
            format!("#ERROR! ({})", self.code())
        } else {
            "#ERROR!".to_string()
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_text(true))
    }
}
