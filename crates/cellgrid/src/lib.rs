//! # cellgrid
//!
//! A cell data and formula evaluation engine for grid editors.
//!
//! Cells are addressed in A1 notation. Raw text written to a cell is
//! classified as text, number, date, boolean or formula; formulas are parsed,
//! evaluated and kept up to date as the cells they read change.
//!
//! ## Features
//!
//! - Type inference with display formatting
//! - Formula arithmetic with SUM and AVERAGE over linear ranges
//! - Dependency tracking with circular reference rejection
//! - Incremental recalculation reporting every changed cell
//!
//! ## Example
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! workbook.write("B2", "2").unwrap();
//! workbook.write("B3", "3").unwrap();
//!
//! let outcome = workbook.write("B4", "=B2+B3").unwrap();
//! assert_eq!(outcome.value, CellValue::Number(5.0));
//!
//! // Changing an input recalculates everything that reads it
//! let outcome = workbook.write("B2", "10").unwrap();
//! assert!(outcome.changed.contains(&CellAddress::parse("B4").unwrap()));
//! assert_eq!(workbook.get("B4").unwrap().display_text, "13");
//! ```

pub mod prelude;
pub mod shared;
pub mod workbook;

pub use shared::SharedWorkbook;
pub use workbook::{Cell, CellSnapshot, Workbook, WriteOutcome};

// Re-export core types
pub use cellgrid_core::{
    infer, CellAddress, CellKind, CellRange, CellValue, DisplaySettings, Error, ErrorKind,
    Result,
};

// Re-export formula types
pub use cellgrid_formula::{
    evaluate, parse_formula, DependencyGraph, FormulaError, FormulaExpr, ValueLookup,
};
