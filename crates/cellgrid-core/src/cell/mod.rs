//! Cell-related types
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A linear span of cells (e.g., "A1:A10")
//! - [`CellValue`] and [`ErrorKind`] - The typed value stored in a cell
//! - [`CellKind`] - The inferred kind of a raw input

mod address;
mod kind;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use kind::CellKind;
pub use value::{CellValue, ErrorKind};
