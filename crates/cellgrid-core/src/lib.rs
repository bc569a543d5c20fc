//! # cellgrid-core
//!
//! Core data types for the cellgrid formula engine.
//!
//! This crate provides the leaf types used throughout cellgrid:
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and linear ranges
//! - [`CellValue`], [`CellKind`] and [`ErrorKind`] - Typed cell contents
//! - [`infer`] - Classification, validation and display of raw input
//! - [`DisplaySettings`] - How values are rendered for display
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_core::{infer, CellAddress, CellKind};
//!
//! let addr = CellAddress::parse("B2").unwrap();
//! assert_eq!((addr.row, addr.col), (1, 1));
//! assert_eq!(addr.to_string(), "B2");
//!
//! assert_eq!(infer::infer_kind("=B2*2"), CellKind::Formula);
//! assert_eq!(infer::infer_kind("10"), CellKind::Number);
//! ```

pub mod cell;
pub mod error;
pub mod infer;
pub mod settings;

// Re-exports for convenience
pub use cell::{CellAddress, CellKind, CellRange, CellRangeIterator, CellValue, ErrorKind};
pub use error::{Error, Result};
pub use settings::{DisplaySettings, DEFAULT_DATE_FORMAT};

/// Maximum number of cells a single range may span
pub const MAX_RANGE_CELLS: u64 = 1_048_576;
