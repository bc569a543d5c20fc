//! Prelude module - common imports for cellgrid users
//!
//! ```rust
//! use cellgrid::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellKind,
    CellRange,
    CellSnapshot,
    CellValue,
    DisplaySettings,

    // Error types
    Error,
    ErrorKind,
    Result,

    // Main types
    SharedWorkbook,
    Workbook,
    WriteOutcome,
};
