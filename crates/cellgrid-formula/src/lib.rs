//! # cellgrid-formula
//!
//! Formula language for cellgrid.
//!
//! This crate provides:
//! - Formula parsing (text → AST), with functions resolved at parse time
//! - Formula evaluation (AST → value) over any [`ValueLookup`]
//! - The built-in function registry (SUM, AVERAGE)
//! - Dependency tracking for recalculation order and cycle detection
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use cellgrid_core::{CellAddress, CellValue};
//! use cellgrid_formula::{evaluate, parse_formula};
//!
//! let mut values = HashMap::new();
//! values.insert(CellAddress::parse("A1").unwrap(), CellValue::Number(4.0));
//! values.insert(CellAddress::parse("A2").unwrap(), CellValue::Number(6.0));
//!
//! let ast = parse_formula("SUM(A1:A2)*2").unwrap();
//! assert_eq!(evaluate(&ast, &values), CellValue::Number(20.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, ValueLookup};
pub use parser::{parse_formula, MAX_DEPTH};
