//! Formula Abstract Syntax Tree types

use cellgrid_core::{CellAddress, CellRange};
use std::collections::HashSet;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),

    /// Single cell reference
    CellRef(CellAddress),
    /// Linear range reference (only as a function argument)
    RangeRef(CellRange),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    /// Call of a registered function (name is upper case)
    Function { name: String, args: Vec<FormulaExpr> },
}

impl FormulaExpr {
    /// Every address this expression reads, ranges expanded
    ///
    /// Addresses appear once, in order of first occurrence.
    pub fn references(&self) -> Vec<CellAddress> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_references(&mut out, &mut seen);
        out
    }

    fn collect_references(&self, out: &mut Vec<CellAddress>, seen: &mut HashSet<CellAddress>) {
        match self {
            FormulaExpr::Number(_) => {}
            FormulaExpr::CellRef(addr) => {
                if seen.insert(*addr) {
                    out.push(*addr);
                }
            }
            FormulaExpr::RangeRef(range) => {
                out.extend(range.cells().filter(|addr| seen.insert(*addr)));
            }
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_references(out, seen);
                right.collect_references(out, seen);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.collect_references(out, seen),
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.collect_references(out, seen);
                }
            }
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
}
