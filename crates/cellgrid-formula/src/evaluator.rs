//! Formula evaluator
//!
//! Evaluates formula ASTs to produce values. Evaluation never fails with a
//! `Result`: anything that goes wrong becomes a [`CellValue::Error`].

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::functions::{self, FunctionArg};
use cellgrid_core::{CellAddress, CellValue, ErrorKind};
use std::collections::{BTreeMap, HashMap};

/// Read access to current cell values
///
/// Returning `None` means the cell is blank.
pub trait ValueLookup {
    fn value(&self, address: CellAddress) -> Option<CellValue>;
}

impl ValueLookup for HashMap<CellAddress, CellValue> {
    fn value(&self, address: CellAddress) -> Option<CellValue> {
        self.get(&address).cloned()
    }
}

impl ValueLookup for BTreeMap<CellAddress, CellValue> {
    fn value(&self, address: CellAddress) -> Option<CellValue> {
        self.get(&address).cloned()
    }
}

impl<T: ValueLookup + ?Sized> ValueLookup for &T {
    fn value(&self, address: CellAddress) -> Option<CellValue> {
        (**self).value(address)
    }
}

/// Evaluate a formula expression against current cell values
///
/// A formula that yields a blank cell (`=A1` with `A1` empty) evaluates to 0.
pub fn evaluate<L: ValueLookup + ?Sized>(expr: &FormulaExpr, lookup: &L) -> CellValue {
    match eval(expr, lookup) {
        Ok(value) if value.is_blank() => CellValue::Number(0.0),
        Ok(value) => value,
        Err(kind) => CellValue::Error(kind),
    }
}

fn eval<L: ValueLookup + ?Sized>(expr: &FormulaExpr, lookup: &L) -> Result<CellValue, ErrorKind> {
    match expr {
        FormulaExpr::Number(n) => Ok(CellValue::Number(*n)),

        FormulaExpr::CellRef(addr) => match lookup.value(*addr) {
            Some(CellValue::Error(kind)) => Err(kind),
            Some(value) => Ok(value),
            None => Ok(CellValue::blank()),
        },

        // The parser only admits ranges as function arguments
        FormulaExpr::RangeRef(_) => Err(ErrorKind::RangeMismatch),

        FormulaExpr::BinaryOp { op, left, right } => {
            let l = to_number(&eval(left, lookup)?)?;
            let r = to_number(&eval(right, lookup)?)?;
            let result = match op {
                BinaryOperator::Add => l + r,
                BinaryOperator::Subtract => l - r,
                BinaryOperator::Multiply => l * r,
                BinaryOperator::Divide => {
                    if r == 0.0 {
                        return Err(ErrorKind::DivideByZero);
                    }
                    l / r
                }
            };
            Ok(CellValue::Number(result))
        }

        FormulaExpr::UnaryOp { op, operand } => {
            let n = to_number(&eval(operand, lookup)?)?;
            match op {
                UnaryOperator::Negate => Ok(CellValue::Number(-n)),
            }
        }

        FormulaExpr::Function { name, args } => evaluate_function(name, args, lookup),
    }
}

/// Numeric value of an operand
fn to_number(value: &CellValue) -> Result<f64, ErrorKind> {
    match value {
        CellValue::Error(kind) => Err(*kind),
        other => other.as_number().ok_or(ErrorKind::TypeMismatch),
    }
}

/// Evaluate a function call
fn evaluate_function<L: ValueLookup + ?Sized>(
    name: &str,
    args: &[FormulaExpr],
    lookup: &L,
) -> Result<CellValue, ErrorKind> {
    let func = functions::registry()
        .get(name)
        .ok_or(ErrorKind::UnknownFunction)?;

    // Evaluate arguments; range members are handed over as they are,
    // errors included, so the function decides how to treat them
    let mut evaluated = Vec::with_capacity(args.len());
    for arg in args {
        let arg = match arg {
            FormulaExpr::RangeRef(range) => FunctionArg::Range(
                range
                    .cells()
                    .map(|addr| lookup.value(addr).unwrap_or_default())
                    .collect(),
            ),
            expr => FunctionArg::Value(eval(expr, lookup)?),
        };
        evaluated.push(arg);
    }

    (func.implementation)(&evaluated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sheet(cells: &[(&str, CellValue)]) -> HashMap<CellAddress, CellValue> {
        cells
            .iter()
            .map(|(a, v)| (CellAddress::parse(a).unwrap(), v.clone()))
            .collect()
    }

    fn eval_with(formula: &str, values: &HashMap<CellAddress, CellValue>) -> CellValue {
        evaluate(&parse_formula(formula).unwrap(), values)
    }

    fn eval(formula: &str) -> CellValue {
        eval_with(formula, &HashMap::new())
    }

    #[test]
    fn test_evaluate_number() {
        assert_eq!(eval("42"), CellValue::Number(42.0));
        assert_eq!(eval("3.14"), CellValue::Number(3.14));
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("1+2"), CellValue::Number(3.0));
        assert_eq!(eval("5-3"), CellValue::Number(2.0));
        assert_eq!(eval("4*5"), CellValue::Number(20.0));
        assert_eq!(eval("10/4"), CellValue::Number(2.5));
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(eval("1+2*3"), CellValue::Number(7.0));
        assert_eq!(eval("(1+2)*3"), CellValue::Number(9.0));
        assert_eq!(eval("10-4-3"), CellValue::Number(3.0));
        assert_eq!(eval("8/2/2"), CellValue::Number(2.0));
    }

    #[test]
    fn test_evaluate_unary() {
        assert_eq!(eval("-5"), CellValue::Number(-5.0));
        assert_eq!(eval("--5"), CellValue::Number(5.0));
        assert_eq!(eval("2*-3"), CellValue::Number(-6.0));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        assert_eq!(eval("1/0"), CellValue::Error(ErrorKind::DivideByZero));
        assert_eq!(eval("1/(2-2)"), CellValue::Error(ErrorKind::DivideByZero));
    }

    #[test]
    fn test_evaluate_references() {
        let values = sheet(&[
            ("B2", CellValue::Number(2.0)),
            ("B3", CellValue::Number(3.0)),
        ]);
        assert_eq!(eval_with("B2+B3", &values), CellValue::Number(5.0));
        // Blank cells read as zero
        assert_eq!(eval_with("B2+Z9", &values), CellValue::Number(2.0));
        assert_eq!(eval_with("Z9", &values), CellValue::Number(0.0));
    }

    #[test]
    fn test_coercion() {
        let values = sheet(&[
            ("A1", CellValue::Boolean(true)),
            ("A2", CellValue::text("2.5")),
            ("A3", CellValue::text("")),
            ("A4", CellValue::text("hello")),
            (
                "A5",
                CellValue::Date(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()),
            ),
        ]);
        assert_eq!(eval_with("A1+1", &values), CellValue::Number(2.0));
        assert_eq!(eval_with("A2*2", &values), CellValue::Number(5.0));
        assert_eq!(eval_with("A3+1", &values), CellValue::Number(1.0));
        assert_eq!(
            eval_with("A4+1", &values),
            CellValue::Error(ErrorKind::TypeMismatch)
        );
        assert_eq!(eval_with("A5+0", &values), CellValue::Number(2.0));
    }

    #[test]
    fn test_error_propagation() {
        let values = sheet(&[
            ("A1", CellValue::Error(ErrorKind::DivideByZero)),
            ("A2", CellValue::Number(1.0)),
        ]);
        assert_eq!(
            eval_with("A1", &values),
            CellValue::Error(ErrorKind::DivideByZero)
        );
        assert_eq!(
            eval_with("A2+A1*2", &values),
            CellValue::Error(ErrorKind::DivideByZero)
        );
        assert_eq!(
            eval_with("-A1", &values),
            CellValue::Error(ErrorKind::DivideByZero)
        );
    }

    #[test]
    fn test_evaluate_sum() {
        let values = sheet(&[
            ("A1", CellValue::Number(1.0)),
            ("A2", CellValue::Number(2.0)),
            ("A3", CellValue::Number(3.0)),
        ]);
        assert_eq!(eval_with("SUM(A1:A3)", &values), CellValue::Number(6.0));
        // Blank members count as zero
        assert_eq!(eval_with("SUM(A1:A5)", &values), CellValue::Number(6.0));
        assert_eq!(
            eval_with("SUM(A1:A3)*2+1", &values),
            CellValue::Number(13.0)
        );
    }

    #[test]
    fn test_evaluate_average() {
        let values = sheet(&[
            ("B1", CellValue::Number(2.0)),
            ("C1", CellValue::Number(4.0)),
            ("D1", CellValue::Number(6.0)),
        ]);
        assert_eq!(eval_with("AVERAGE(B1:D1)", &values), CellValue::Number(4.0));
        assert_eq!(eval_with("AVERAGE(B1:E1)", &values), CellValue::Number(3.0));
    }

    #[test]
    fn test_aggregates_ignore_member_errors() {
        let values = sheet(&[
            ("A1", CellValue::Number(5.0)),
            ("A2", CellValue::Error(ErrorKind::CircularReference)),
            ("A3", CellValue::text("n/a")),
        ]);
        assert_eq!(eval_with("SUM(A1:A3)", &values), CellValue::Number(5.0));
        assert_eq!(
            eval_with("AVERAGE(A1:A2)", &values),
            CellValue::Number(2.5)
        );
    }

    #[test]
    fn test_lookup_by_reference() {
        let values = sheet(&[("A1", CellValue::Number(7.0))]);
        let ast = parse_formula("A1*2").unwrap();
        let by_ref: &HashMap<CellAddress, CellValue> = &values;
        assert_eq!(evaluate(&ast, &by_ref), CellValue::Number(14.0));

        let ordered: BTreeMap<CellAddress, CellValue> = values.into_iter().collect();
        assert_eq!(evaluate(&ast, &ordered), CellValue::Number(14.0));
    }
}
