//! Aggregate functions: SUM, AVERAGE
//!
//! Aggregates are lenient: a range member that is an error or does not
//! coerce to a number contributes 0 instead of failing the whole call.

use super::FunctionArg;
use cellgrid_core::{CellValue, ErrorKind};

/// SUM function
pub fn fn_sum(args: &[FunctionArg]) -> Result<CellValue, ErrorKind> {
    let (sum, _) = sum_and_count(args);
    Ok(CellValue::Number(sum))
}

/// AVERAGE function
///
/// Every member counts toward the divisor, including ones treated as 0.
pub fn fn_average(args: &[FunctionArg]) -> Result<CellValue, ErrorKind> {
    let (sum, count) = sum_and_count(args);
    if count == 0 {
        Err(ErrorKind::DivideByZero)
    } else {
        Ok(CellValue::Number(sum / count as f64))
    }
}

fn sum_and_count(args: &[FunctionArg]) -> (f64, usize) {
    let mut sum = 0.0;
    let mut count = 0;

    for arg in args {
        let values = match arg {
            FunctionArg::Range(values) => values.as_slice(),
            FunctionArg::Value(value) => std::slice::from_ref(value),
        };
        for value in values {
            sum += value.as_number().unwrap_or(0.0);
            count += 1;
        }
    }

    (sum, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(values: Vec<CellValue>) -> Vec<FunctionArg> {
        vec![FunctionArg::Range(values)]
    }

    #[test]
    fn test_sum() {
        let args = range(vec![1.0.into(), 2.0.into(), 3.0.into()]);
        assert_eq!(fn_sum(&args), Ok(CellValue::Number(6.0)));
    }

    #[test]
    fn test_sum_is_lenient() {
        let args = range(vec![
            5.0.into(),
            CellValue::Error(ErrorKind::DivideByZero),
            CellValue::text("abc"),
            CellValue::blank(),
            true.into(),
        ]);
        assert_eq!(fn_sum(&args), Ok(CellValue::Number(6.0)));
    }

    #[test]
    fn test_average() {
        let args = range(vec![1.0.into(), 2.0.into(), 3.0.into()]);
        assert_eq!(fn_average(&args), Ok(CellValue::Number(2.0)));

        let args = range(vec![4.0.into(), CellValue::text("x")]);
        assert_eq!(fn_average(&args), Ok(CellValue::Number(2.0)));
    }

    #[test]
    fn test_average_of_nothing() {
        assert_eq!(fn_average(&range(vec![])), Err(ErrorKind::DivideByZero));
    }
}
