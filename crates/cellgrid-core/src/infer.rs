//! Type inference for raw cell input
//!
//! Classifies what a user typed, re-validates it after an edit, and renders
//! it for display. Classification follows a fixed priority because an input
//! can satisfy several predicates ("1" is both a boolean alias and a number):
//!
//! 1. Formula - starts with `=`
//! 2. Boolean - exactly one of `true`, `false`, `1`, `0`, `yes`, `no` (any case)
//! 3. Number - a plain decimal literal
//! 4. Date - contains `/`, `-` or `.` and parses as a calendar date
//! 5. Text - everything else
//!
//! The boolean, number and date predicates ignore surrounding whitespace, so
//! `" 7 "` is a Number. The raw text keeps it, but the display text is
//! rendered from the typed value and drops it (`" 7 "` displays as `7`).

use crate::cell::{CellKind, CellValue, ErrorKind};
use crate::error::{Error, Result};
use crate::settings::{DisplaySettings, DEFAULT_DATE_FORMAT};
use chrono::NaiveDate;
use lazy_regex::regex_is_match;
use std::fmt::Write;

const TRUE_TOKENS: [&str; 3] = ["true", "1", "yes"];
const FALSE_TOKENS: [&str; 3] = ["false", "0", "no"];

/// Accepted calendar layouts, tried in order
const DATE_LAYOUTS: [&str; 6] = [
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y", "%m-%d-%Y", "%d.%m.%Y",
];

/// Classify raw input
///
/// Surrounding whitespace does not affect boolean, number or date
/// classification.
///
/// # Examples
/// ```
/// use cellgrid_core::{infer::infer_kind, CellKind};
///
/// assert_eq!(infer_kind("=1+1"), CellKind::Formula);
/// assert_eq!(infer_kind("TRUE"), CellKind::Boolean);
/// assert_eq!(infer_kind("10"), CellKind::Number);
/// assert_eq!(infer_kind("10/10/2020"), CellKind::Date);
/// assert_eq!(infer_kind("hello"), CellKind::Text);
/// ```
pub fn infer_kind(raw: &str) -> CellKind {
    if raw.starts_with('=') {
        CellKind::Formula
    } else if parse_boolean(raw).is_some() {
        CellKind::Boolean
    } else if parse_number(raw).is_some() {
        CellKind::Number
    } else if parse_date(raw).is_some() {
        CellKind::Date
    } else {
        CellKind::Text
    }
}

/// Check that `raw` still satisfies the predicate of `kind`
pub fn validate(raw: &str, kind: CellKind) -> Result<()> {
    let valid = match kind {
        CellKind::Formula => raw.starts_with('='),
        CellKind::Boolean => parse_boolean(raw).is_some(),
        CellKind::Number => parse_number(raw).is_some(),
        CellKind::Date => parse_date(raw).is_some(),
        CellKind::Text => true,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            expected: kind,
            input: raw.to_string(),
        })
    }
}

/// Convert non-formula input to its typed value
///
/// Input that does not satisfy `kind` yields `Error(TypeMismatch)`. Formula
/// input has no value until evaluated and is kept as text here.
pub fn typed_value(raw: &str, kind: CellKind) -> CellValue {
    let value = match kind {
        CellKind::Boolean => parse_boolean(raw).map(CellValue::Boolean),
        CellKind::Number => parse_number(raw).map(CellValue::Number),
        CellKind::Date => parse_date(raw).map(CellValue::Date),
        CellKind::Text | CellKind::Formula => Some(CellValue::text(raw)),
    };
    value.unwrap_or(CellValue::Error(ErrorKind::TypeMismatch))
}

/// Render raw input of the given kind for display
///
/// Numbers get grouping separators, booleans normalize to `TRUE`/`FALSE`,
/// dates render as a short date. Text and formula source pass through, as
/// does input that no longer satisfies its kind.
pub fn format(raw: &str, kind: CellKind, settings: &DisplaySettings) -> String {
    match kind {
        CellKind::Text | CellKind::Formula => raw.to_string(),
        _ => match typed_value(raw, kind) {
            CellValue::Error(_) => raw.to_string(),
            value => format_value(&value, settings),
        },
    }
}

/// Render a typed value for display
pub fn format_value(value: &CellValue, settings: &DisplaySettings) -> String {
    match value {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => format_number(*n, settings),
        CellValue::Boolean(true) => "TRUE".to_string(),
        CellValue::Boolean(false) => "FALSE".to_string(),
        CellValue::Date(d) => format_date(*d, settings),
        CellValue::Error(e) => e.display_text(settings.error_detail),
    }
}

/// Parse a boolean alias, ignoring case and surrounding whitespace
pub fn parse_boolean(raw: &str) -> Option<bool> {
    let token = raw.trim().to_ascii_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Parse a plain decimal literal: optional sign, digits, at most one point
///
/// Exponents, grouping separators and trailing characters are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if !regex_is_match!(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)$", text) {
        return None;
    }
    text.parse().ok()
}

/// Parse a calendar date that contains a `/`, `-` or `.` separator
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if !text.contains(['/', '-', '.']) {
        return None;
    }
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
}

/// Format a number with grouping and at most `max_fraction_digits` decimals
pub fn format_number(n: f64, settings: &DisplaySettings) -> String {
    if !n.is_finite() {
        return n.to_string();
    }

    let digits = settings.max_fraction_digits;
    let text = format!("{:.*}", digits, n.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
    // Avoid "-0" when the value rounds to zero
    if n < 0.0 && (int_part.bytes().any(|b| b != b'0') || !frac_part.is_empty()) {
        out.push('-');
    }

    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            if let Some(sep) = settings.thousands_separator {
                out.push(sep);
            }
        }
        out.push(ch);
    }

    if !frac_part.is_empty() {
        out.push(settings.decimal_separator);
        out.push_str(frac_part);
    }

    out
}

/// Format a date with the configured layout
///
/// A layout chrono cannot render falls back to [`DEFAULT_DATE_FORMAT`].
pub fn format_date(date: NaiveDate, settings: &DisplaySettings) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(&settings.date_format)).is_err() {
        return date.format(DEFAULT_DATE_FORMAT).to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_infer_priority() {
        assert_eq!(infer_kind("=1+1"), CellKind::Formula);
        assert_eq!(infer_kind("=TRUE"), CellKind::Formula);
        assert_eq!(infer_kind("TRUE"), CellKind::Boolean);
        assert_eq!(infer_kind("yes"), CellKind::Boolean);
        assert_eq!(infer_kind("No"), CellKind::Boolean);
        assert_eq!(infer_kind("1"), CellKind::Boolean);
        assert_eq!(infer_kind("0"), CellKind::Boolean);
        assert_eq!(infer_kind("10"), CellKind::Number);
        assert_eq!(infer_kind("-3.5"), CellKind::Number);
        assert_eq!(infer_kind("1.5"), CellKind::Number);
        assert_eq!(infer_kind("10/10/2020"), CellKind::Date);
        assert_eq!(infer_kind("2020-10-10"), CellKind::Date);
        assert_eq!(infer_kind("10.10.2020"), CellKind::Date);
        assert_eq!(infer_kind("hello"), CellKind::Text);
        assert_eq!(infer_kind(""), CellKind::Text);
    }

    #[test]
    fn test_boolean_requires_exact_token() {
        assert_eq!(infer_kind("10"), CellKind::Number);
        assert_eq!(infer_kind("yesterday"), CellKind::Text);
        assert_eq!(infer_kind("truely"), CellKind::Text);
    }

    #[test]
    fn test_number_literal_shape() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("+42."), Some(42.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number(" 7 "), Some(7.0));
        assert_eq!(parse_number("1e5"), None);
        assert_eq!(parse_number("1,000"), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_date_requires_separator() {
        assert!(parse_date("20201010").is_none());
        assert!(parse_date("13/45/2020").is_none());
        assert_eq!(
            parse_date("10/9/2020"),
            NaiveDate::from_ymd_opt(2020, 10, 9)
        );
        assert_eq!(
            parse_date("9.10.2020"),
            NaiveDate::from_ymd_opt(2020, 10, 9)
        );
    }

    #[test]
    fn test_validate() {
        assert!(validate("12", CellKind::Number).is_ok());
        assert!(validate("anything", CellKind::Text).is_ok());

        let err = validate("twelve", CellKind::Number).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::TypeMismatch);
        assert!(validate("maybe", CellKind::Boolean).is_err());
        assert!(validate("1+1", CellKind::Formula).is_err());
        assert!(validate("2020/02/30", CellKind::Date).is_err());
    }

    #[test]
    fn test_typed_value() {
        assert_eq!(typed_value("Yes", CellKind::Boolean), CellValue::Boolean(true));
        assert_eq!(typed_value("0", CellKind::Boolean), CellValue::Boolean(false));
        assert_eq!(typed_value("2.5", CellKind::Number), CellValue::Number(2.5));
        assert_eq!(typed_value("hi", CellKind::Text), CellValue::text("hi"));
        assert_eq!(
            typed_value("hi", CellKind::Number),
            CellValue::Error(crate::ErrorKind::TypeMismatch)
        );
    }

    #[test]
    fn test_format() {
        let settings = DisplaySettings::default();
        assert_eq!(format("1234567", CellKind::Number, &settings), "1,234,567");
        assert_eq!(format("-1234.5", CellKind::Number, &settings), "-1,234.5");
        assert_eq!(format("0.12345", CellKind::Number, &settings), "0.123");
        assert_eq!(format("yes", CellKind::Boolean, &settings), "TRUE");
        assert_eq!(format("0", CellKind::Boolean, &settings), "FALSE");
        assert_eq!(format("2020-01-05", CellKind::Date, &settings), "1/5/2020");
        assert_eq!(format("=A1+1", CellKind::Formula, &settings), "=A1+1");
        assert_eq!(format("hello", CellKind::Text, &settings), "hello");
    }

    #[test]
    fn test_surrounding_whitespace() {
        let settings = DisplaySettings::default();
        assert_eq!(infer_kind(" 7 "), CellKind::Number);
        assert_eq!(infer_kind(" yes"), CellKind::Boolean);
        assert_eq!(infer_kind("2020-01-05 "), CellKind::Date);
        assert_eq!(format(" 7 ", CellKind::Number, &settings), "7");
        // Whitespace inside the literal is still rejected
        assert_eq!(infer_kind("1 000"), CellKind::Text);
        assert_eq!(format(" hi ", CellKind::Text, &settings), " hi ");
    }

    #[test]
    fn test_format_number_settings() {
        let mut settings = DisplaySettings::default();
        assert_eq!(format_number(999.0, &settings), "999");
        assert_eq!(format_number(1000.0, &settings), "1,000");
        assert_eq!(format_number(-0.0001, &settings), "0");
        assert_eq!(format_number(1.9999, &settings), "2");

        settings.thousands_separator = Some('.');
        settings.decimal_separator = ',';
        assert_eq!(format_number(1234.25, &settings), "1.234,25");

        settings.thousands_separator = None;
        assert_eq!(format_number(1234.25, &settings), "1234,25");
    }

    #[test]
    fn test_format_date_bad_layout_falls_back() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
        let mut settings = DisplaySettings {
            date_format: "%Y-%m-%d".into(),
            ..DisplaySettings::default()
        };
        assert_eq!(format_date(date, &settings), "2020-01-05");

        settings.date_format = "%Q".into();
        assert_eq!(format_date(date, &settings), "1/5/2020");
        assert_eq!(format("2020-01-05", CellKind::Date, &settings), "1/5/2020");
    }

    #[test]
    fn test_format_value_errors() {
        let mut settings = DisplaySettings::default();
        let value = CellValue::Error(crate::ErrorKind::DivideByZero);
        assert_eq!(format_value(&value, &settings), "#ERROR! (DIV/0)");
        settings.error_detail = false;
        assert_eq!(format_value(&value, &settings), "#ERROR!");
    }
}
