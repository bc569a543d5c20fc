//! Cell address and range types

use crate::error::{Error, Result};
use crate::MAX_RANGE_CELLS;
use lazy_regex::regex_captures;
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "AB12")
///
/// Addresses are 0-based internally. The text form renders the column as a
/// bijective base-26 letter sequence (A..Z, AA..AZ, ...) followed by the
/// 1-based row, so `(1, 1)` is `"B2"`. Addresses order row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// Only upper-case column letters are accepted and the row must be at
    /// least 1.
    ///
    /// # Examples
    /// ```
    /// use cellgrid_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("AA10").unwrap();
    /// assert_eq!(addr.row, 9);
    /// assert_eq!(addr.col, 26);
    ///
    /// assert!(CellAddress::parse("A0").is_err());
    /// assert!(CellAddress::parse("a1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (_, letters, digits) = regex_captures!(r"^([A-Z]+)([0-9]+)$", s)
            .ok_or_else(|| Error::InvalidAddress(format!("'{}' is not of the form A1", s)))?;

        let col = Self::letters_to_column(letters)?;

        let row: u64 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        // Rows are 1-based in text, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = u32::try_from(row - 1)
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        Ok(Self { row, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_uppercase() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(c as u64 - 'A' as u64 + 1))
                .ok_or_else(|| Error::InvalidAddress(format!("column too large: {}", letters)))?;
        }

        // Convert to 0-based
        u32::try_from(col - 1)
            .map_err(|_| Error::InvalidAddress(format!("column too large: {}", letters)))
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!(
            "{}{}",
            Self::column_to_letters(self.col),
            self.row as u64 + 1
        )
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A linear range of cells (e.g., "A1:A10" or "B2:F2")
///
/// Ranges are normalized so that `start` is the top/left end. Ranges built
/// through [`CellRange::linear`] or [`CellRange::parse`] always lie on a
/// single row or a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top/left)
    pub start: CellAddress,
    /// End address (bottom/right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a linear range between two addresses, in either order
    ///
    /// Fails unless both ends share a row or a column, and the span holds at
    /// most [`MAX_RANGE_CELLS`] cells.
    pub fn linear(a: CellAddress, b: CellAddress) -> Result<Self> {
        if a.row != b.row && a.col != b.col {
            return Err(Error::InvalidRange(format!(
                "{}:{} spans more than one row and column",
                a, b
            )));
        }

        let range = Self {
            start: a.min(b),
            end: a.max(b),
        };

        if range.cell_count() > MAX_RANGE_CELLS {
            return Err(Error::InvalidRange(format!(
                "{} spans more than {} cells",
                range, MAX_RANGE_CELLS
            )));
        }

        Ok(range)
    }

    /// Parse a range from `A1:A10` notation
    ///
    /// # Examples
    /// ```
    /// use cellgrid_core::{CellAddress, CellRange};
    ///
    /// let range = CellRange::parse("A1:A3").unwrap();
    /// let cells: Vec<_> = range.cells().map(|a| a.to_string()).collect();
    /// assert_eq!(cells, ["A1", "A2", "A3"]);
    ///
    /// // Rectangles are rejected rather than truncated
    /// assert!(CellRange::parse("A1:B2").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidRange(format!("'{}' is not of the form A1:A2", s)))?;

        let start = CellAddress::parse(start)
            .map_err(|e| Error::InvalidRange(format!("bad start of '{}': {}", s, e)))?;
        let end = CellAddress::parse(end)
            .map_err(|e| Error::InvalidRange(format!("bad end of '{}': {}", s, e)))?;

        Self::linear(start, end)
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u64 {
        (self.end.row as u64).abs_diff(self.start.row as u64) + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u64 {
        (self.end.col as u64).abs_diff(self.start.col as u64) + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() * self.col_count()
    }

    /// Iterate over all cell addresses in the range, left-to-right then top-to-bottom
    pub fn cells(&self) -> CellRangeIterator {
        let (first_col, last_col) = (
            self.start.col.min(self.end.col),
            self.start.col.max(self.end.col),
        );
        CellRangeIterator {
            current_row: self.start.row,
            current_col: first_col,
            first_col,
            last_col,
            last_row: self.end.row,
            remaining: self.cell_count(),
        }
    }

    /// Format as A1:A10 string
    pub fn to_a1_string(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over cells in a range
pub struct CellRangeIterator {
    current_row: u32,
    current_col: u32,
    first_col: u32,
    last_col: u32,
    last_row: u32,
    remaining: u64,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let addr = CellAddress::new(self.current_row, self.current_col);
        self.remaining -= 1;

        // Move to next cell; the bounds checks keep u32::MAX edges from overflowing
        if self.current_col < self.last_col {
            self.current_col += 1;
        } else if self.current_row < self.last_row {
            self.current_col = self.first_col;
            self.current_row += 1;
        }

        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellRangeIterator {}
