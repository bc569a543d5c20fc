//! Workbook: cell storage, edits and recalculation
//!
//! A [`Workbook`] owns every cell and the dependency graph between them. All
//! edits go through [`Workbook::write`], which classifies the raw text,
//! parses formulas, rejects circular references and recalculates every cell
//! that transitively reads the edited one before returning.
//!
//! A formula rejected as circular is held aside. Once a later write breaks
//! the cycle, it is installed and evaluated like a fresh write.
//!
//! # Example
//!
//! ```rust
//! use cellgrid::{CellAddress, CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! workbook.write("A1", "1").unwrap();
//! workbook.write("A2", "=A1*2").unwrap();
//! workbook.write("A3", "=A2+1").unwrap();
//!
//! let outcome = workbook.write("A1", "5").unwrap();
//! assert_eq!(outcome.changed.len(), 3);
//! assert_eq!(workbook.get("A3").unwrap().value, CellValue::Number(11.0));
//! ```

use ahash::AHashMap;
use cellgrid_core::{infer, CellAddress, CellKind, CellValue, DisplaySettings, ErrorKind, Result};
use cellgrid_formula::{evaluate, parse_formula, DependencyGraph, FormulaExpr, ValueLookup};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace, warn};

/// A stored cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    raw: String,
    kind: CellKind,
    formula: Option<FormulaExpr>,
    value: CellValue,
    display_text: String,
}

impl Cell {
    /// The text exactly as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Parsed formula, if the cell holds a formula that parsed and was accepted
    pub fn formula(&self) -> Option<&FormulaExpr> {
        self.formula.as_ref()
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.value.error()
    }

    fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            kind: self.kind,
            value: self.value.clone(),
            display_text: self.display_text.clone(),
        }
    }
}

/// Read view of a cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSnapshot {
    pub kind: CellKind,
    pub value: CellValue,
    pub display_text: String,
}

impl CellSnapshot {
    /// Snapshot of a cell that was never written (or was cleared)
    pub fn blank() -> Self {
        Self {
            kind: CellKind::Text,
            value: CellValue::blank(),
            display_text: String::new(),
        }
    }
}

impl Default for CellSnapshot {
    fn default() -> Self {
        Self::blank()
    }
}

/// Result of a write
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriteOutcome {
    /// Every cell whose value or display text changed, the written cell included
    pub changed: BTreeSet<CellAddress>,
    /// The written cell's new value
    pub value: CellValue,
    /// The written cell's error, if its value is one
    pub error: Option<ErrorKind>,
}

/// Sparse cell storage; only non-blank cells are stored
#[derive(Debug, Clone, Default)]
struct CellStore {
    cells: AHashMap<CellAddress, Cell>,
}

impl ValueLookup for CellStore {
    fn value(&self, address: CellAddress) -> Option<CellValue> {
        self.cells.get(&address).map(|cell| cell.value.clone())
    }
}

/// A single-sheet workbook
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    cells: CellStore,
    graph: DependencyGraph,
    /// Formulas rejected as circular, retried after every write
    held: BTreeMap<CellAddress, FormulaExpr>,
    settings: DisplaySettings,
}

impl Workbook {
    /// Create an empty workbook with default display settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty workbook with the given display settings
    pub fn with_settings(settings: DisplaySettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Number of non-blank cells
    pub fn len(&self) -> usize {
        self.cells.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.cells.is_empty()
    }

    /// Write raw text to the cell at `address` (A1 notation)
    ///
    /// Fails only if `address` is not a valid address. Problems with the
    /// content itself (bad formulas, circular references, division by zero)
    /// are stored as error values and reported through [`WriteOutcome::error`].
    pub fn write(&mut self, address: &str, raw: &str) -> Result<WriteOutcome> {
        let address = CellAddress::parse(address)?;
        Ok(self.write_at(address, raw))
    }

    /// Write raw text to an already decoded address
    pub fn write_at(&mut self, address: CellAddress, raw: &str) -> WriteOutcome {
        let kind = infer::infer_kind(raw);
        debug!(address = %address, kind = %kind, "writing cell");

        let before = self.cells.cells.get(&address).map(Cell::snapshot);
        self.held.remove(&address);

        let (formula, value) = match kind {
            CellKind::Formula => self.install_formula(address, &raw[1..]),
            _ => {
                self.graph.clear_dependencies(address);
                (None, infer::typed_value(raw, kind))
            }
        };
        let display_text = infer::format_value(&value, &self.settings);

        let mut changed = BTreeSet::new();
        let after = CellSnapshot {
            kind,
            value: value.clone(),
            display_text: display_text.clone(),
        };
        if Self::differs(before.as_ref(), &after) {
            changed.insert(address);
        }

        if raw.is_empty() {
            self.cells.cells.remove(&address);
        } else {
            self.cells.cells.insert(
                address,
                Cell {
                    raw: raw.to_string(),
                    kind,
                    formula,
                    value: value.clone(),
                    display_text,
                },
            );
        }

        self.recalculate_dependents(address, &mut changed);
        self.retry_held(&mut changed);
        trace!(address = %address, changed = changed.len(), "write complete");

        WriteOutcome {
            changed,
            error: value.error(),
            value,
        }
    }

    /// Clear the cell at `address`; same as writing empty text
    pub fn clear(&mut self, address: &str) -> Result<WriteOutcome> {
        self.write(address, "")
    }

    /// Read the cell at `address` (A1 notation); blank if never written
    pub fn get(&self, address: &str) -> Result<CellSnapshot> {
        let address = CellAddress::parse(address)?;
        Ok(self.snapshot(address))
    }

    /// Read the cell at an already decoded address
    pub fn snapshot(&self, address: CellAddress) -> CellSnapshot {
        self.cells
            .cells
            .get(&address)
            .map(Cell::snapshot)
            .unwrap_or_default()
    }

    /// The stored cell at `address`, if any
    pub fn cell(&self, address: &CellAddress) -> Option<&Cell> {
        self.cells.cells.get(address)
    }

    /// All stored cells in row-major address order
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &Cell)> + '_ {
        let mut cells: Vec<_> = self.cells.cells.iter().map(|(a, c)| (*a, c)).collect();
        cells.sort_by_key(|(address, _)| *address);
        cells.into_iter()
    }

    /// Parse a formula body, register its edges and evaluate it
    fn install_formula(
        &mut self,
        address: CellAddress,
        body: &str,
    ) -> (Option<FormulaExpr>, CellValue) {
        let expr = match parse_formula(body) {
            Ok(expr) => expr,
            Err(e) => {
                debug!(
                    address = %address,
                    kind = %e.kind().code(),
                    position = e.position(),
                    "formula rejected: {}",
                    e
                );
                self.graph.clear_dependencies(address);
                return (None, CellValue::Error(e.kind()));
            }
        };

        self.graph.set_dependencies(address, expr.references());
        if self.graph.detect_cycle(address) {
            warn!(address = %address, "circular reference rejected");
            self.graph.clear_dependencies(address);
            self.held.insert(address, expr);
            return (None, CellValue::Error(ErrorKind::CircularReference));
        }

        let value = evaluate(&expr, &self.cells);
        (Some(expr), value)
    }

    /// Re-evaluate every formula that transitively reads `address`
    fn recalculate_dependents(&mut self, address: CellAddress, changed: &mut BTreeSet<CellAddress>) {
        for dependent in self.graph.recalculation_order(address) {
            let value = match self.cells.cells.get(&dependent).and_then(Cell::formula) {
                Some(expr) => evaluate(expr, &self.cells),
                None => continue,
            };
            let display_text = infer::format_value(&value, &self.settings);

            if let Some(cell) = self.cells.cells.get_mut(&dependent) {
                if cell.value != value || cell.display_text != display_text {
                    changed.insert(dependent);
                }
                trace!(address = %dependent, value = %value, "recalculated");
                cell.value = value;
                cell.display_text = display_text;
            }
        }
    }

    /// Install held formulas whose cycle no longer exists
    ///
    /// Installing a formula only adds edges, so one pass in address order
    /// settles every held cell.
    fn retry_held(&mut self, changed: &mut BTreeSet<CellAddress>) {
        let candidates: Vec<CellAddress> = self.held.keys().copied().collect();

        for address in candidates {
            let references = match self.held.get(&address) {
                Some(expr) => expr.references(),
                None => continue,
            };
            self.graph.set_dependencies(address, references);
            if self.graph.detect_cycle(address) {
                self.graph.clear_dependencies(address);
                continue;
            }

            let expr = match self.held.remove(&address) {
                Some(expr) => expr,
                None => continue,
            };
            debug!(address = %address, "circular reference resolved");

            let value = evaluate(&expr, &self.cells);
            let display_text = infer::format_value(&value, &self.settings);
            if let Some(cell) = self.cells.cells.get_mut(&address) {
                if cell.value != value || cell.display_text != display_text {
                    changed.insert(address);
                }
                cell.formula = Some(expr);
                cell.value = value;
                cell.display_text = display_text;
            }

            self.recalculate_dependents(address, changed);
        }
    }

    fn differs(before: Option<&CellSnapshot>, after: &CellSnapshot) -> bool {
        match before {
            Some(before) => {
                before.value != after.value || before.display_text != after.display_text
            }
            None => !after.value.is_blank() || !after.display_text.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn a(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_write_classifies() {
        let mut wb = Workbook::new();
        wb.write("A1", "hello").unwrap();
        wb.write("A2", "1234.5").unwrap();
        wb.write("A3", "yes").unwrap();
        wb.write("A4", "2020-01-05").unwrap();

        assert_eq!(wb.get("A1").unwrap().kind, CellKind::Text);
        assert_eq!(wb.get("A2").unwrap().display_text, "1,234.5");
        assert_eq!(wb.get("A3").unwrap().value, CellValue::Boolean(true));
        assert_eq!(wb.get("A4").unwrap().display_text, "1/5/2020");
        assert_eq!(wb.len(), 4);
    }

    #[test]
    fn test_invalid_address_is_err() {
        let mut wb = Workbook::new();
        assert!(wb.write("1A", "x").is_err());
        assert!(wb.write("A0", "x").is_err());
        assert!(wb.get("").is_err());
        assert!(wb.is_empty());
    }

    #[test]
    fn test_unwritten_cell_is_blank() {
        let wb = Workbook::new();
        assert_eq!(wb.get("Z99").unwrap(), CellSnapshot::blank());
        assert!(wb.cell(&a("Z99")).is_none());
    }

    #[test]
    fn test_formula_cell_keeps_raw_and_tree() {
        let mut wb = Workbook::new();
        wb.write("A1", "=1+2").unwrap();
        let cell = wb.cell(&a("A1")).unwrap();
        assert_eq!(cell.raw(), "=1+2");
        assert_eq!(cell.kind(), CellKind::Formula);
        assert!(cell.formula().is_some());
        assert_eq!(cell.value(), &CellValue::Number(3.0));
        assert_eq!(cell.display_text(), "3");
    }

    #[test]
    fn test_clear_removes_cell_and_edges() {
        let mut wb = Workbook::new();
        wb.write("A1", "4").unwrap();
        wb.write("A2", "=A1*2").unwrap();

        let outcome = wb.clear("A2").unwrap();
        assert_eq!(outcome.changed, BTreeSet::from([a("A2")]));
        assert!(wb.cell(&a("A2")).is_none());
        assert!(wb.dependency_graph().is_empty());
    }

    #[test]
    fn test_cells_in_address_order() {
        let mut wb = Workbook::new();
        wb.write("B2", "x").unwrap();
        wb.write("A1", "y").unwrap();
        wb.write("C1", "z").unwrap();
        let order: Vec<_> = wb.cells().map(|(address, _)| address).collect();
        assert_eq!(order, vec![a("A1"), a("C1"), a("B2")]);
    }

    #[test]
    fn test_held_formula_dropped_on_rewrite() {
        let mut wb = Workbook::new();
        wb.write("A1", "=B1").unwrap();
        wb.write("B1", "=A1").unwrap();
        assert!(wb.held.contains_key(&a("B1")));

        wb.clear("B1").unwrap();
        assert!(wb.held.is_empty());
        assert_eq!(wb.get("A1").unwrap().value, CellValue::Number(0.0));
    }

    #[test]
    fn test_unusable_date_format_does_not_panic() {
        let settings = DisplaySettings {
            date_format: "%Q".into(),
            ..DisplaySettings::default()
        };
        let mut wb = Workbook::with_settings(settings);
        wb.write("A1", "2020-01-05").unwrap();
        assert_eq!(wb.get("A1").unwrap().display_text, "1/5/2020");
    }

    #[test]
    fn test_settings_drive_display() {
        let settings = DisplaySettings {
            thousands_separator: None,
            error_detail: false,
            ..DisplaySettings::default()
        };
        let mut wb = Workbook::with_settings(settings);
        wb.write("A1", "1234567").unwrap();
        wb.write("A2", "=1/0").unwrap();
        assert_eq!(wb.get("A1").unwrap().display_text, "1234567");
        assert_eq!(wb.get("A2").unwrap().display_text, "#ERROR!");
    }
}
