//! Dependency tracking for formula calculation

use cellgrid_core::CellAddress;
use std::collections::{BTreeMap, BTreeSet};

/// Dependency graph for formula cells
///
/// An edge `A → B` means the formula in `A` reads `B`. Both directions are
/// indexed so that a cell's precedents (what it reads) and dependents (who
/// reads it) are available without a scan. Adjacency is kept in ordered sets
/// so traversal order, and therefore recalculation order, is deterministic.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cell → Cells that depend on it (dependents)
    dependents: BTreeMap<CellAddress, BTreeSet<CellAddress>>,
    /// Cell → Cells it depends on (precedents)
    precedents: BTreeMap<CellAddress, BTreeSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the outgoing edges of `cell` with `references`
    pub fn set_dependencies<I>(&mut self, cell: CellAddress, references: I)
    where
        I: IntoIterator<Item = CellAddress>,
    {
        self.clear_dependencies(cell);

        let precedents: BTreeSet<CellAddress> = references.into_iter().collect();
        if precedents.is_empty() {
            return;
        }
        for &precedent in &precedents {
            self.dependents.entry(precedent).or_default().insert(cell);
        }
        self.precedents.insert(cell, precedents);
    }

    /// Remove the outgoing edges of `cell`
    ///
    /// Cells whose formulas read `cell` keep their edges to it.
    pub fn clear_dependencies(&mut self, cell: CellAddress) {
        if let Some(precedents) = self.precedents.remove(&cell) {
            for precedent in precedents {
                if let Some(deps) = self.dependents.get_mut(&precedent) {
                    deps.remove(&cell);
                    if deps.is_empty() {
                        self.dependents.remove(&precedent);
                    }
                }
            }
        }
    }

    /// Get cells that depend on the given cell
    pub fn dependents(&self, cell: CellAddress) -> impl DoubleEndedIterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell depends on
    pub fn precedents(&self, cell: CellAddress) -> impl DoubleEndedIterator<Item = CellAddress> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// True if `cell` can reach itself by following the cells it reads
    pub fn detect_cycle(&self, cell: CellAddress) -> bool {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<CellAddress> = self.precedents(cell).collect();

        while let Some(current) = stack.pop() {
            if current == cell {
                return true;
            }
            if visited.insert(current) {
                stack.extend(self.precedents(current));
            }
        }

        false
    }

    /// Every cell that transitively reads `changed`, in an order where each
    /// cell comes after all the cells it reads
    ///
    /// `changed` itself is not included.
    pub fn recalculation_order(&self, changed: CellAddress) -> Vec<CellAddress> {
        let mut post_order = Vec::new();
        let mut visited = BTreeSet::new();
        // (cell, children already pushed)
        let mut stack = vec![(changed, false)];

        while let Some((cell, expanded)) = stack.pop() {
            if expanded {
                post_order.push(cell);
                continue;
            }
            if !visited.insert(cell) {
                // Already finished, or a cycle back onto the current path
                continue;
            }
            stack.push((cell, true));
            for dependent in self.dependents(cell).rev() {
                if !visited.contains(&dependent) {
                    stack.push((dependent, false));
                }
            }
        }

        post_order.reverse();
        post_order.retain(|&cell| cell != changed);
        post_order
    }

    /// True if no cell has any edge
    pub fn is_empty(&self) -> bool {
        self.precedents.is_empty()
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.precedents.clear();
    }
}
