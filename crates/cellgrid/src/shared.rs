//! Thread-safe workbook handle

use crate::workbook::{CellSnapshot, Workbook, WriteOutcome};
use cellgrid_core::{CellAddress, DisplaySettings, Result};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A [`Workbook`] shared between threads
///
/// Writes are serialized: each one holds the write lock from classification
/// through recalculation, so readers never observe a half-applied edit.
/// Reads return owned snapshots and never hold the lock past the call.
#[derive(Debug, Clone, Default)]
pub struct SharedWorkbook {
    inner: Arc<RwLock<Workbook>>,
}

impl SharedWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: DisplaySettings) -> Self {
        Workbook::with_settings(settings).into()
    }

    /// See [`Workbook::write`]
    pub fn write(&self, address: &str, raw: &str) -> Result<WriteOutcome> {
        self.write_lock().write(address, raw)
    }

    /// See [`Workbook::get`]
    pub fn get(&self, address: &str) -> Result<CellSnapshot> {
        self.read_lock().get(address)
    }

    /// Every stored cell, in row-major address order
    pub fn snapshot(&self) -> Vec<(CellAddress, CellSnapshot)> {
        let workbook = self.read_lock();
        workbook
            .cells()
            .map(|(address, _)| (address, workbook.snapshot(address)))
            .collect()
    }

    /// Run `f` with shared access to the workbook
    pub fn read<R>(&self, f: impl FnOnce(&Workbook) -> R) -> R {
        f(&self.read_lock())
    }

    // Lock poisoning is ignored
    fn read_lock(&self) -> RwLockReadGuard<'_, Workbook> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Workbook> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Workbook> for SharedWorkbook {
    fn from(workbook: Workbook) -> Self {
        Self {
            inner: Arc::new(RwLock::new(workbook)),
        }
    }
}
