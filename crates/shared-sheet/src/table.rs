//! The grid and its latch arrays.
//!
//! A [`Table`] is only ever reached through the gate (see `gate.rs`). Under the fine-grained
//! (read) side of the gate the shape is frozen and cells are reached through `&self`; each cell
//! sits in its own `RwLock` purely for interior mutability, and the row/column latches decide who
//! may touch it. Under the structural (write) side the table is borrowed mutably and may be
//! reshaped.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Axis, Result, SheetError};
use crate::latch::{CellLease, Latch, LatchMode};

type CellSlot = RwLock<String>;

#[derive(Debug)]
pub(crate) struct Table {
    /// Row-major cells; every row has exactly `cols` slots.
    cells: Vec<Vec<CellSlot>>,
    cols: usize,
    row_latches: Vec<Latch>,
    col_latches: Vec<Latch>,
}

impl Table {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: (0..rows).map(|_| empty_row(cols)).collect(),
            cols,
            row_latches: (0..rows).map(|_| Latch::new()).collect(),
            col_latches: (0..cols).map(|_| Latch::new()).collect(),
        }
    }

    pub(crate) fn rows(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    pub(crate) fn check_row(&self, row: usize) -> Result<()> {
        if row < self.rows() {
            Ok(())
        } else {
            Err(SheetError::out_of_range(Axis::Row, row, self.rows()))
        }
    }

    pub(crate) fn check_col(&self, col: usize) -> Result<()> {
        if col < self.cols {
            Ok(())
        } else {
            Err(SheetError::out_of_range(Axis::Column, col, self.cols))
        }
    }

    pub(crate) fn check_cell(&self, row: usize, col: usize) -> Result<()> {
        self.check_row(row)?;
        self.check_col(col)
    }

    pub(crate) fn row_latch(&self, row: usize) -> &Latch {
        &self.row_latches[row]
    }

    pub(crate) fn col_latch(&self, col: usize) -> &Latch {
        &self.col_latches[col]
    }

    /// Row latch first, then column latch. Indices must already be bounds-checked.
    pub(crate) fn lease_cell(&self, row: usize, col: usize, mode: LatchMode) -> CellLease<'_> {
        CellLease::acquire(&self.row_latches[row], &self.col_latches[col], mode)
    }

    /// Caller holds at least shared use of `row` or `col`.
    pub(crate) fn read_cell(&self, row: usize, col: usize) -> String {
        read_slot(&self.cells[row][col]).clone()
    }

    /// Caller holds exclusive use of both `row` and `col`.
    pub(crate) fn update_cell<R>(
        &self,
        row: usize,
        col: usize,
        f: impl FnOnce(&mut String) -> R,
    ) -> R {
        let mut slot = write_slot(&self.cells[row][col]);
        f(&mut *slot)
    }

    /// First column in `row` holding exactly `needle`. Caller holds use of `row`.
    pub(crate) fn find_in_row(&self, row: usize, needle: &str) -> Option<usize> {
        self.cells[row]
            .iter()
            .position(|slot| read_slot(slot).as_str() == needle)
    }

    /// First row in `col` holding exactly `needle`. Caller holds use of `col`.
    pub(crate) fn find_in_col(&self, col: usize, needle: &str) -> Option<usize> {
        self.cells
            .iter()
            .position(|row| read_slot(&row[col]).as_str() == needle)
    }

    /// Copy out one row. Caller holds use of `row`.
    pub(crate) fn copy_row(&self, row: usize) -> Vec<String> {
        self.cells[row].iter().map(|slot| read_slot(slot).clone()).collect()
    }

    pub(crate) fn exchange_rows(&mut self, first: usize, second: usize) {
        if first == second {
            return;
        }
        let (low, high) = (first.min(second), first.max(second));
        let Table {
            cells, row_latches, ..
        } = self;
        let _low = row_latches[low].acquire(LatchMode::Exclusive);
        let _high = row_latches[high].acquire(LatchMode::Exclusive);
        cells.swap(low, high);
    }

    pub(crate) fn exchange_cols(&mut self, first: usize, second: usize) {
        if first == second {
            return;
        }
        let (low, high) = (first.min(second), first.max(second));
        let Table {
            cells, col_latches, ..
        } = self;
        let _low = col_latches[low].acquire(LatchMode::Exclusive);
        let _high = col_latches[high].acquire(LatchMode::Exclusive);
        for row in cells.iter_mut() {
            row.swap(low, high);
        }
    }

    /// Insert an empty row (and its latch) at `after + 1`.
    pub(crate) fn insert_row_after(&mut self, after: usize) {
        let at = after + 1;
        self.cells.insert(at, empty_row(self.cols));
        self.row_latches.insert(at, Latch::new());
    }

    /// Insert an empty column (and its latch) at `after + 1`.
    pub(crate) fn insert_col_after(&mut self, after: usize) {
        let at = after + 1;
        for row in self.cells.iter_mut() {
            row.insert(at, CellSlot::default());
        }
        self.col_latches.insert(at, Latch::new());
        self.cols += 1;
    }

    /// Store a value while the table is exclusively owned (e.g. while being built by a loader).
    pub(crate) fn put(&mut self, row: usize, col: usize, value: String) {
        *self.cells[row][col]
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Visit every non-empty cell in row-major order.
    pub(crate) fn for_each_non_empty(&self, mut f: impl FnMut(usize, usize, &str)) {
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, slot) in cells.iter().enumerate() {
                let value = read_slot(slot);
                if !value.is_empty() {
                    f(row, col, value.as_str());
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn latch_counts(&self) -> (usize, usize) {
        (self.row_latches.len(), self.col_latches.len())
    }
}

fn empty_row(cols: usize) -> Vec<CellSlot> {
    (0..cols).map(|_| CellSlot::default()).collect()
}

// A poisoned slot still holds a valid `String`: whatever the panicking update left behind is
// the cell's value from then on.
fn read_slot(slot: &CellSlot) -> RwLockReadGuard<'_, String> {
    slot.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_slot(slot: &CellSlot) -> RwLockWriteGuard<'_, String> {
    slot.write().unwrap_or_else(PoisonError::into_inner)
}
