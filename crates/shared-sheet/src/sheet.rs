use std::path::Path;

use crate::error::Result;
use crate::gate::Gate;
use crate::latch::{LatchGuard, LatchMode};
use crate::persist;
use crate::snapshot::Snapshot;
use crate::table::Table;

/// A spreadsheet of strings shared by any number of threads.
///
/// Operations fall into two classes:
///
/// - **Fine-grained** ([`get_cell`], [`set_cell`], [`update_cell`], the searches, [`snapshot`]):
///   run concurrently with each other. Readers of a row or column share it; a cell write holds
///   its row and its column exclusively, so writes to cells with no row or column in common
///   proceed in parallel.
/// - **Structural** ([`exchange_rows`], [`exchange_cols`], [`add_row`], [`add_col`], [`save`],
///   [`load`]): wait for every fine-grained operation to finish and then run alone.
///
/// Every operation blocks the calling thread until it can proceed; there are no timeouts and no
/// fairness guarantees. Out-of-range indices are reported as
/// [`SheetError::OutOfRange`](crate::SheetError::OutOfRange) before anything is touched.
///
/// [`get_cell`]: SharedSheet::get_cell
/// [`set_cell`]: SharedSheet::set_cell
/// [`update_cell`]: SharedSheet::update_cell
/// [`snapshot`]: SharedSheet::snapshot
/// [`exchange_rows`]: SharedSheet::exchange_rows
/// [`exchange_cols`]: SharedSheet::exchange_cols
/// [`add_row`]: SharedSheet::add_row
/// [`add_col`]: SharedSheet::add_col
/// [`save`]: SharedSheet::save
/// [`load`]: SharedSheet::load
#[derive(Debug)]
pub struct SharedSheet {
    pub(crate) gate: Gate,
}

impl SharedSheet {
    /// A `rows` x `cols` sheet of empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            gate: Gate::new(Table::new(rows, cols)),
        }
    }

    /// `(rows, cols)` at the time of the call.
    pub fn dimensions(&self) -> (usize, usize) {
        let table = self.gate.fine_grained();
        (table.rows(), table.cols())
    }

    pub fn rows(&self) -> usize {
        self.gate.fine_grained().rows()
    }

    pub fn cols(&self) -> usize {
        self.gate.fine_grained().cols()
    }

    /// A copy of the value at `(row, col)`.
    pub fn get_cell(&self, row: usize, col: usize) -> Result<String> {
        let table = self.gate.fine_grained();
        table.check_cell(row, col)?;
        let _lease = table.lease_cell(row, col, LatchMode::Shared);
        Ok(table.read_cell(row, col))
    }

    pub fn set_cell(&self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update_cell(row, col, |cell| *cell = value)
    }

    /// Read-modify-write one cell while holding its row and column exclusively.
    ///
    /// `f` must not call back into this sheet: it runs with the cell's latches held.
    pub fn update_cell<R>(
        &self,
        row: usize,
        col: usize,
        f: impl FnOnce(&mut String) -> R,
    ) -> Result<R> {
        let table = self.gate.fine_grained();
        table.check_cell(row, col)?;
        let _lease = table.lease_cell(row, col, LatchMode::Exclusive);
        Ok(table.update_cell(row, col, f))
    }

    /// Copy the whole grid.
    ///
    /// Holds every row latch (ascending) while copying, so no cell write lands mid-copy, while
    /// other readers keep running.
    pub fn snapshot(&self) -> Snapshot {
        let table = self.gate.fine_grained();
        let _rows: Vec<LatchGuard<'_>> = (0..table.rows())
            .map(|row| table.row_latch(row).acquire(LatchMode::Shared))
            .collect();
        let cells = (0..table.rows()).map(|row| table.copy_row(row)).collect();
        Snapshot::new(table.cols(), cells)
    }

    /// Swap the full contents of two rows. Exchanging a row with itself succeeds and does nothing.
    pub fn exchange_rows(&self, first: usize, second: usize) -> Result<()> {
        let mut table = self.gate.structural();
        table.check_row(first)?;
        table.check_row(second)?;
        table.exchange_rows(first, second);
        log::debug!("exchanged rows {first} and {second}");
        Ok(())
    }

    /// Swap the full contents of two columns. Exchanging a column with itself succeeds and does
    /// nothing.
    pub fn exchange_cols(&self, first: usize, second: usize) -> Result<()> {
        let mut table = self.gate.structural();
        table.check_col(first)?;
        table.check_col(second)?;
        table.exchange_cols(first, second);
        log::debug!("exchanged columns {first} and {second}");
        Ok(())
    }

    /// Insert an empty row directly below `after`; rows past it move down by one.
    pub fn add_row(&self, after: usize) -> Result<()> {
        let mut table = self.gate.structural();
        table.check_row(after)?;
        table.insert_row_after(after);
        log::debug!("inserted row after {after}; sheet is now {}x{}", table.rows(), table.cols());
        Ok(())
    }

    /// Insert an empty column directly right of `after`; columns past it move right by one.
    pub fn add_col(&self, after: usize) -> Result<()> {
        let mut table = self.gate.structural();
        table.check_col(after)?;
        table.insert_col_after(after);
        log::debug!(
            "inserted column after {after}; sheet is now {}x{}",
            table.rows(),
            table.cols()
        );
        Ok(())
    }

    /// Write the sheet to `path` (see the `persist` format). The file is replaced atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let table = self.gate.structural();
        persist::save_table(path, &table)?;
        log::info!(
            "saved {}x{} sheet to {}",
            table.rows(),
            table.cols(),
            path.display()
        );
        Ok(())
    }

    /// Replace the whole sheet, shape included, with the contents of `path`.
    ///
    /// Fails with [`SheetError::NotFound`](crate::SheetError::NotFound) if `path` does not exist.
    /// The file is parsed completely before the sheet is touched, so any failure leaves the
    /// current contents in place.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let loaded = persist::load_table(path).inspect_err(|err| {
            log::warn!("not loading sheet from {}: {err}", path.display());
        })?;

        let mut table = self.gate.structural();
        *table = loaded;
        log::info!(
            "loaded {}x{} sheet from {}",
            table.rows(),
            table.cols(),
            path.display()
        );
        Ok(())
    }
}
