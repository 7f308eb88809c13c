//! Exact-match searches.
//!
//! Searches are fine-grained: a row scan holds only that row (shared), a column scan only that
//! column. Multi-row searches rescan row by row, entering the gate afresh for each row, so the
//! sheet may change between rows and the result is not a point-in-time answer.

use crate::address::{CellRange, CellRef};
use crate::error::Result;
use crate::latch::LatchMode;
use crate::sheet::SharedSheet;

impl SharedSheet {
    /// Leftmost column of `row` whose value equals `needle`.
    pub fn search_in_row(&self, row: usize, needle: &str) -> Result<Option<usize>> {
        let table = self.gate.fine_grained();
        table.check_row(row)?;
        let _row = table.row_latch(row).acquire(LatchMode::Shared);
        Ok(table.find_in_row(row, needle))
    }

    /// Topmost row of `col` whose value equals `needle`.
    pub fn search_in_col(&self, col: usize, needle: &str) -> Result<Option<usize>> {
        let table = self.gate.fine_grained();
        table.check_col(col)?;
        let _col = table.col_latch(col).acquire(LatchMode::Shared);
        Ok(table.find_in_col(col, needle))
    }

    /// First match scanning rows top to bottom, each row left to right.
    pub fn search_string(&self, needle: &str) -> Option<CellRef> {
        let mut row = 0;
        // Rows are re-checked on every step: the sheet may grow (or be reloaded) meanwhile.
        while let Ok(found) = self.search_in_row(row, needle) {
            if let Some(col) = found {
                return Some(CellRef::new(row, col));
            }
            row += 1;
        }
        None
    }

    /// Search the rows of `range`, top to bottom, for a match inside the range.
    ///
    /// Only the **first** occurrence of `needle` in each row is considered. If that occurrence
    /// falls outside `col_start..=col_end` the row is skipped, even when a later cell of the same
    /// row would match inside the range. Callers that need every in-range occurrence should scan
    /// with [`SharedSheet::get_cell`] or a [`SharedSheet::snapshot`] instead.
    ///
    /// Rows past the end of the sheet end the search; an inverted range finds nothing.
    pub fn search_in_range(&self, range: CellRange, needle: &str) -> Option<CellRef> {
        for row in range.row_start..=range.row_end {
            match self.search_in_row(row, needle) {
                Ok(Some(col)) if range.contains_col(col) => return Some(CellRef::new(row, col)),
                Ok(_) => {}
                Err(_) => break,
            }
        }
        None
    }
}
