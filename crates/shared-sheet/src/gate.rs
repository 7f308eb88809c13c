//! The global access gate.
//!
//! Fine-grained operations (cell reads/writes and searches) enter through the read side and may
//! run many at once; they then coordinate on row/column latches. Structural operations
//! (exchange, insertion, save, load) enter through the write side and run alone.
//!
//! Waiting follows `std::sync::RwLock`'s platform policy. On Linux the futex implementation
//! stops admitting new readers once a writer is queued; other platforms give no such promise.
//! Nothing here adds fairness on top.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::table::Table;

#[derive(Debug)]
pub(crate) struct Gate {
    table: RwLock<Table>,
}

impl Gate {
    pub(crate) fn new(table: Table) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }

    /// Register a fine-grained operation. The table's shape cannot change while the guard lives.
    ///
    /// Never call this while already holding a guard from the same gate: a queued structural
    /// operation would deadlock the second acquisition.
    pub(crate) fn fine_grained(&self) -> RwLockReadGuard<'_, Table> {
        // Structural edits are in-bounds `Vec` swaps and inserts, which do not unwind midway, so a
        // poisoned gate never exposes a half-reshaped table.
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for every fine-grained operation to drain, then hold the table alone.
    pub(crate) fn structural(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}
