//! Counted row/column latches.
//!
//! A latch pairs a usage counter with an exclusive lock. Shared users join the current
//! acquisition: the first one (counter 0 -> 1) takes the lock and the last one (1 -> 0) gives it
//! back, so any number of readers of the same row or column hold it together. An exclusive user
//! waits until nobody holds the latch at all.
//!
//! Lock order: whenever an operation needs more than one latch it takes row latches before
//! column latches, and ascending indices within each kind. [`CellLease`] encodes the row/column
//! half of that order for single-cell access.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LatchMode {
    Shared,
    Exclusive,
}

#[derive(Debug, Default)]
struct LatchState {
    /// Shared users of the current acquisition.
    users: usize,
    exclusive: bool,
}

impl LatchState {
    fn is_held(&self) -> bool {
        self.exclusive || self.users > 0
    }
}

#[derive(Debug, Default)]
pub(crate) struct Latch {
    state: Mutex<LatchState>,
    released: Condvar,
}

impl Latch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the latch can be taken in `mode`.
    pub(crate) fn acquire(&self, mode: LatchMode) -> LatchGuard<'_> {
        let state = self.lock_state();
        let mut state = match mode {
            LatchMode::Shared => self.wait_while(state, |s| s.exclusive),
            LatchMode::Exclusive => self.wait_while(state, |s| s.is_held()),
        };
        match mode {
            LatchMode::Shared => state.users += 1,
            LatchMode::Exclusive => state.exclusive = true,
        }
        LatchGuard { latch: self, mode }
    }

    fn release(&self, mode: LatchMode) {
        let mut state = self.lock_state();
        match mode {
            LatchMode::Shared => {
                state.users = state.users.saturating_sub(1);
                if state.users > 0 {
                    return;
                }
            }
            LatchMode::Exclusive => state.exclusive = false,
        }
        drop(state);
        self.released.notify_all();
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self) -> bool {
        self.lock_state().is_held()
    }

    #[cfg(test)]
    pub(crate) fn shared_users(&self) -> usize {
        self.lock_state().users
    }

    fn lock_state(&self) -> MutexGuard<'_, LatchState> {
        // The state is two plain fields updated without intermediate steps, so it is always
        // consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_while<'a>(
        &self,
        state: MutexGuard<'a, LatchState>,
        condition: impl FnMut(&mut LatchState) -> bool,
    ) -> MutexGuard<'a, LatchState> {
        self.released
            .wait_while(state, condition)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases its latch when dropped.
#[derive(Debug)]
#[must_use = "the latch is released as soon as the guard is dropped"]
pub(crate) struct LatchGuard<'a> {
    latch: &'a Latch,
    mode: LatchMode,
}

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        self.latch.release(self.mode);
    }
}

/// A row latch plus a column latch, held together for single-cell access.
///
/// Fields drop in declaration order, so the column is released before the row.
#[derive(Debug)]
#[must_use = "the cell is released as soon as the lease is dropped"]
pub(crate) struct CellLease<'a> {
    _col: LatchGuard<'a>,
    _row: LatchGuard<'a>,
}

impl<'a> CellLease<'a> {
    pub(crate) fn acquire(row: &'a Latch, col: &'a Latch, mode: LatchMode) -> Self {
        let row = row.acquire(mode);
        let col = col.acquire(mode);
        Self {
            _col: col,
            _row: row,
        }
    }
}
