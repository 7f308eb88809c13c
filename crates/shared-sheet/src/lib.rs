//! An in-memory spreadsheet shared by many threads.
//!
//! [`SharedSheet`] holds a grid of strings and lets independent cell operations run in parallel
//! while operations that reshape the grid or touch all of it run alone. It is built from two
//! tiers of locking:
//!
//! - a global gate (a readers-writer lock): fine-grained operations enter as readers, structural
//!   operations as the single writer;
//! - per-row and per-column latches: counted locks that readers of the same row or column share
//!   and that cell writers take exclusively.
//!
//! Any operation that needs several latches takes rows before columns, ascending within each.
//!
//! The crate also exposes:
//! - text persistence (`rows,cols` header plus one `row,col,"value"` line per non-empty cell)
//! - point-in-time [`Snapshot`]s with a text rendering
//! - a randomized multi-threaded [`stress`] harness, driven by the `shared-sheet-stress` binary

mod address;
pub mod cli;
mod error;
mod gate;
mod latch;
mod persist;
mod search;
mod sheet;
mod snapshot;
pub mod stress;
mod table;

pub use address::{col_to_name, CellRange, CellRef};
pub use error::{Axis, Result, SheetError};
pub use sheet::SharedSheet;
pub use snapshot::Snapshot;
pub use stress::{run_stress, OpCounts, Operation, OperationKind, StressConfig, StressReport};
