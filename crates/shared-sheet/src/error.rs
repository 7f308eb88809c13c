use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which grid dimension an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SheetError {
    /// An index outside the current grid bounds. The sheet is left untouched.
    #[error("{axis} {index} out of range (sheet has {len})")]
    OutOfRange { axis: Axis, index: usize, len: usize },
    /// The persistence source passed to `load` does not exist.
    #[error("sheet file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A malformed persistence file. `line` is 1-based.
    #[error("invalid sheet file at line {line}: {reason}")]
    Parse { line: u64, reason: String },
}

impl SheetError {
    pub(crate) fn out_of_range(axis: Axis, index: usize, len: usize) -> Self {
        SheetError::OutOfRange { axis, index, len }
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, SheetError::OutOfRange { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SheetError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
