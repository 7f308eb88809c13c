use core::fmt;

/// A single cell position.
///
/// Rows and columns are **0-indexed**; [`CellRef::to_a1`] renders the familiar 1-based
/// spreadsheet name (`row = 0, col = 0` is `A1`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// A1 notation (e.g. `A1`, `BC32`).
    pub fn to_a1(self) -> String {
        // Widened so the last representable row still has a name.
        format!("{}{}", col_to_name(self.col), self.row as u128 + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// An inclusive rectangle of cells.
///
/// Bounds are not normalized: a range whose start lies after its end is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl CellRange {
    pub fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    pub fn contains_row(&self, row: usize) -> bool {
        self.row_start <= row && row <= self.row_end
    }

    pub fn contains_col(&self, col: usize) -> bool {
        self.col_start <= col && col <= self.col_end
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        self.contains_row(cell.row) && self.contains_col(cell.col)
    }
}

/// Spreadsheet column letters for a 0-based column index (`0 -> A`, `26 -> AA`).
pub fn col_to_name(col: usize) -> String {
    let mut n = col;
    let mut out = Vec::<u8>::new();
    loop {
        out.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}
