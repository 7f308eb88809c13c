use std::fmt;

use crate::address::{col_to_name, CellRef};

/// A point-in-time copy of the whole grid, produced by [`crate::SharedSheet::snapshot`].
///
/// `Display` renders an aligned text table with column letters across the top and 1-based row
/// numbers down the side:
///
/// ```text
///   | A  | B
/// 1 | hi |
/// 2 |    | x
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    cols: usize,
    cells: Vec<Vec<String>>,
}

impl Snapshot {
    pub(crate) fn new(cols: usize, cells: Vec<Vec<String>>) -> Self {
        Self { cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows(), self.cols)
    }

    /// `None` when out of range; empty cells are `Some("")`.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    /// Non-empty cells in row-major order.
    pub fn non_empty_cells(&self) -> impl Iterator<Item = (CellRef, &str)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_empty())
                .map(move |(col, value)| (CellRef::new(row, col), value.as_str()))
        })
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = (0..self.cols).map(col_to_name).collect();
        let widths: Vec<usize> = names
            .iter()
            .enumerate()
            .map(|(col, name)| {
                self.cells
                    .iter()
                    .map(|row| row[col].chars().count())
                    .fold(name.len(), usize::max)
            })
            .collect();
        let label_width = self.rows().to_string().len();

        let mut line = format!("{:>label_width$}", "");
        for (name, width) in names.iter().zip(widths.iter().copied()) {
            line.push_str(&format!(" | {name:<width$}"));
        }
        writeln!(f, "{}", line.trim_end())?;

        for (row, cells) in self.cells.iter().enumerate() {
            let mut line = format!("{:>label_width$}", row + 1);
            for (value, width) in cells.iter().zip(widths.iter().copied()) {
                line.push_str(&format!(" | {value:<width$}"));
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Snapshot {
        Snapshot::new(
            2,
            vec![
                vec!["hi".to_string(), String::new()],
                vec![String::new(), "x".to_string()],
            ],
        )
    }

    #[test]
    fn renders_aligned_table() {
        assert_eq!(sample().to_string(), "  | A  | B\n1 | hi |\n2 |    | x\n");
    }

    #[test]
    fn lists_non_empty_cells_row_major() {
        let snapshot = sample();
        let cells: Vec<_> = snapshot.non_empty_cells().collect();
        assert_eq!(cells, vec![(CellRef::new(0, 0), "hi"), (CellRef::new(1, 1), "x")]);
        assert_eq!(snapshot.get(1, 0), Some(""));
        assert_eq!(snapshot.get(2, 0), None);
    }
}
