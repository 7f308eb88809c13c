//! Text persistence.
//!
//! ```text
//! rows,cols
//! row,col,"value"
//! ```
//!
//! One line per non-empty cell, row-major. Values are always quoted; a `"` inside a value is
//! doubled, as in CSV, so commas, quotes and line breaks survive a round trip. Readers also
//! accept unquoted values and whitespace around the numeric fields.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use csv::StringRecord;
use tempfile::NamedTempFile;

use crate::error::{Result, SheetError};
use crate::table::Table;

/// Refuse headers that would allocate absurd grids. An empty dimension still costs one latch and
/// one `Vec` per index along the other, so each side counts as at least 1.
const MAX_CELLS: usize = 1 << 24;

pub(crate) fn write_table(table: &Table, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{},{}", table.rows(), table.cols())?;
    let mut result = Ok(());
    table.for_each_non_empty(|row, col, value| {
        if result.is_ok() {
            result = writeln!(out, "{row},{col},\"{}\"", value.replace('"', "\"\""));
        }
    });
    result
}

pub(crate) fn read_table(reader: impl Read) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        // The `rows,cols` line is parsed by hand below.
        .has_headers(false)
        // Header and cell lines have different field counts.
        .flexible(true)
        .from_reader(reader);
    let mut records = csv_reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(map_csv_error)?,
        None => return Err(parse_error(1, "missing `rows,cols` header")),
    };
    let header_line = record_line(&header);
    if header.len() != 2 {
        return Err(parse_error(
            header_line,
            format!("expected `rows,cols` header, found {} fields", header.len()),
        ));
    }
    let rows = parse_index(&header, 0, "row count")?;
    let cols = parse_index(&header, 1, "column count")?;
    if rows
        .max(1)
        .checked_mul(cols.max(1))
        .map_or(true, |cells| cells > MAX_CELLS)
    {
        return Err(parse_error(
            header_line,
            format!("{rows}x{cols} grid exceeds {MAX_CELLS} cells"),
        ));
    }

    let mut table = Table::new(rows, cols);
    for record in records {
        let record = record.map_err(map_csv_error)?;
        let line = record_line(&record);
        if record.len() != 3 {
            return Err(parse_error(
                line,
                format!("expected `row,col,\"value\"`, found {} fields", record.len()),
            ));
        }
        let row = parse_index(&record, 0, "row")?;
        let col = parse_index(&record, 1, "column")?;
        if row >= rows || col >= cols {
            return Err(parse_error(
                line,
                format!("cell ({row}, {col}) lies outside the {rows}x{cols} grid"),
            ));
        }
        table.put(row, col, record[2].to_string());
    }
    Ok(table)
}

/// Write to a temp file next to `dest` and rename it into place, so a failed save never leaves a
/// truncated file behind.
pub(crate) fn save_table(dest: &Path, table: &Table) -> Result<()> {
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write_table(table, &mut out)?;
        out.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|err| err.error)?;
    Ok(())
}

pub(crate) fn load_table(source: &Path) -> Result<Table> {
    let file = File::open(source).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => SheetError::NotFound(source.to_path_buf()),
        _ => SheetError::Io(err),
    })?;
    read_table(BufReader::new(file))
}

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` is `Some("")` for bare file names.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn parse_index(record: &StringRecord, field: usize, what: &str) -> Result<usize> {
    let raw = record[field].trim();
    raw.parse().map_err(|_| {
        parse_error(
            record_line(record),
            format!("{what} `{raw}` is not a non-negative integer"),
        )
    })
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map_or(0, |pos| pos.line())
}

fn parse_error(line: u64, reason: impl Into<String>) -> SheetError {
    SheetError::Parse {
        line,
        reason: reason.into(),
    }
}

fn map_csv_error(err: csv::Error) -> SheetError {
    let line = err.position().map_or(0, |pos| pos.line());
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(err) => SheetError::Io(err),
        _ => parse_error(line, reason),
    }
}
