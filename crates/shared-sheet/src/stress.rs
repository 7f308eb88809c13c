//! Randomized concurrent workload for a [`SharedSheet`].
//!
//! Each worker thread draws operations uniformly from the operation set, with indices reaching a
//! little past the current bounds so the out-of-range paths get exercised too. The run is
//! deterministic per worker (seeded) but not across workers, since thread interleaving is not.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::address::CellRange;
use crate::sheet::SharedSheet;

const WORDS: &[&str] = &["hi", "pizza", "smile", "hey", "thanks", "love you"];

#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Initial row count (default: 40).
    pub rows: usize,
    /// Initial column count (default: 40).
    pub cols: usize,
    /// Concurrent worker threads (default: 50).
    pub workers: usize,
    /// Operations issued by each worker (default: 100).
    pub ops_per_worker: usize,
    /// Worker `i` seeds its generator with `seed + i` (default: 0).
    pub seed: u64,
    /// File shared by the save/load operations. Save and load are only drawn when this is set.
    pub persistence: Option<PathBuf>,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            rows: 40,
            cols: 40,
            workers: 50,
            ops_per_worker: 100,
            seed: 0,
            persistence: None,
        }
    }
}

impl StressConfig {
    /// A fresh sheet with the configured initial shape.
    pub fn new_sheet(&self) -> SharedSheet {
        SharedSheet::new(self.rows, self.cols)
    }

    fn kinds(&self) -> &'static [OperationKind] {
        if self.persistence.is_some() {
            &OperationKind::ALL
        } else {
            &OperationKind::IN_MEMORY
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationKind {
    GetCell,
    SetCell,
    SearchString,
    SearchInRow,
    SearchInCol,
    SearchInRange,
    ExchangeRows,
    ExchangeCols,
    AddRow,
    AddCol,
    Save,
    Load,
}

impl OperationKind {
    pub const ALL: [OperationKind; 12] = [
        OperationKind::GetCell,
        OperationKind::SetCell,
        OperationKind::SearchString,
        OperationKind::SearchInRow,
        OperationKind::SearchInCol,
        OperationKind::SearchInRange,
        OperationKind::ExchangeRows,
        OperationKind::ExchangeCols,
        OperationKind::AddRow,
        OperationKind::AddCol,
        OperationKind::Save,
        OperationKind::Load,
    ];

    /// Every kind except the ones touching the filesystem.
    pub const IN_MEMORY: [OperationKind; 10] = [
        OperationKind::GetCell,
        OperationKind::SetCell,
        OperationKind::SearchString,
        OperationKind::SearchInRow,
        OperationKind::SearchInCol,
        OperationKind::SearchInRange,
        OperationKind::ExchangeRows,
        OperationKind::ExchangeCols,
        OperationKind::AddRow,
        OperationKind::AddCol,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::GetCell => "get_cell",
            OperationKind::SetCell => "set_cell",
            OperationKind::SearchString => "search_string",
            OperationKind::SearchInRow => "search_in_row",
            OperationKind::SearchInCol => "search_in_col",
            OperationKind::SearchInRange => "search_in_range",
            OperationKind::ExchangeRows => "exchange_rows",
            OperationKind::ExchangeCols => "exchange_cols",
            OperationKind::AddRow => "add_row",
            OperationKind::AddCol => "add_col",
            OperationKind::Save => "save",
            OperationKind::Load => "load",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One call against the sheet, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    GetCell { row: usize, col: usize },
    SetCell { row: usize, col: usize, value: String },
    SearchString { needle: String },
    SearchInRow { row: usize, needle: String },
    SearchInCol { col: usize, needle: String },
    SearchInRange { range: CellRange, needle: String },
    ExchangeRows { first: usize, second: usize },
    ExchangeCols { first: usize, second: usize },
    AddRow { after: usize },
    AddCol { after: usize },
    Save,
    Load,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::GetCell { .. } => OperationKind::GetCell,
            Operation::SetCell { .. } => OperationKind::SetCell,
            Operation::SearchString { .. } => OperationKind::SearchString,
            Operation::SearchInRow { .. } => OperationKind::SearchInRow,
            Operation::SearchInCol { .. } => OperationKind::SearchInCol,
            Operation::SearchInRange { .. } => OperationKind::SearchInRange,
            Operation::ExchangeRows { .. } => OperationKind::ExchangeRows,
            Operation::ExchangeCols { .. } => OperationKind::ExchangeCols,
            Operation::AddRow { .. } => OperationKind::AddRow,
            Operation::AddCol { .. } => OperationKind::AddCol,
            Operation::Save => OperationKind::Save,
            Operation::Load => OperationKind::Load,
        }
    }

    /// Draw an operation of one of `kinds` for a sheet currently `rows` x `cols`.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        kinds: &[OperationKind],
        (rows, cols): (usize, usize),
    ) -> Self {
        let kind = kinds.choose(rng).copied().unwrap_or(OperationKind::GetCell);
        match kind {
            OperationKind::GetCell => Operation::GetCell {
                row: pick_index(rng, rows),
                col: pick_index(rng, cols),
            },
            OperationKind::SetCell => Operation::SetCell {
                row: pick_index(rng, rows),
                col: pick_index(rng, cols),
                value: pick_word(rng),
            },
            OperationKind::SearchString => Operation::SearchString {
                needle: pick_word(rng),
            },
            OperationKind::SearchInRow => Operation::SearchInRow {
                row: pick_index(rng, rows),
                needle: pick_word(rng),
            },
            OperationKind::SearchInCol => Operation::SearchInCol {
                col: pick_index(rng, cols),
                needle: pick_word(rng),
            },
            OperationKind::SearchInRange => {
                let row_start = pick_index(rng, rows);
                let col_start = pick_index(rng, cols);
                Operation::SearchInRange {
                    range: CellRange::new(
                        row_start,
                        row_start + rng.gen_range(0..=4),
                        col_start,
                        col_start + rng.gen_range(0..=4),
                    ),
                    needle: pick_word(rng),
                }
            }
            OperationKind::ExchangeRows => Operation::ExchangeRows {
                first: pick_index(rng, rows),
                second: pick_index(rng, rows),
            },
            OperationKind::ExchangeCols => Operation::ExchangeCols {
                first: pick_index(rng, cols),
                second: pick_index(rng, cols),
            },
            OperationKind::AddRow => Operation::AddRow {
                after: pick_index(rng, rows),
            },
            OperationKind::AddCol => Operation::AddCol {
                after: pick_index(rng, cols),
            },
            OperationKind::Save => Operation::Save,
            OperationKind::Load => Operation::Load,
        }
    }

    /// Run against `sheet`. Returns whether the call succeeded; searches succeed when they find
    /// something. Save/load fail when no `persistence` file is given.
    pub fn apply(&self, sheet: &SharedSheet, persistence: Option<&Path>) -> bool {
        match self {
            Operation::GetCell { row, col } => sheet.get_cell(*row, *col).is_ok(),
            Operation::SetCell { row, col, value } => {
                sheet.set_cell(*row, *col, value.as_str()).is_ok()
            }
            Operation::SearchString { needle } => sheet.search_string(needle).is_some(),
            Operation::SearchInRow { row, needle } => {
                matches!(sheet.search_in_row(*row, needle), Ok(Some(_)))
            }
            Operation::SearchInCol { col, needle } => {
                matches!(sheet.search_in_col(*col, needle), Ok(Some(_)))
            }
            Operation::SearchInRange { range, needle } => {
                sheet.search_in_range(*range, needle).is_some()
            }
            Operation::ExchangeRows { first, second } => {
                sheet.exchange_rows(*first, *second).is_ok()
            }
            Operation::ExchangeCols { first, second } => {
                sheet.exchange_cols(*first, *second).is_ok()
            }
            Operation::AddRow { after } => sheet.add_row(*after).is_ok(),
            Operation::AddCol { after } => sheet.add_col(*after).is_ok(),
            Operation::Save => persistence.is_some_and(|path| sheet.save(path).is_ok()),
            Operation::Load => persistence.is_some_and(|path| sheet.load(path).is_ok()),
        }
    }
}

/// Indices up to an eighth past the end (and always at least `len` itself) so some draws are out
/// of range.
fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    rng.gen_range(0..=len + len / 8)
}

fn pick_word<R: Rng + ?Sized>(rng: &mut R) -> String {
    WORDS.choose(rng).copied().unwrap_or("hi").to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub attempted: u64,
    pub succeeded: u64,
}

#[derive(Debug, Clone, Default)]
pub struct StressReport {
    pub counts: BTreeMap<OperationKind, OpCounts>,
    pub elapsed: Duration,
}

impl StressReport {
    pub fn attempted(&self) -> u64 {
        self.counts.values().map(|c| c.attempted).sum()
    }

    pub fn succeeded(&self, kind: OperationKind) -> u64 {
        self.counts.get(&kind).map_or(0, |c| c.succeeded)
    }

    pub fn rows_added(&self) -> u64 {
        self.succeeded(OperationKind::AddRow)
    }

    pub fn cols_added(&self) -> u64 {
        self.succeeded(OperationKind::AddCol)
    }

    fn absorb(&mut self, counts: BTreeMap<OperationKind, OpCounts>) {
        for (kind, counts) in counts {
            let total = self.counts.entry(kind).or_default();
            total.attempted += counts.attempted;
            total.succeeded += counts.succeeded;
        }
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<16} {:>10} {:>10}", "operation", "attempted", "succeeded")?;
        for (kind, counts) in &self.counts {
            writeln!(
                f,
                "{:<16} {:>10} {:>10}",
                kind.name(),
                counts.attempted,
                counts.succeeded
            )?;
        }
        writeln!(
            f,
            "{} operations in {:.3}s",
            self.attempted(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Hammer `sheet` with `config.workers` threads and wait for all of them.
///
/// A panicking worker is re-raised on the calling thread once the others have finished.
pub fn run_stress(sheet: &SharedSheet, config: &StressConfig) -> StressReport {
    let kinds = config.kinds();
    log::info!(
        "stress run: {} workers x {} operations on a {}x{} sheet",
        config.workers,
        config.ops_per_worker,
        sheet.rows(),
        sheet.cols()
    );

    let started = Instant::now();
    let tallies: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..config.workers)
            .map(|worker| scope.spawn(move || run_worker(sheet, config, kinds, worker)))
            .collect();
        workers
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    });

    let mut report = StressReport::default();
    for tally in tallies {
        report.absorb(tally);
    }
    report.elapsed = started.elapsed();
    report
}

fn run_worker(
    sheet: &SharedSheet,
    config: &StressConfig,
    kinds: &[OperationKind],
    worker: usize,
) -> BTreeMap<OperationKind, OpCounts> {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(worker as u64));
    let persistence = config.persistence.as_deref();
    let mut counts: BTreeMap<OperationKind, OpCounts> = BTreeMap::new();
    for _ in 0..config.ops_per_worker {
        let op = Operation::random(&mut rng, kinds, sheet.dimensions());
        let ok = op.apply(sheet, persistence);
        let entry = counts.entry(op.kind()).or_default();
        entry.attempted += 1;
        if ok {
            entry.succeeded += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_kinds_never_draw_persistence() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let op = Operation::random(&mut rng, &OperationKind::IN_MEMORY, (4, 4));
            assert!(!matches!(op, Operation::Save | Operation::Load), "{op:?}");
        }
    }

    #[test]
    fn indices_reach_past_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<usize> = (0..2000).map(|_| pick_index(&mut rng, 16)).collect();
        assert!(draws.iter().all(|&i| i <= 18));
        assert!(draws.iter().any(|&i| i >= 16), "no out-of-range draws");
        assert!(draws.iter().any(|&i| i < 16));
    }

    #[test]
    fn persistence_ops_fail_without_a_file() {
        let sheet = SharedSheet::new(2, 2);
        assert!(!Operation::Save.apply(&sheet, None));
        assert!(!Operation::Load.apply(&sheet, None));
    }

    #[test]
    fn report_sums_worker_tallies() {
        let mut report = StressReport::default();
        for _ in 0..3 {
            let mut tally = BTreeMap::new();
            tally.insert(
                OperationKind::AddRow,
                OpCounts {
                    attempted: 2,
                    succeeded: 1,
                },
            );
            report.absorb(tally);
        }
        assert_eq!(report.attempted(), 6);
        assert_eq!(report.rows_added(), 3);
        assert_eq!(report.cols_added(), 0);
        assert!(report.to_string().contains("add_row"));
    }
}
