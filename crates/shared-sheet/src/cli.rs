use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::stress::{run_stress, StressConfig};

/// CLI arguments for the `shared-sheet-stress` binary.
#[derive(Parser, Debug)]
#[command(about = "Hammer a shared spreadsheet with concurrent random operations.")]
pub struct Args {
    /// Initial number of rows.
    #[arg(long, default_value_t = 40)]
    rows: usize,

    /// Initial number of columns.
    #[arg(long, default_value_t = 40)]
    cols: usize,

    /// Concurrent worker threads.
    #[arg(long, default_value_t = 50)]
    workers: usize,

    /// Operations issued by each worker.
    #[arg(long = "ops", default_value_t = 100)]
    ops_per_worker: usize,

    /// Base seed for the workers' generators (default: random).
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for save/load traffic. Enables the save and load operations and receives the
    /// final grid as `final.sheet`.
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Print the final grid as a text table.
    #[arg(long)]
    render: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();
    run_with_args(args)
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run_with_args(args: Args) -> Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = StressConfig {
        rows: args.rows,
        cols: args.cols,
        workers: args.workers,
        ops_per_worker: args.ops_per_worker,
        seed,
        persistence: args.save_dir.as_ref().map(|dir| dir.join("stress.sheet")),
    };
    log::info!("seed {seed}");

    let sheet = config.new_sheet();
    let report = run_stress(&sheet, &config);
    print!("{report}");

    let (rows, cols) = sheet.dimensions();
    println!("final size: {rows}x{cols}");
    if config.persistence.is_none() {
        // Without reloads the shape only changes through insertions.
        let expected = (
            config.rows as u64 + report.rows_added(),
            config.cols as u64 + report.cols_added(),
        );
        ensure!(
            (rows as u64, cols as u64) == expected,
            "final size {rows}x{cols} does not match {}x{} expected from insertions",
            expected.0,
            expected.1
        );
    }

    if args.render {
        print!("{}", sheet.snapshot());
    }

    if let Some(dir) = &args.save_dir {
        let dest = dir.join("final.sheet");
        sheet
            .save(&dest)
            .with_context(|| format!("save final grid to {}", dest.display()))?;
        println!("saved final grid to {}", dest.display());
    }

    Ok(())
}
