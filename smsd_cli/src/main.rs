//! SMSD pairwise comparison CLI
//!
//! Parses SMILES from the command line (or the built-in demo set), compares
//! every pair of molecules and prints the common fragments.

#[global_allocator]
/// Global allocator using jemalloc for better performance in parallel workloads.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod args;
mod report;

use clap::Parser;
use smsd_driver::Driver;
use smsd_smiles::{SmilesWriter, parse_all};
use smsd_subgraph::BacktrackOracle;
use tracing::info;

use args::Args;

/// Runs one batch.
///
/// This function:
/// 1. Initializes logging
/// 2. Parses command-line arguments and the input molecules
/// 3. Compares every pair on the worker pool
/// 4. Renders the report to stdout
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let config = args.to_config();
    let smiles = args.inputs();
    let inputs = parse_all(&smiles[..]);

    let oracle = BacktrackOracle::new().with_step_limit(args.step_limit);
    let driver = Driver::new(oracle, SmilesWriter::new(), config)?;
    info!(
        "comparing {} molecules on {} workers",
        inputs.len(),
        driver.max_concurrency()
    );

    let report = driver.compare_all(&inputs);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::render(&report, driver.config(), args.format, &mut out)?;

    Ok(())
}
