//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `batch_insert` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use batch_insert::initialization::init_logger_with;
use batch_insert::{run_ingest, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    let log_level = opt.log_level.clone();
    let log_format = opt.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_ingest(opt).await {
        Ok(report) => {
            println!(
                "Appended {} record{} ({} flushed in {} batch{}, {} dropped, {} malformed line{}) in {:.1}s",
                report.appended,
                if report.appended == 1 { "" } else { "s" },
                report.stats.records_flushed,
                report.stats.flushes,
                if report.stats.flushes == 1 { "" } else { "es" },
                report.stats.records_dropped,
                report.malformed,
                if report.malformed == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            println!("Results saved in {}", report.db_path.display());
            if report.stats.records_dropped > 0 {
                process::exit(2);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("batch_insert error: {:#}", e);
            process::exit(1);
        }
    }
}
