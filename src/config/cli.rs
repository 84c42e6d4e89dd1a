//! Command-line options for the `batch_insert` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::constants::{DB_PATH, DEFAULT_MAX_BATCH_SIZE};
use crate::config::types::{BatchConfig, LogFormat, LogLevel};
use crate::storage::StoreOptions;

/// Streams JSON-lines rows into a SQLite table through the batch engine.
///
/// Each input line must be a JSON array whose elements are bound, in order, to
/// the placeholders of the insert statement.
#[derive(Debug, Clone, Parser)]
#[command(name = "batch_insert", version, about)]
pub struct Opt {
    /// Input file (JSON lines); reads stdin when omitted
    pub file: Option<PathBuf>,

    /// Parameterized insert statement, e.g. "INSERT INTO t (a, b) VALUES (?, ?)"
    #[arg(long)]
    pub sql: String,

    /// SQLite database path
    #[arg(long, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Statement executed once before streaming (e.g. CREATE TABLE IF NOT EXISTS ...)
    #[arg(long)]
    pub schema: Option<String>,

    /// Buffered record count that triggers an early flush
    #[arg(long, default_value_t = DEFAULT_MAX_BATCH_SIZE)]
    pub max_batch_size: usize,

    /// Milliseconds between forced flushes
    #[arg(long, default_value_t = 1000)]
    pub flush_interval_ms: u64,

    /// Deadline in milliseconds for a single commit
    #[arg(long)]
    pub commit_timeout_ms: Option<u64>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

impl Opt {
    /// Builds the engine configuration from the parsed flags.
    pub fn batch_config(&self) -> BatchConfig {
        let config = BatchConfig::default()
            .with_max_batch_size(self.max_batch_size)
            .with_flush_interval(Duration::from_millis(self.flush_interval_ms));
        match self.commit_timeout_ms {
            Some(ms) => config.with_commit_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }

    /// Builds the backing store options from the parsed flags.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::file(&self.db_path)
    }
}
