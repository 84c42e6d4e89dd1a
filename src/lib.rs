//! batch_insert library: batched, transactional writes in front of SQLite
//!
//! Callers append individual records; the engine buffers them in memory and a
//! single background flusher commits each buffer as one transaction when it
//! reaches `max_batch_size` records or `flush_interval` elapses.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use batch_insert::{record, BatchConfig, BatchInsert, StoreOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig::default()
//!     .with_max_batch_size(10_000)
//!     .with_flush_interval(Duration::from_millis(500))
//!     .with_error_handler(|failure| eprintln!("dropped {} rows: {}", failure.records, failure.error));
//!
//! let engine = BatchInsert::connect(
//!     &StoreOptions::file("events.db"),
//!     "INSERT INTO events (kind, value) VALUES (?, ?)",
//!     config,
//! )
//! .await?;
//!
//! engine.append(record!["click", 1])?;
//! engine.append(record!["view", 2])?;
//!
//! // Flushes whatever is still buffered before returning
//! engine.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery guarantees
//!
//! Delivery is **at-most-once**. A batch that fails to commit is rolled back in
//! full, reported through `on_error`, and dropped; it is never retried or
//! re-queued. Buffered records are lost if the process exits without `close`.
//!
//! # Requirements
//!
//! Engines spawn their flusher on the current Tokio runtime, so they must be
//! created from within one.

pub mod app;
pub mod batch;
pub mod config;
mod error_handling;
pub mod initialization;
pub mod storage;

// Re-export public API
pub use app::{run_ingest, IngestReport};
pub use batch::{BatchInsert, CommitFailure, FlushReport, FlushStats, FlushStatsSnapshot};
pub use config::{BatchConfig, LogFormat, LogLevel, Opt};
pub use error_handling::{BatchError, DatabaseError, InitializationError};
pub use storage::{BatchCommitter, Record, SqliteCommitter, StoreLocation, StoreOptions, Value};
