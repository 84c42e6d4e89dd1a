//! Configuration constants.
//!
//! This module defines the defaults used by the batch engine and the SQLite
//! backing store.

use std::time::Duration;

/// Record-count threshold that triggers an early flush.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1_000_000;

/// Period between forced flushes, measured from the end of the previous cycle.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Default SQLite database file used by the CLI.
pub const DB_PATH: &str = "./batch_insert.db";

// Backing store connection settings
/// Maximum connections in the SQLite pool.
/// Only one flush runs at a time, the extra connections serve callers that
/// share the pool for reads.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;
/// How long SQLite waits on a locked database before returning `SQLITE_BUSY`.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
/// How long to wait for a free pool connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Log ingest progress every N input lines.
pub const PROGRESS_LOG_INTERVAL: usize = 100_000;
