//! Batch writer implementation.
//!
//! This module provides the `BatchInsert` engine: the public face of the
//! accumulator and its flusher task.

mod flush;

use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::batch::accumulator::Accumulator;
use crate::batch::stats::{FlushStats, FlushStatsSnapshot};
use crate::config::BatchConfig;
use crate::error_handling::BatchError;
use crate::storage::{BatchCommitter, Record, SqliteCommitter, StoreOptions};

use flush::Flusher;

/// Buffers records in memory and commits them in batched transactions.
///
/// A background flusher commits the buffer whenever it reaches
/// `max_batch_size` records or `flush_interval` elapses, whichever comes
/// first. [`BatchInsert::close`] drains the remaining records before
/// returning.
///
/// **Delivery is at-most-once.** A batch that fails to commit is rolled back,
/// reported through `on_error`, and dropped. Nothing is retried.
///
/// Must be constructed inside a Tokio runtime.
pub struct BatchInsert<C: BatchCommitter = SqliteCommitter> {
    accumulator: Arc<Accumulator>,
    committer: Arc<C>,
    stats: Arc<FlushStats>,
    shutdown: CancellationToken,
    lifecycle: Mutex<Lifecycle>,
}

/// What `close` still has to do. Only advanced once a step has completed, so
/// a `close` future dropped midway leaves the rest to the next call.
struct Lifecycle {
    flusher: Option<JoinHandle<()>>,
    store_open: bool,
}

impl<C: BatchCommitter> BatchInsert<C> {
    /// Starts an engine on top of any batch committer.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::InvalidConfig` if `config` fails validation. No
    /// flusher is started in that case.
    pub fn new(committer: C, config: BatchConfig) -> Result<Self, BatchError> {
        config.validate()?;

        let accumulator = Arc::new(Accumulator::new(config.max_batch_size));
        let committer = Arc::new(committer);
        let stats = Arc::new(FlushStats::new());
        let shutdown = CancellationToken::new();

        let flusher = Flusher {
            accumulator: Arc::clone(&accumulator),
            committer: Arc::clone(&committer),
            config,
            stats: Arc::clone(&stats),
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(flusher.run());

        Ok(BatchInsert {
            accumulator,
            committer,
            stats,
            shutdown,
            lifecycle: Mutex::new(Lifecycle {
                flusher: Some(handle),
                store_open: true,
            }),
        })
    }

    /// Buffers a record for the next flush.
    ///
    /// Never waits on I/O. Wakes the flusher early when the buffer reaches
    /// `max_batch_size`.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::EngineClosed` once [`BatchInsert::close`] has been
    /// called.
    pub fn append(&self, record: impl Into<Record>) -> Result<(), BatchError> {
        self.accumulator.append(record.into())
    }

    /// Number of records buffered and not yet handed to the flusher.
    pub fn len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulator.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.accumulator.is_closed()
    }

    /// Counters for committed and dropped batches.
    pub fn stats(&self) -> FlushStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn committer(&self) -> &C {
        &self.committer
    }

    /// Stops accepting records, flushes what is buffered, and waits for the
    /// flusher to exit.
    ///
    /// Idempotent: a call made while another is draining returns `Ok(())`
    /// immediately, as does any call after one has finished. Dropping a
    /// `close` future before it finishes is safe; the next call picks up where
    /// it stopped.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::FlusherJoin` if the flusher task panicked. Records
    /// still buffered at that point are counted as dropped. The committer is
    /// closed either way. A failed final commit is not an error here; it is
    /// reported through `on_error` like any other flush.
    pub async fn close(&self) -> Result<(), BatchError> {
        self.accumulator.close();
        self.shutdown.cancel();

        let Ok(mut lifecycle) = self.lifecycle.try_lock() else {
            return Ok(());
        };
        let joined = match lifecycle.flusher.as_mut() {
            Some(handle) => handle.await,
            None => Ok(()),
        };
        lifecycle.flusher = None;

        if joined.is_err() {
            let stranded = self.accumulator.swap_and_clear();
            if !stranded.is_empty() {
                log::error!(
                    "Flusher exited early, dropping {} buffered records",
                    stranded.len()
                );
                self.stats.record_failure(stranded.len());
            }
        }

        if lifecycle.store_open {
            self.committer.close().await;
            lifecycle.store_open = false;
        }

        joined?;
        Ok(())
    }
}

impl BatchInsert<SqliteCommitter> {
    /// Starts an engine on a pool owned by the caller.
    ///
    /// `close` drains the engine but leaves the pool open.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::InvalidConfig` for an empty statement or an invalid
    /// `config`.
    pub fn with_pool(
        pool: SqlitePool,
        insert_sql: impl Into<String>,
        config: BatchConfig,
    ) -> Result<Self, BatchError> {
        let committer = SqliteCommitter::new(pool, insert_sql);
        check_statement(committer.insert_sql())?;
        Self::new(committer, config)
    }

    /// Opens the backing store and starts an engine that owns it.
    ///
    /// `close` drains the engine and then closes the pool.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::InvalidConfig` before touching the store if the
    /// statement or `config` is invalid, and `BatchError::Database` if the
    /// store cannot be opened.
    pub async fn connect(
        store: &StoreOptions,
        insert_sql: impl Into<String>,
        config: BatchConfig,
    ) -> Result<Self, BatchError> {
        let insert_sql = insert_sql.into();
        check_statement(&insert_sql)?;
        config.validate()?;

        let pool = store.open().await?;
        Self::new(SqliteCommitter::owning(pool, insert_sql), config)
    }

    /// The pool batches are written to.
    pub fn pool(&self) -> &SqlitePool {
        self.committer.pool()
    }
}

impl<C: BatchCommitter> Drop for BatchInsert<C> {
    fn drop(&mut self) {
        // Without a close() the flusher still drains, but nobody waits for it
        self.shutdown.cancel();
    }
}

fn check_statement(insert_sql: &str) -> Result<(), BatchError> {
    if insert_sql.trim().is_empty() {
        return Err(BatchError::InvalidConfig(
            "insert statement must not be empty".to_string(),
        ));
    }
    Ok(())
}
