//! Flusher task.
//!
//! Exactly one flusher runs per engine. It owns all flush timing and is the
//! only caller of the committer, so commits never overlap and the commit path
//! needs no lock of its own.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::batch::accumulator::Accumulator;
use crate::batch::stats::FlushStats;
use crate::batch::types::{CommitFailure, FlushReport, WakeReason};
use crate::config::BatchConfig;
use crate::error_handling::DatabaseError;
use crate::storage::{BatchCommitter, Record};

pub(crate) struct Flusher<C> {
    pub(crate) accumulator: Arc<Accumulator>,
    pub(crate) committer: Arc<C>,
    pub(crate) config: BatchConfig,
    pub(crate) stats: Arc<FlushStats>,
    pub(crate) shutdown: CancellationToken,
}

impl<C: BatchCommitter> Flusher<C> {
    /// Runs until shutdown, then performs one final flush.
    pub(crate) async fn run(self) {
        // If this task ends early (a panicking committer) appends must stop
        // succeeding, since nothing would ever flush them
        let _stop_accepting = CloseOnExit(&self.accumulator);

        log::debug!(
            "Flusher started (max_batch_size={}, flush_interval={:?})",
            self.config.max_batch_size,
            self.config.flush_interval
        );

        loop {
            let reason = self.wait().await;
            log::trace!("Flusher woke: {:?}", reason);

            self.flush().await;

            if reason == WakeReason::Shutdown {
                break;
            }
        }

        log::info!("Flusher stopped");
    }

    /// Blocks until the timer elapses, a flush is requested, or shutdown begins.
    ///
    /// The sleep is created fresh on every call, so the interval is measured
    /// from the end of the previous cycle.
    async fn wait(&self) -> WakeReason {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => WakeReason::Shutdown,
            _ = self.accumulator.flush_requested() => WakeReason::Kick,
            _ = tokio::time::sleep(self.config.flush_interval) => WakeReason::Timer,
        }
    }

    /// Swaps out the buffer and commits it. Empty buffers are skipped.
    async fn flush(&self) {
        let batch = self.accumulator.swap_and_clear();
        if batch.is_empty() {
            return;
        }

        let records = batch.len();
        log::debug!("Flushing batch of {} records", records);
        let start = Instant::now();

        match self.commit(&batch).await {
            Ok(()) => {
                let report = FlushReport {
                    records,
                    elapsed: start.elapsed(),
                };
                self.stats.record_success(records);
                log::debug!("Flushed {} records in {:?}", records, report.elapsed);
                if let Some(on_flush) = &self.config.on_flush {
                    run_handler("flush", &**on_flush, &report);
                }
            }
            Err(error) => {
                let failure = CommitFailure {
                    error,
                    records,
                    elapsed: start.elapsed(),
                };
                self.stats.record_failure(records);
                log::error!(
                    "Flush failed, dropping {} records after {:?}: {}",
                    records,
                    failure.elapsed,
                    failure.error
                );
                if let Some(on_error) = &self.config.on_error {
                    run_handler("error", &**on_error, &failure);
                }
            }
        }
    }

    async fn commit(&self, batch: &[Record]) -> Result<(), DatabaseError> {
        match self.config.commit_timeout {
            // Dropping the in-flight commit drops its transaction, which rolls it back
            Some(deadline) => tokio::time::timeout(deadline, self.committer.commit_batch(batch))
                .await
                .unwrap_or(Err(DatabaseError::CommitTimeout(deadline))),
            None => self.committer.commit_batch(batch).await,
        }
    }
}

struct CloseOnExit<'a>(&'a Accumulator);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Calls a user handler, logging a panic instead of letting it end the flusher.
fn run_handler<T>(kind: &str, handler: &(dyn Fn(&T) + Send + Sync), value: &T) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(value))) {
        log::error!("{} handler panicked: {}", kind, panic_message(&*payload));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
