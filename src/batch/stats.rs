//! Flush statistics tracking.
//!
//! Counters are updated only by the flusher and read from any thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe flush counters.
#[derive(Debug, Default)]
pub struct FlushStats {
    flushes: AtomicU64,
    records_flushed: AtomicU64,
    failed_flushes: AtomicU64,
    records_dropped: AtomicU64,
}

/// Point-in-time copy of [`FlushStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStatsSnapshot {
    /// Batches committed
    pub flushes: u64,
    /// Records written by committed batches
    pub records_flushed: u64,
    /// Batches rolled back
    pub failed_flushes: u64,
    /// Records discarded with rolled-back batches
    pub records_dropped: u64,
}

impl FlushStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, records: usize) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.records_flushed
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self, records: usize) {
        self.failed_flushes.fetch_add(1, Ordering::Relaxed);
        self.records_dropped
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FlushStatsSnapshot {
        FlushStatsSnapshot {
            flushes: self.flushes.load(Ordering::Relaxed),
            records_flushed: self.records_flushed.load(Ordering::Relaxed),
            failed_flushes: self.failed_flushes.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
        }
    }
}
