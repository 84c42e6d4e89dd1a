//! Flush outcome types passed to the configured callbacks.

use std::time::Duration;

use crate::error_handling::DatabaseError;

/// Summary of a committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    /// Records written by the commit
    pub records: usize,
    /// Time spent in the commit, including transaction setup
    pub elapsed: Duration,
}

/// A batch that failed to commit.
///
/// The batch was rolled back and its records are dropped: delivery is
/// at-most-once and nothing is retried.
#[derive(Debug)]
pub struct CommitFailure {
    pub error: DatabaseError,
    /// Records dropped with the batch
    pub records: usize,
    pub elapsed: Duration,
}

/// Why the flusher left its waiting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WakeReason {
    Timer,
    Kick,
    Shutdown,
}
