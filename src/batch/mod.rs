//! Write buffering engine.
//!
//! Producers append records to a shared accumulator; a single flusher task swaps
//! the buffer out and commits it as one transaction whenever the size
//! threshold is reached, the flush interval elapses, or the engine closes.

mod accumulator;
mod stats;
mod types;
mod writer;

pub use stats::{FlushStats, FlushStatsSnapshot};
pub use types::{CommitFailure, FlushReport};
pub use writer::BatchInsert;
