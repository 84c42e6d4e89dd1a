//! Main application modules.
//!
//! This module provides the JSON-lines ingest loop behind the `batch_insert`
//! binary and its progress logging.

pub mod ingest;
pub mod logging;

// Re-export public API
pub use ingest::{run_ingest, IngestReport};
pub use logging::log_progress;
