//! Application initialization.
//!
//! The engine itself needs no global setup; this module configures the
//! process-wide logger used by the binary and by embedding applications that
//! want the same log format.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
