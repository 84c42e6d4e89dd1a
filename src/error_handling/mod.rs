//! Error handling.
//!
//! Errors are split by where they surface:
//! - **`BatchError`**: returned synchronously from engine construction, `append`, and `close`
//! - **`DatabaseError`**: raised by the backing store, reported asynchronously for flushes
//! - **`InitializationError`**: logger setup in the binary

mod types;

// Re-export public API
pub use types::{BatchError, DatabaseError, InitializationError};
