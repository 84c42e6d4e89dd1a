//! Engine configuration and constants.
//!
//! This module provides:
//! - Default values for batching and the backing store
//! - The `BatchConfig` used to construct an engine
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::Opt;
pub use constants::*;
pub use types::{BatchConfig, ErrorHandler, FlushHandler, LogFormat, LogLevel};
