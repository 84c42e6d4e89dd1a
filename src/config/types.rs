//! Configuration types.
//!
//! This module defines the engine configuration and the logging enums used by
//! the CLI.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;

use crate::batch::{CommitFailure, FlushReport};
use crate::config::constants::{DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_BATCH_SIZE};
use crate::error_handling::BatchError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Callback invoked by the flusher when a batch fails to commit.
pub type ErrorHandler = Arc<dyn Fn(&CommitFailure) + Send + Sync>;

/// Callback invoked by the flusher after a batch commits.
pub type FlushHandler = Arc<dyn Fn(&FlushReport) + Send + Sync>;

/// Batch engine configuration.
///
/// Immutable once handed to an engine. Built with struct-update syntax or the
/// `with_*` methods:
///
/// ```
/// use std::time::Duration;
/// use batch_insert::BatchConfig;
///
/// let config = BatchConfig::default()
///     .with_max_batch_size(500)
///     .with_flush_interval(Duration::from_millis(200));
/// assert_eq!(config.max_batch_size, 500);
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Buffered record count that triggers an early flush
    pub max_batch_size: usize,

    /// Wall-clock period between forced flushes
    pub flush_interval: Duration,

    /// Deadline for a single commit; an expired deadline counts as a failed commit
    pub commit_timeout: Option<Duration>,

    /// Notified when a batch fails to commit and its records are dropped
    pub on_error: Option<ErrorHandler>,

    /// Notified when a batch commits
    pub on_flush: Option<FlushHandler>,
}

impl BatchConfig {
    /// Sets the record-count flush threshold.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Sets the period between forced flushes.
    pub fn with_flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_interval = flush_interval;
        self
    }

    /// Sets a deadline on each commit.
    pub fn with_commit_timeout(mut self, commit_timeout: Duration) -> Self {
        self.commit_timeout = Some(commit_timeout);
        self
    }

    /// Installs the commit-failure callback.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommitFailure) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Installs the commit-success callback.
    pub fn with_flush_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FlushReport) + Send + Sync + 'static,
    {
        self.on_flush = Some(Arc::new(handler));
        self
    }

    /// Rejects settings the flusher cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::InvalidConfig` for a zero batch size, a zero flush
    /// interval, or a zero commit timeout.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.max_batch_size == 0 {
            return Err(BatchError::InvalidConfig(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        if self.flush_interval.is_zero() {
            return Err(BatchError::InvalidConfig(
                "flush_interval must be greater than zero".to_string(),
            ));
        }
        if self.commit_timeout.is_some_and(|t| t.is_zero()) {
            return Err(BatchError::InvalidConfig(
                "commit_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            commit_timeout: None,
            on_error: None,
            on_flush: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("max_batch_size", &self.max_batch_size)
            .field("flush_interval", &self.flush_interval)
            .field("commit_timeout", &self.commit_timeout)
            .field("on_error", &self.on_error.is_some())
            .field("on_flush", &self.on_flush.is_some())
            .finish()
    }
}
