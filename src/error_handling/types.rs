//! Error type definitions.
//!
//! This module defines the errors surfaced by the engine, the backing store,
//! and application initialization.

use std::time::Duration;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for backing store operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// The commit did not finish before the configured deadline.
    ///
    /// The transaction is dropped, which rolls it back.
    #[error("Commit timed out after {0:?}")]
    CommitTimeout(Duration),
}

/// Errors returned synchronously by the batch engine.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The engine has been closed and no longer accepts records.
    #[error("batch insert is closed")]
    EngineClosed,

    /// The engine configuration was rejected at construction.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The backing store could not be opened.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// The flusher task panicked or was aborted before draining.
    #[error("Flusher task failed: {0}")]
    FlusherJoin(#[from] tokio::task::JoinError),
}

impl From<sqlx::Error> for BatchError {
    fn from(e: sqlx::Error) -> Self {
        BatchError::Database(DatabaseError::SqlError(e))
    }
}
