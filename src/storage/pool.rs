//! Backing store connection management.
//!
//! This module opens the SQLite connection pool used by engines built with
//! `BatchInsert::connect`:
//! - WAL mode enabled for file-backed stores
//! - Connection limits and timeouts
//! - Automatic database file and parent directory creation
//! - A ping before the pool is handed out, so an unreachable store fails construction

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_BUSY_TIMEOUT, DEFAULT_MAX_CONNECTIONS};
use crate::error_handling::DatabaseError;

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A database file on disk
    File(PathBuf),
    /// A private in-memory database shared by the pool's connections
    Memory,
}

/// Connection settings for the SQLite backing store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub location: StoreLocation,
    /// Create the database file (and its parent directory) if it is missing
    pub create_if_missing: bool,
    /// Open read-only; every flush will fail, useful only for diagnostics
    pub read_only: bool,
    /// Use the WAL journal for file-backed databases
    pub wal: bool,
    /// How long SQLite retries a locked database before failing a statement
    pub busy_timeout: Duration,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// How long to wait for a free connection
    pub acquire_timeout: Duration,
}

impl StoreOptions {
    /// Options for a database file, created on first use.
    pub fn file(path: impl AsRef<Path>) -> Self {
        StoreOptions {
            location: StoreLocation::File(path.as_ref().to_path_buf()),
            create_if_missing: true,
            read_only: false,
            wal: true,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Options for an in-memory database that lives as long as the pool.
    pub fn memory() -> Self {
        StoreOptions {
            location: StoreLocation::Memory,
            wal: false,
            ..StoreOptions::file("")
        }
    }

    /// Renders a connection URL for these options, for log lines.
    ///
    /// The path is shown as given and is not escaped, so the result is not
    /// reparsed; [`StoreOptions::open`] builds its connect options from the
    /// path directly.
    pub fn connection_url(&self) -> String {
        match &self.location {
            StoreLocation::Memory => "sqlite::memory:".to_string(),
            StoreLocation::File(path) => {
                let mode = if self.read_only {
                    "ro"
                } else if self.create_if_missing {
                    "rwc"
                } else {
                    "rw"
                };
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("mode", mode)
                    .finish();
                format!("sqlite://{}?{}", path.display(), query)
            }
        }
    }

    /// Opens and pings the pool.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::FileCreationError` if the parent directory cannot
    /// be created, or `DatabaseError::SqlError` if the store cannot be reached.
    /// A pool whose ping fails is closed before returning.
    pub async fn open(&self) -> Result<SqlitePool, DatabaseError> {
        if let StoreLocation::File(path) = &self.location {
            if self.create_if_missing {
                ensure_parent_dir(path)?;
            }
        }

        info!("Opening backing store {}", self.connection_url());

        let connect_options = self.connect_options()?.busy_timeout(self.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                error!("Failed to connect to backing store: {e}");
                DatabaseError::SqlError(e)
            })?;

        if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
            error!("Backing store ping failed: {e}");
            pool.close().await;
            return Err(DatabaseError::SqlError(e));
        }

        Ok(pool)
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, DatabaseError> {
        match &self.location {
            StoreLocation::Memory => {
                SqliteConnectOptions::from_str("sqlite::memory:").map_err(DatabaseError::SqlError)
            }
            // Set the filename directly: a URL would treat `%`, `?` and `#` in the path as syntax
            StoreLocation::File(path) => {
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(self.create_if_missing && !self.read_only)
                    .read_only(self.read_only);
                Ok(if self.wal && !self.read_only {
                    options.journal_mode(SqliteJournalMode::Wal)
                } else {
                    options
                })
            }
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), DatabaseError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create database directory {}: {e}", parent.display());
                DatabaseError::FileCreationError(e.to_string())
            })
        }
        _ => Ok(()),
    }
}
