//! Transactional batch commits.
//!
//! The flusher only depends on [`BatchCommitter`]: "write this batch as one
//! all-or-nothing operation". [`SqliteCommitter`] implements it on a sqlx
//! SQLite pool.

use std::future::Future;

use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::storage::record::{Record, Value};

/// Writes a batch to a backing store as a single transaction.
///
/// Implementations must be all-or-nothing: on `Err`, none of the batch's
/// records may be visible in the store. The flusher calls `commit_batch`
/// sequentially, never concurrently.
pub trait BatchCommitter: Send + Sync + 'static {
    /// Commits every record of `batch`, in order, or none of them.
    fn commit_batch(
        &self,
        batch: &[Record],
    ) -> impl Future<Output = Result<(), DatabaseError>> + Send;

    /// Releases the store handle once the final flush has completed.
    ///
    /// The default does nothing, for handles owned by someone else.
    fn close(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

/// Commits batches by executing one parameterized statement per record
/// inside a single SQLite transaction.
#[derive(Debug, Clone)]
pub struct SqliteCommitter {
    pool: SqlitePool,
    insert_sql: String,
    owns_pool: bool,
}

impl SqliteCommitter {
    /// Wraps a pool owned by the caller. [`BatchCommitter::close`] leaves it open.
    pub fn new(pool: SqlitePool, insert_sql: impl Into<String>) -> Self {
        SqliteCommitter {
            pool,
            insert_sql: insert_sql.into(),
            owns_pool: false,
        }
    }

    /// Wraps a pool the committer owns and closes on shutdown.
    pub(crate) fn owning(pool: SqlitePool, insert_sql: impl Into<String>) -> Self {
        SqliteCommitter {
            owns_pool: true,
            ..SqliteCommitter::new(pool, insert_sql)
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }
}

impl BatchCommitter for SqliteCommitter {
    async fn commit_batch(&self, batch: &[Record]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::SqlError)?;

        // Every execution runs on the transaction's connection, so sqlx prepares
        // the statement once and reuses the cached handle for the rest of the batch.
        for (index, record) in batch.iter().enumerate() {
            let query = bind_record(sqlx::query(&self.insert_sql), record);
            if let Err(e) = query.execute(&mut *tx).await {
                log::debug!(
                    "Record {} of {} failed, rolling back batch: {}",
                    index + 1,
                    batch.len(),
                    e
                );
                if let Err(rollback_err) = tx.rollback().await {
                    log::warn!("Failed to roll back batch transaction: {}", rollback_err);
                }
                return Err(DatabaseError::SqlError(e));
            }
        }

        tx.commit().await.map_err(DatabaseError::SqlError)?;
        Ok(())
    }

    async fn close(&self) {
        if self.owns_pool {
            self.pool.close().await;
            log::info!("Backing store pool closed");
        }
    }
}

/// Binds each field of `record` to the next statement placeholder.
fn bind_record<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    record: &'q Record,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in record.fields() {
        query = match value {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(v) => query.bind(*v),
            Value::Integer(v) => query.bind(*v),
            Value::Real(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
            Value::Blob(v) => query.bind(v.as_slice()),
        };
    }
    query
}
