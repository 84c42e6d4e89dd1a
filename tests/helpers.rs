// Shared test helpers for database setup and engine assertions.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::sync::Mutex;

use batch_insert::{BatchCommitter, DatabaseError, Record, StoreOptions};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Creates a file-backed database with a `test (x, producer)` table.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store() -> (TempDir, StoreOptions, SqlitePool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = StoreOptions::file(dir.path().join("rows.db"));
    let pool = store.open().await.expect("Failed to open test database");
    sqlx::query("CREATE TABLE test (x INTEGER NOT NULL, producer INTEGER)")
        .execute(&pool)
        .await
        .expect("Failed to create test table");
    (dir, store, pool)
}

/// Returns the `x` column of every row, sorted.
#[allow(dead_code)]
pub async fn sorted_ids(pool: &SqlitePool) -> Vec<i64> {
    let mut ids: Vec<i64> = sqlx::query_scalar("SELECT x FROM test")
        .fetch_all(pool)
        .await
        .expect("Failed to fetch ids");
    ids.sort_unstable();
    ids
}

/// Committer that keeps every batch it receives in memory.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryCommitter {
    pub batches: Mutex<Vec<Vec<Record>>>,
}

impl MemoryCommitter {
    #[allow(dead_code)]
    pub fn batches(&self) -> Vec<Vec<Record>> {
        self.batches.lock().unwrap().clone()
    }
}

impl BatchCommitter for MemoryCommitter {
    async fn commit_batch(&self, batch: &[Record]) -> Result<(), DatabaseError> {
        self.batches.lock().unwrap().push(batch.to_vec());
        Ok(())
    }
}
