//! Shared test helpers for storage and engine tests.
//!
//! Each helper pool lives in its own temporary directory so tests can run in
//! parallel; keep the returned `TempDir` alive for the duration of the test.

use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::storage::StoreOptions;

/// Creates a file-backed test pool with a `test (x, label)` table.
pub async fn create_test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pool = StoreOptions::file(dir.path().join("test.db"))
        .open()
        .await
        .expect("Failed to open test database");
    sqlx::query("CREATE TABLE test (x INTEGER NOT NULL, label TEXT)")
        .execute(&pool)
        .await
        .expect("Failed to create test table");
    (dir, pool)
}

/// Counts rows in the `test` table.
pub async fn count_rows(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM test")
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

/// Returns all rows of the `test` table in insertion order.
pub async fn fetch_rows(pool: &SqlitePool) -> Vec<(i64, Option<String>)> {
    sqlx::query_as("SELECT x, label FROM test ORDER BY rowid")
        .fetch_all(pool)
        .await
        .expect("Failed to fetch rows")
}
