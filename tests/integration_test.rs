//! End-to-end tests of the batch engine against a real SQLite database.

mod helpers;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use batch_insert::{record, BatchConfig, BatchError, BatchInsert};
use helpers::{create_test_store, sorted_ids};

const INSERT_SQL: &str = "INSERT INTO test (x, producer) VALUES (?, ?)";

#[tokio::test]
async fn test_every_appended_record_is_written_once() {
    let (_dir, _store, pool) = create_test_store().await;
    let flushed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&flushed);
    let config = BatchConfig::default()
        .with_max_batch_size(64)
        .with_flush_interval(Duration::from_secs(10))
        .with_flush_handler(move |report| sink.lock().unwrap().push(report.records));

    let engine = BatchInsert::with_pool(pool.clone(), INSERT_SQL, config).unwrap();
    for i in 0..1_000i64 {
        engine.append(record![i, 0]).unwrap();
        if i % 100 == 0 {
            tokio::task::yield_now().await;
        }
    }
    engine.close().await.unwrap();

    assert_eq!(sorted_ids(&pool).await, (0..1_000).collect::<Vec<i64>>());
    let sizes = flushed.lock().unwrap().clone();
    assert_eq!(sizes.iter().sum::<usize>(), 1_000);
    assert_eq!(engine.stats().records_flushed, 1_000);
    assert_eq!(engine.stats().flushes as usize, sizes.len());
}

#[tokio::test]
async fn test_size_threshold_flushes_before_interval() {
    let (_dir, _store, pool) = create_test_store().await;
    let config = BatchConfig::default()
        .with_max_batch_size(3)
        .with_flush_interval(Duration::from_secs(10));
    let engine = BatchInsert::with_pool(pool.clone(), INSERT_SQL, config).unwrap();

    let start = Instant::now();
    engine.append(record![1, 0]).unwrap();
    engine.append(record![2, 0]).unwrap();
    engine.append(record![3, 0]).unwrap();

    while engine.stats().flushes == 0 {
        assert!(start.elapsed() < Duration::from_secs(2), "threshold flush never ran");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(sorted_ids(&pool).await, vec![1, 2, 3]);
    engine.close().await.unwrap();
    assert_eq!(engine.stats().flushes, 1);
}

#[tokio::test]
async fn test_interval_flushes_partial_batch() {
    let (_dir, _store, pool) = create_test_store().await;
    let config = BatchConfig::default()
        .with_max_batch_size(1_000)
        .with_flush_interval(Duration::from_millis(100));
    let engine = BatchInsert::with_pool(pool.clone(), INSERT_SQL, config).unwrap();

    engine.append(record![10, 0]).unwrap();
    engine.append(record![11, 0]).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(engine.stats().flushes, 1);
    assert_eq!(sorted_ids(&pool).await, vec![10, 11]);
    engine.close().await.unwrap();
}

#[tokio::test]
async fn test_close_drains_before_returning() {
    let (_dir, _store, pool) = create_test_store().await;
    let config = BatchConfig::default().with_flush_interval(Duration::from_secs(60));
    let engine = BatchInsert::with_pool(pool.clone(), INSERT_SQL, config).unwrap();

    for i in 0..7 {
        engine.append(record![i, 0]).unwrap();
    }
    engine.close().await.unwrap();

    assert_eq!(sorted_ids(&pool).await, (0..7).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_append_after_close_is_rejected() {
    let (_dir, _store, pool) = create_test_store().await;
    let engine = BatchInsert::with_pool(pool.clone(), INSERT_SQL, BatchConfig::default()).unwrap();
    engine.append(record![1, 0]).unwrap();
    engine.close().await.unwrap();

    assert!(matches!(
        engine.append(record![2, 0]),
        Err(BatchError::EngineClosed)
    ));
    engine.close().await.unwrap();

    assert_eq!(sorted_ids(&pool).await, vec![1]);
}

#[tokio::test]
async fn test_failed_batch_is_dropped_and_engine_recovers() {
    let (_dir, _store, pool) = create_test_store().await;
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    let config = BatchConfig::default()
        .with_max_batch_size(2)
        .with_flush_interval(Duration::from_secs(10))
        .with_error_handler(move |failure| sink.lock().unwrap().push(failure.records));
    let engine = BatchInsert::with_pool(pool.clone(), INSERT_SQL, config).unwrap();

    // x is NOT NULL: the whole first batch rolls back
    engine.append(record![1, 0]).unwrap();
    engine.append(record![None::<i64>, 0]).unwrap();
    while engine.stats().failed_flushes == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    engine.append(record![3, 0]).unwrap();
    engine.close().await.unwrap();

    assert_eq!(*failures.lock().unwrap(), vec![2]);
    assert_eq!(sorted_ids(&pool).await, vec![3]);
    let stats = engine.stats();
    assert_eq!(stats.records_dropped, 2);
    assert_eq!(stats.records_flushed, 1);
}

#[tokio::test]
async fn test_connect_opens_and_closes_its_own_pool() {
    let (_dir, store, pool) = create_test_store().await;
    pool.close().await;

    let engine = BatchInsert::connect(&store, INSERT_SQL, BatchConfig::default())
        .await
        .unwrap();
    engine.append(record![42, 1]).unwrap();
    engine.close().await.unwrap();
    assert!(engine.pool().is_closed());

    let check = store.open().await.unwrap();
    assert_eq!(sorted_ids(&check).await, vec![42]);
    check.close().await;
}
