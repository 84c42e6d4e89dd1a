//! Concurrency tests: many producers, one flusher.
//!
//! Every accepted append must show up in exactly one committed batch, including
//! appends racing with `close`.

mod helpers;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use batch_insert::{record, BatchConfig, BatchError, BatchInsert, Value};
use helpers::{create_test_store, sorted_ids, MemoryCommitter};

const PRODUCERS: i64 = 8;
const PER_PRODUCER: i64 = 2_500;

fn ids(batches: &[Vec<batch_insert::Record>]) -> Vec<i64> {
    batches
        .iter()
        .flatten()
        .map(|r| match r.fields()[0] {
            Value::Integer(v) => v,
            ref other => panic!("unexpected field {:?}", other),
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_lose_and_duplicate_nothing() {
    let config = BatchConfig::default()
        .with_max_batch_size(100)
        .with_flush_interval(Duration::from_millis(5));
    let engine = Arc::new(BatchInsert::new(MemoryCommitter::default(), config).unwrap());

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let engine = Arc::clone(&engine);
            tokio::task::spawn_blocking(move || {
                for i in 0..PER_PRODUCER {
                    engine.append(record![p * PER_PRODUCER + i, p]).unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }
    engine.close().await.unwrap();

    let batches = engine.committer().batches();
    assert!(batches.iter().all(|b| !b.is_empty()));
    let mut all = ids(&batches);
    let unique: HashSet<i64> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len(), "a record was committed twice");
    all.sort_unstable();
    assert_eq!(all, (0..PRODUCERS * PER_PRODUCER).collect::<Vec<i64>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_appends_racing_close_are_flushed_or_rejected() {
    let config = BatchConfig::default()
        .with_max_batch_size(50)
        .with_flush_interval(Duration::from_millis(10));
    let engine = Arc::new(BatchInsert::new(MemoryCommitter::default(), config).unwrap());
    let accepted = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let engine = Arc::clone(&engine);
            let accepted = Arc::clone(&accepted);
            tokio::task::spawn_blocking(move || {
                let mut i = 0i64;
                loop {
                    match engine.append(record![p * 1_000_000 + i, p]) {
                        Ok(()) => {
                            accepted.fetch_add(1, Ordering::SeqCst);
                            i += 1;
                            if i % 100 == 0 {
                                std::thread::sleep(Duration::from_micros(100));
                            }
                        }
                        Err(BatchError::EngineClosed) => break,
                        Err(e) => panic!("unexpected append error: {e}"),
                    }
                }
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(50)).await;
    engine.close().await.unwrap();
    for producer in producers {
        producer.await.unwrap();
    }

    let committed = ids(&engine.committer().batches());
    let unique: HashSet<i64> = committed.iter().copied().collect();
    assert_eq!(unique.len(), committed.len());
    assert_eq!(committed.len(), accepted.load(Ordering::SeqCst));
    assert_eq!(engine.len(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_against_sqlite() {
    let (_dir, _store, pool) = create_test_store().await;
    let config = BatchConfig::default()
        .with_max_batch_size(250)
        .with_flush_interval(Duration::from_millis(20));
    let engine = Arc::new(
        BatchInsert::with_pool(pool.clone(), "INSERT INTO test (x, producer) VALUES (?, ?)", config)
            .unwrap(),
    );

    let producers: Vec<_> = (0..4i64)
        .map(|p| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                for i in 0..500i64 {
                    engine.append(record![p * 500 + i, p]).unwrap();
                    if i % 50 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }
    engine.close().await.unwrap();

    assert_eq!(sorted_ids(&pool).await, (0..2_000).collect::<Vec<i64>>());
    assert_eq!(engine.stats().records_dropped, 0);
}
