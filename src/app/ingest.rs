//! JSON-lines ingestion.
//!
//! Reads one JSON array per line, appends each as a record, and closes the
//! engine so every accepted record is flushed before the report is built.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::app::logging::log_progress;
use crate::batch::{BatchInsert, FlushStatsSnapshot};
use crate::config::{Opt, PROGRESS_LOG_INTERVAL};
use crate::storage::{BatchCommitter, Record};

/// Outcome of an ingest run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Non-blank input lines read
    pub lines: usize,
    /// Records accepted by the engine
    pub appended: usize,
    /// Lines skipped because they were not a JSON array of scalars
    pub malformed: usize,
    /// Flush counters after the engine closed
    pub stats: FlushStatsSnapshot,
    pub db_path: PathBuf,
    pub elapsed_seconds: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LineCounts {
    lines: usize,
    appended: usize,
    malformed: usize,
}

/// Streams the input named by `opt` into the database.
///
/// The optional schema statement runs before the engine starts. The engine is
/// closed even when reading the input fails, so records already appended are
/// still flushed.
pub async fn run_ingest(opt: Opt) -> Result<IngestReport> {
    let start_time = Instant::now();

    let pool = opt
        .store_options()
        .open()
        .await
        .with_context(|| format!("Failed to open database {}", opt.db_path.display()))?;

    if let Some(schema) = &opt.schema {
        sqlx::query(schema)
            .execute(&pool)
            .await
            .context("Failed to execute schema statement")?;
    }

    let engine = BatchInsert::with_pool(pool.clone(), opt.sql.as_str(), opt.batch_config())
        .context("Failed to start batch engine")?;

    let result = match &opt.file {
        Some(path) => match tokio::fs::File::open(path).await {
            Ok(file) => ingest_lines(&engine, BufReader::new(file), start_time).await,
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to open input file {}", path.display()))),
        },
        None => ingest_lines(&engine, BufReader::new(tokio::io::stdin()), start_time).await,
    };

    engine.close().await.context("Failed to drain batch engine")?;
    pool.close().await;
    let counts = result?;

    let stats = engine.stats();
    info!(
        "Ingest finished: {} flushed, {} dropped, {} malformed lines",
        stats.records_flushed, stats.records_dropped, counts.malformed
    );

    Ok(IngestReport {
        lines: counts.lines,
        appended: counts.appended,
        malformed: counts.malformed,
        stats,
        db_path: opt.db_path,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}

async fn ingest_lines<C, R>(
    engine: &BatchInsert<C>,
    reader: R,
    start_time: Instant,
) -> Result<LineCounts>
where
    C: BatchCommitter,
    R: AsyncBufRead + Unpin,
{
    let mut counts = LineCounts::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        counts.lines += 1;

        match serde_json::from_str::<Record>(line) {
            Ok(record) => {
                engine.append(record)?;
                counts.appended += 1;
            }
            Err(e) => {
                warn!("Skipping malformed line {}: {}", counts.lines, e);
                counts.malformed += 1;
            }
        }

        if counts.lines % PROGRESS_LOG_INTERVAL == 0 {
            log_progress(start_time, counts.appended, &engine.stats());
        }
    }

    Ok(counts)
}
