//! Progress logging utilities.

use log::info;

use crate::batch::FlushStatsSnapshot;

/// Logs how many input lines have been appended and flushed so far.
///
/// # Arguments
///
/// * `start_time` - When ingestion started
/// * `appended` - Records accepted by the engine
/// * `stats` - Current flush counters
pub fn log_progress(start_time: std::time::Instant, appended: usize, stats: &FlushStatsSnapshot) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        appended as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Appended {} records in {:.2} seconds (~{:.2} records/sec), {} flushed in {} batches",
        appended, elapsed_secs, rate, stats.records_flushed, stats.flushes
    );
}
