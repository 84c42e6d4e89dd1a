//! Logger initialization for the CLI and for embedding applications.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Installs a global `env_logger` at `level` in the given `format`.
///
/// `LogFormat::Plain` writes one line per event: a dimmed local timestamp
/// with milliseconds, the level colored by severity, the target in cyan, then
/// the message. `LogFormat::Json` writes one object per line with `ts` (Unix
/// milliseconds, UTC), `level`, `target` and `msg` keys.
///
/// `RUST_LOG` directives are honored for other modules, but `level` wins for
/// this crate and as the default. `sqlx` is capped at `warn` because it logs
/// each executed statement, which for a batch means one line per record.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a global logger is already
/// installed.
///
/// # Examples
///
/// ```bash
/// batch_insert rows.jsonl --sql "INSERT INTO t VALUES (?)" --log-level debug
/// batch_insert rows.jsonl --sql "..." --log-format json 2> flushes.jsonl
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    // Read from RUST_LOG environment variable first, then override with CLI arg
    let mut builder = env_logger::Builder::from_default_env();

    // Override with CLI-provided level (takes precedence over RUST_LOG)
    builder.filter_level(level);
    // sqlx logs every statement at info; one line per buffered record is noise
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.filter_module("batch_insert", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red().bold(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {:>5} {} {}",
                    chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
                    colored_level,
                    record.target().cyan(),
                    record.args()
                )
            });
        }
    }

    // try_init() so a second initialization (tests, embedding apps) is an error, not a panic
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
