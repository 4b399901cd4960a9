use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use wahlomat_infrastructure::WahlomatPaths;

const LOG_FILE_PREFIX: &str = "wahlomat.log";

/// Installs the global subscriber writing to a daily rolling file.
///
/// Logs never go to the terminal so they can't interleave with the REPL. The level
/// defaults to `info` and can be overridden with `RUST_LOG`.
///
/// # Returns
///
/// The appender guard; it must live until shutdown so buffered lines get flushed.
pub fn init() -> Result<WorkerGuard> {
    let logs_dir = WahlomatPaths::logs_dir()?;
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(guard)
}
