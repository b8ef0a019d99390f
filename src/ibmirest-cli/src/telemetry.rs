//! Logging setup for the command-line client
//!
//! - Human-readable console output on stderr, so stdout carries only results
//! - Optional JSON log file with size and daily rotation (10MB per file)

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize tracing. When `log_dir` is given, JSON logs are also written
/// there.
///
/// Returns a guard that must be kept alive to ensure file logs are flushed
pub fn init_telemetry(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ibmirest=info,ibmirest_rs=warn,ibmirest_core=warn"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;

            // Format: ibmirest.log.2026-02-04, rotated at 10MB or daily
            let file_appender = RollingFileAppender::new(
                dir.join("ibmirest.log"),
                RollingConditionBasic::new()
                    .daily()
                    .max_size(10 * 1024 * 1024),
                9,
            )?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true);

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::debug!("File logging enabled in {:?}", dir);
    }

    Ok(guard)
}
