//! Tracing setup. The terminal belongs to the UI, so events go to a log file
//! in the configured directory instead of stdout.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "equipment-tracker.log";

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.directory).context("failed to create log directory")?;

    let appender = tracing_appender::rolling::never(&config.directory, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("equipment_tracker={}", config.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}
