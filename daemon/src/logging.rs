//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LogFormat, LoggingConfig};

/// Application-specific environment variable for log filtering (overrides config).
pub const LOG_ENV_VAR: &str = "WYOMING_WHISPER_LOG";

/// Install the global subscriber.
///
/// The returned guard flushes the log file on drop and must be held for the
/// lifetime of the process.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if config.file {
        let log_path =
            wyoming_whisper_common::dirs::log_path().context("Failed to determine log path")?;
        let log_dir = log_path.parent().context("Log path has no parent")?;
        let log_filename = log_path.file_name().context("Log path has no file name")?;

        let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        (BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (BoxMakeWriter::new(std::io::stderr), None)
    };
    let ansi = guard.is_none();

    // WYOMING_WHISPER_LOG env var overrides config file level
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(config.level.as_directive().parse()?)
        .from_env()?;

    let (full, compact) = match config.format {
        LogFormat::Full => (
            Some(fmt::layer().with_writer(writer).with_ansi(ansi)),
            None,
        ),
        LogFormat::Compact => (
            None,
            Some(fmt::layer().compact().with_writer(writer).with_ansi(ansi)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(full)
        .with(compact)
        .init();

    // Route whisper.cpp and GGML logs through tracing
    whisper_rs::install_logging_hooks();

    Ok(guard)
}
