//! Tracing subscriber setup

use crate::args::Verbosity;
use anyhow::{anyhow, Context, Result};
use cpw_core::LogConfig;
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Pick the log level: flags override the config file
pub fn level_for(config: &LogConfig, verbosity: Verbosity) -> Result<Level> {
    match verbosity {
        Verbosity::Verbose => Ok(Level::DEBUG),
        Verbosity::Quiet => Ok(Level::WARN),
        Verbosity::Normal => Level::from_str(&config.level)
            .map_err(|_| anyhow!("Invalid log level '{}'", config.level)),
    }
}

/// Install the global subscriber
///
/// With `log.file` set, output goes through a non-blocking file writer; the
/// returned guard must be held until exit so buffered lines are flushed.
pub fn init(config: &LogConfig, verbosity: Verbosity) -> Result<Option<WorkerGuard>> {
    let level = level_for(config, verbosity)?;

    let Some(file) = &config.file else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;
        return Ok(None);
    };

    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    let name = file
        .file_name()
        .with_context(|| format!("Log file {} has no file name", file.display()))?;

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy().into_owned())
        .build(&dir)
        .with_context(|| format!("Failed to open log file {}", file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(Some(guard))
}
