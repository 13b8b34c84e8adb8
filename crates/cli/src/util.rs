//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use watcher::MirrorStats;

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// One-line summary of a mirror session
pub fn summarize(stats: &MirrorStats) -> String {
    format!(
        "{} events, {} files copied ({}), {} failed, {} directories watched",
        stats.events,
        stats.files_copied,
        format_size(stats.bytes_copied),
        stats.failures,
        stats.directories_watched
    )
}

/// Wait for Ctrl+C or, on unix, SIGTERM; returns the signal's name
pub async fn shutdown_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;

        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res.context("Failed to listen for Ctrl+C")?;
                Ok("interrupt")
            }
            _ = terminate.recv() => Ok("terminate"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
        Ok("interrupt")
    }
}
