//! Mirror a source into a destination until interrupted

use crate::cmd::version::VERSION;
use crate::util;
use anyhow::{anyhow, bail, Result};
use cpw_core::MirrorConfig;
use std::path::Path;
use tracing::{info, warn};
use watcher::Mirror;

/// Why the foreground wait ended
#[derive(Debug)]
enum Stop {
    Signal(&'static str),
    LoopExited,
}

pub async fn run(source: &Path, destination: &Path, config: &MirrorConfig) -> Result<()> {
    let options = config.mirror.copy_options();
    let pair = cpw_core::prepare(source, destination, &options)?;

    let mut mirror = Mirror::start(pair.target, pair.destination, &config.mirror)
        .map_err(|e| anyhow!("Error creating watcher: {}", e))?;

    if let Err(e) = mirror.initial_copy() {
        warn!("Initial copy had errors: {}", e);
    }

    println!(
        "CPW {} | File watcher started. Press Ctrl+C to stop.",
        VERSION
    );

    let stop = tokio::select! {
        signal = util::shutdown_signal() => Stop::Signal(signal?),
        _ = mirror.closed() => Stop::LoopExited,
    };

    let stats = mirror.close().await;
    info!("Stopped: {}", util::summarize(&stats));

    match stop {
        Stop::Signal(name) => {
            info!("Received {} signal, shutting down", name);
            Ok(())
        }
        Stop::LoopExited => bail!("File notification stream closed unexpectedly"),
    }
}
