//! Change propagation for cpw
//!
//! This crate provides:
//! - Translation of notification backend events into per-path events
//! - The watch set, grown one subtree at a time as directories appear
//! - The propagation engine that maps events to copies
//! - A background event loop with a shutdown handle

pub mod engine;
pub mod event;
pub mod mirror;
pub mod reconcile;
pub mod registry;

use std::path::{Path, PathBuf};
use thiserror::Error;

// Re-exports
pub use engine::{initial_copy, Engine, EngineState, IgnoreReason, MirrorStats, Outcome};
pub use event::{translate, EventKind, FsEvent};
pub use mirror::Mirror;
pub use registry::{Subscriber, SubtreeReport, WatchRegistry};

/// A path could not be subscribed for notifications
#[derive(Debug, Error)]
#[error("failed to watch {}: {source}", path.display())]
pub struct WatchError {
    path: PathBuf,
    #[source]
    source: notify::Error,
}

impl WatchError {
    pub fn new(path: &Path, source: notify::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path that failed to subscribe
    pub fn path(&self) -> &Path {
        &self.path
    }
}
