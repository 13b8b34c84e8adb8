//! Change propagation state machine
//!
//! The engine owns the watch set and turns each filesystem event into one
//! of: nothing, a new subtree subscription, or a copy of the changed file to
//! its mirrored location. Events are handled one at a time; a failed copy is
//! logged and dropped, never retried.

use crate::event::{EventKind, FsEvent};
use crate::reconcile::catch_up;
use crate::registry::{Subscriber, WatchRegistry};
use crate::WatchError;
use cpw_core::{
    copy_file, copy_tree, create_dir_all, CopyError, CopyOptions, CopyStats, MirrorSettings,
    TargetKind, WatchTarget,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lifecycle of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Built, watch set not registered yet
    Initializing,
    /// Watching a single file
    WatchingSingleFile,
    /// Watching a directory tree
    WatchingDirectoryTree,
    /// Unsubscribed; no further events are acted on
    Closed,
}

/// Why an event caused no action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Kind is neither created nor modified
    Kind(EventKind),
    /// Path is not part of the mirrored source
    OutsideTarget,
    /// Path lies inside a destination nested in the source
    InsideDestination,
    /// Modification of a directory entry
    DirectoryModified,
    /// Neither a regular file nor a directory (fifo, socket, ...)
    NotRegularFile,
    /// Engine already closed
    Closed,
}

/// What processing a single event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    /// Path disappeared before it could be examined
    Vanished,
    /// New directory subscribed (with any files already in it copied)
    DirectoryWatched { added: usize, caught_up: usize },
    Copied { destination: PathBuf, bytes: u64 },
    /// Copy or subscription failed; already logged
    Failed,
}

/// Running totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub events: u64,
    pub ignored: u64,
    pub vanished: u64,
    pub files_copied: u64,
    pub bytes_copied: u64,
    pub failures: u64,
    pub directories_watched: u64,
}

/// Propagation engine for one source/destination pair
pub struct Engine<S: Subscriber> {
    target: WatchTarget,
    dest_root: PathBuf,
    nested_destination: bool,
    options: CopyOptions,
    catch_up_new_directories: bool,
    registry: WatchRegistry<S>,
    state: EngineState,
    stats: MirrorStats,
}

impl<S: Subscriber> Engine<S> {
    pub fn new(
        target: WatchTarget,
        dest_root: PathBuf,
        subscriber: S,
        settings: &MirrorSettings,
    ) -> Self {
        let nested_destination = target.contains_destination(&dest_root);
        Self {
            target,
            dest_root,
            nested_destination,
            options: settings.copy_options(),
            catch_up_new_directories: settings.catch_up_new_directories,
            registry: WatchRegistry::new(subscriber),
            state: EngineState::Initializing,
            stats: MirrorStats::default(),
        }
    }

    /// Register the watch set and enter the steady state
    ///
    /// A directory target subscribes its whole tree; a single file is
    /// subscribed directly rather than through its parent.
    pub fn initialize(&mut self) -> Result<(), WatchError> {
        if self.state != EngineState::Initializing {
            return Ok(());
        }

        match self.target.kind() {
            TargetKind::Directory => {
                let report = self.registry.add_subtree(self.target.root())?;
                self.stats.directories_watched += report.added as u64;
                self.state = EngineState::WatchingDirectoryTree;
                info!(
                    "Watching directory: {} ({} directories)",
                    self.target.root().display(),
                    report.added
                );
            }
            TargetKind::File => {
                self.registry.add_directory(self.target.root())?;
                self.state = EngineState::WatchingSingleFile;
                info!("Watching file: {}", self.target.root().display());
            }
        }

        Ok(())
    }

    /// Handle one event
    pub fn process(&mut self, event: FsEvent) -> Outcome {
        self.stats.events += 1;
        let outcome = self.dispatch(&event);

        match &outcome {
            Outcome::Ignored(_) => self.stats.ignored += 1,
            Outcome::Vanished => self.stats.vanished += 1,
            Outcome::DirectoryWatched { added, caught_up } => {
                self.stats.directories_watched += *added as u64;
                self.stats.files_copied += *caught_up as u64;
            }
            Outcome::Copied { bytes, .. } => {
                self.stats.files_copied += 1;
                self.stats.bytes_copied += bytes;
            }
            Outcome::Failed => self.stats.failures += 1,
        }

        outcome
    }

    fn dispatch(&mut self, event: &FsEvent) -> Outcome {
        if self.state == EngineState::Closed {
            return Outcome::Ignored(IgnoreReason::Closed);
        }

        if !event.kind.is_actionable() {
            debug!("Ignoring {:?} event for {}", event.kind, event.path.display());
            return Outcome::Ignored(IgnoreReason::Kind(event.kind));
        }

        let path = event.path.as_path();

        if self.nested_destination && path.starts_with(&self.dest_root) {
            return Outcome::Ignored(IgnoreReason::InsideDestination);
        }

        let Some(dest_path) = self.target.destination_for(path, &self.dest_root) else {
            debug!("Ignoring event outside {}: {}", self.target.root().display(), path.display());
            return Outcome::Ignored(IgnoreReason::OutsideTarget);
        };

        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                info!("Error accessing changed file {}: {}", path.display(), e);
                return Outcome::Vanished;
            }
        };

        if metadata.is_dir() {
            return match event.kind {
                EventKind::Created if self.target.is_dir() => self.discover_directory(path),
                _ => Outcome::Ignored(IgnoreReason::DirectoryModified),
            };
        }

        if !metadata.is_file() {
            debug!("Ignoring non-regular file {}", path.display());
            return Outcome::Ignored(IgnoreReason::NotRegularFile);
        }

        match self.copy_one(path, &dest_path) {
            Ok(bytes) => {
                info!("Copied {} to {}", path.display(), dest_path.display());
                Outcome::Copied {
                    destination: dest_path,
                    bytes,
                }
            }
            Err(e) => {
                warn!("Error copying {} to {}: {}", path.display(), dest_path.display(), e);
                Outcome::Failed
            }
        }
    }

    fn discover_directory(&mut self, dir: &Path) -> Outcome {
        let report = match self.registry.add_subtree(dir) {
            Ok(report) => report,
            Err(e) => {
                warn!("{}", e);
                return Outcome::Failed;
            }
        };
        debug!("Discovered {} ({} new directories)", dir.display(), report.added);

        let caught_up = if self.catch_up_new_directories {
            let totals = catch_up(dir, &self.target, &self.dest_root, &self.options);
            self.stats.failures += totals.failed as u64;
            self.stats.bytes_copied += totals.bytes;
            totals.copied
        } else {
            0
        };

        Outcome::DirectoryWatched {
            added: report.added,
            caught_up,
        }
    }

    fn copy_one(&self, src: &Path, dst: &Path) -> Result<u64, CopyError> {
        if let Some(parent) = dst.parent() {
            create_dir_all(parent, &self.options)?;
        }
        copy_file(src, dst, &self.options)
    }

    /// Unsubscribe the watch set; later events are ignored
    pub fn close(&mut self) {
        if self.state == EngineState::Closed {
            return;
        }
        self.registry.close();
        self.state = EngineState::Closed;
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn stats(&self) -> MirrorStats {
        self.stats
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn registry(&self) -> &WatchRegistry<S> {
        &self.registry
    }
}

/// Replicate the whole source once
///
/// A directory is copied with [`copy_tree`] (stops at the first error); a
/// single file is copied to its mapped location.
pub fn initial_copy(
    target: &WatchTarget,
    dest_root: &Path,
    options: &CopyOptions,
) -> Result<CopyStats, CopyError> {
    match target.kind() {
        TargetKind::Directory => copy_tree(target.root(), dest_root, options),
        TargetKind::File => {
            let mut stats = CopyStats::default();
            if let Some(dest_path) = target.destination_for(target.root(), dest_root) {
                create_dir_all(dest_root, options)?;
                stats.bytes = copy_file(target.root(), &dest_path, options)?;
                stats.files = 1;
            }
            Ok(stats)
        }
    }
}
