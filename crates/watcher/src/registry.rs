//! Watch set management
//!
//! The notification backend is asked to watch one directory level at a
//! time; recursion over a subtree happens here. The set only grows while
//! the engine runs and is torn down as a whole on close.

use crate::WatchError;
use notify::{RecursiveMode, Watcher as _};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Subscription side of the notification backend
pub trait Subscriber: Send + 'static {
    /// Start delivering events for `path` (one level, non-recursive)
    fn subscribe(&mut self, path: &Path) -> notify::Result<()>;

    /// Stop delivering events for `path`
    fn unsubscribe(&mut self, path: &Path) -> notify::Result<()>;
}

impl Subscriber for notify::RecommendedWatcher {
    fn subscribe(&mut self, path: &Path) -> notify::Result<()> {
        self.watch(path, RecursiveMode::NonRecursive)
    }

    fn unsubscribe(&mut self, path: &Path) -> notify::Result<()> {
        self.unwatch(path)
    }
}

/// Result of registering a subtree
#[derive(Debug, Default)]
pub struct SubtreeReport {
    /// Directories newly added to the watch set
    pub added: usize,
    /// Directories that could not be subscribed
    pub failures: Vec<WatchError>,
}

/// Set of paths subscribed for change notifications
pub struct WatchRegistry<S: Subscriber> {
    subscriber: S,
    watched: BTreeSet<PathBuf>,
}

impl<S: Subscriber> WatchRegistry<S> {
    pub fn new(subscriber: S) -> Self {
        Self {
            subscriber,
            watched: BTreeSet::new(),
        }
    }

    /// Subscribe a single path
    ///
    /// The backend is always asked again: a directory that was deleted and
    /// recreated under the same name has lost its kernel watch even though
    /// it is still in the set. Returns `Ok(false)` if the path was already
    /// a member.
    pub fn add_directory(&mut self, path: &Path) -> Result<bool, WatchError> {
        self.subscriber
            .subscribe(path)
            .map_err(|source| WatchError::new(path, source))?;
        debug!("Watching {}", path.display());
        Ok(self.watched.insert(path.to_path_buf()))
    }

    /// Subscribe `root` and every directory below it
    ///
    /// Failure to register `root` itself is returned as an error. Failures
    /// deeper in the tree are logged, collected in the report, and do not
    /// stop the walk.
    pub fn add_subtree(&mut self, root: &Path) -> Result<SubtreeReport, WatchError> {
        let mut report = SubtreeReport::default();

        if self.add_directory(root)? {
            report.added += 1;
        }

        for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    let err = WatchError::new(&path, notify::Error::io(e.into()));
                    warn!("Failed to enumerate {}: {}", path.display(), err);
                    report.failures.push(err);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            match self.add_directory(entry.path()) {
                Ok(true) => report.added += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push(e);
                }
            }
        }

        Ok(report)
    }

    /// True if `path` is in the watch set
    pub fn is_watched(&self, path: &Path) -> bool {
        self.watched.contains(path)
    }

    /// Number of watched paths
    pub fn len(&self) -> usize {
        self.watched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Watched paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.watched.iter().map(PathBuf::as_path)
    }

    /// Unsubscribe everything and empty the set
    ///
    /// Paths that vanished since they were added commonly fail to
    /// unsubscribe; those failures are only logged at debug level.
    pub fn close(&mut self) {
        for path in std::mem::take(&mut self.watched) {
            if let Err(e) = self.subscriber.unsubscribe(&path) {
                debug!("Failed to unwatch {}: {}", path.display(), e);
            }
        }
    }
}
