//! Filesystem events as seen by the propagation engine
//!
//! The notification backend reports rich, platform-flavoured event kinds.
//! The engine only needs to know whether a path appeared, changed, or
//! something it does not act on happened, so raw events are flattened into
//! one [`FsEvent`] per affected path.

use notify::event::{ModifyKind, RenameMode};
use std::path::PathBuf;

/// Kind of change reported for a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Path now exists (new file or directory, or moved into the tree)
    Created,
    /// File content changed
    Modified,
    /// Path was deleted
    Removed,
    /// Path was moved away or renamed from
    Renamed,
    /// Anything else (access, metadata, backend notices)
    Other,
}

impl EventKind {
    /// True for the kinds that can cause a copy or a new watch
    pub fn is_actionable(&self) -> bool {
        matches!(self, EventKind::Created | EventKind::Modified)
    }
}

/// A single-path filesystem event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    /// Path that changed
    pub path: PathBuf,
    /// Type of change
    pub kind: EventKind,
}

impl FsEvent {
    pub fn new(path: impl Into<PathBuf>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Flatten a backend event into per-path events
///
/// A `Both` rename carries `[from, to]`: the source side is reported as
/// renamed and the destination side as created.
pub fn translate(event: notify::Event) -> Vec<FsEvent> {
    use notify::EventKind as Raw;

    if let Raw::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind {
        return event
            .paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| {
                let kind = if i == 0 {
                    EventKind::Renamed
                } else {
                    EventKind::Created
                };
                FsEvent::new(path, kind)
            })
            .collect();
    }

    let kind = match event.kind {
        Raw::Create(_) => EventKind::Created,
        Raw::Modify(ModifyKind::Name(RenameMode::To)) => EventKind::Created,
        Raw::Modify(ModifyKind::Name(_)) => EventKind::Renamed,
        Raw::Modify(ModifyKind::Metadata(_)) => EventKind::Other,
        Raw::Modify(_) => EventKind::Modified,
        Raw::Remove(_) => EventKind::Removed,
        Raw::Access(_) | Raw::Any | Raw::Other => EventKind::Other,
    };

    event
        .paths
        .into_iter()
        .map(|path| FsEvent::new(path, kind))
        .collect()
}
