//! Watch targets and the source → destination path mapping

use std::io;
use std::path::{Path, PathBuf};

/// What kind of filesystem object is being mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A single regular file
    File,
    /// A directory tree
    Directory,
}

impl TargetKind {
    /// Human-readable name used in log and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::File => "file",
            TargetKind::Directory => "directory",
        }
    }
}

/// Root of the mirrored source
///
/// Immutable once built. The root is stored as an absolute path so that
/// paths reported by the notification backend share its prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    root: PathBuf,
    kind: TargetKind,
}

impl WatchTarget {
    /// Build a target from an already-resolved root
    pub fn new(root: impl Into<PathBuf>, kind: TargetKind) -> Self {
        Self {
            root: root.into(),
            kind,
        }
    }

    /// Stat and canonicalize `path` into a target
    pub fn resolve(path: &Path) -> io::Result<Self> {
        let root = path.canonicalize()?;
        let metadata = std::fs::metadata(&root)?;
        let kind = if metadata.is_dir() {
            TargetKind::Directory
        } else {
            TargetKind::File
        };
        Ok(Self { root, kind })
    }

    /// Absolute source root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Kind of the source root
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// True when the source is a directory tree
    pub fn is_dir(&self) -> bool {
        self.kind == TargetKind::Directory
    }

    /// True when `dest_root` lies strictly inside this directory target
    pub fn contains_destination(&self, dest_root: &Path) -> bool {
        self.is_dir() && is_strictly_inside(dest_root, &self.root)
    }

    /// Map a source path to its destination
    ///
    /// For a directory target the path keeps its location relative to the
    /// root. For a single-file target only the base name survives. Returns
    /// `None` for paths that do not belong to this target.
    pub fn destination_for(&self, path: &Path, dest_root: &Path) -> Option<PathBuf> {
        match self.kind {
            TargetKind::Directory => {
                let relative = path.strip_prefix(&self.root).ok()?;
                Some(dest_root.join(relative))
            }
            TargetKind::File => {
                if path != self.root {
                    return None;
                }
                Some(dest_root.join(path.file_name()?))
            }
        }
    }
}

/// `path` is below `root` and not `root` itself (component-wise)
pub fn is_strictly_inside(path: &Path, root: &Path) -> bool {
    path != root && path.starts_with(root)
}
