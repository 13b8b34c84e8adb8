//! Error taxonomy for copy, startup and configuration failures

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while replicating a file or tree
#[derive(Debug, Error)]
pub enum CopyError {
    /// Source could not be opened or read (often a benign race with deletion)
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Destination could not be created or written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory enumeration failed while walking the source tree
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl CopyError {
    /// Path the failure refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            CopyError::Read { path, .. }
            | CopyError::Write { path, .. }
            | CopyError::Walk { path, .. } => path,
        }
    }

    /// True when the source side failed (read or walk)
    pub fn is_source_side(&self) -> bool {
        matches!(self, CopyError::Read { .. } | CopyError::Walk { .. })
    }
}

/// Fatal problems detected before the event loop starts
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("error accessing source {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error accessing destination {}: {source}", path.display())]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error creating destination directory {}: {source}", path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("source {} is a {source_kind} but destination {} is not a directory", source_path.display(), destination.display())]
    TypeMismatch {
        source_path: PathBuf,
        source_kind: &'static str,
        destination: PathBuf,
    },

    #[error("source {} would be mirrored onto itself", path.display())]
    SameLocation { path: PathBuf },
}

/// Configuration file problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
