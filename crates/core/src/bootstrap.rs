//! Startup validation of the source/destination pair

use crate::copy::{make_dirs, CopyOptions};
use crate::error::StartupError;
use crate::target::{TargetKind, WatchTarget};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// A validated source/destination pair, both absolute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPair {
    pub target: WatchTarget,
    pub destination: PathBuf,
}

/// Validate `source` and `destination` before any watching starts
///
/// - `source` must exist.
/// - A missing `destination` is created as a directory.
/// - An existing `destination` must be a directory: a directory source is
///   mirrored into it, and a single file lands inside it under its base name.
pub fn prepare(
    source: &Path,
    destination: &Path,
    options: &CopyOptions,
) -> Result<MirrorPair, StartupError> {
    let target = WatchTarget::resolve(source).map_err(|source_err| {
        StartupError::SourceUnavailable {
            path: source.to_path_buf(),
            source: source_err,
        }
    })?;

    match std::fs::metadata(destination) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => {
            return Err(StartupError::TypeMismatch {
                source_path: target.root().to_path_buf(),
                source_kind: target.kind().as_str(),
                destination: destination.to_path_buf(),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            make_dirs(destination, options).map_err(|e| StartupError::CreateDestination {
                path: destination.to_path_buf(),
                source: e,
            })?;
            info!("Created destination directory {}", destination.display());
        }
        Err(e) => {
            return Err(StartupError::DestinationUnavailable {
                path: destination.to_path_buf(),
                source: e,
            });
        }
    }

    let destination = destination
        .canonicalize()
        .map_err(|e| StartupError::DestinationUnavailable {
            path: destination.to_path_buf(),
            source: e,
        })?;

    let onto_itself = match target.kind() {
        TargetKind::Directory => destination == target.root(),
        TargetKind::File => target.root().parent() == Some(destination.as_path()),
    };
    if onto_itself {
        return Err(StartupError::SameLocation {
            path: target.root().to_path_buf(),
        });
    }

    Ok(MirrorPair {
        target,
        destination,
    })
}
