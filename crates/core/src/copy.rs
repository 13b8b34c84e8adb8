//! Whole-file copy and bulk tree copy
//!
//! Copies are plain overwrites: the source is read fully into memory and
//! written over the destination. A failed write may leave the destination
//! truncated; the next successful copy of the same path repairs it.

use crate::error::CopyError;
use crate::target::is_strictly_inside;
use crate::Result;
use std::fs::{DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Default mode for files written to the destination
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Default mode for directories created in the destination
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Fixed permission bits applied to created files and directories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Mode for newly created files (existing files keep theirs)
    pub file_mode: u32,
    /// Mode for newly created directories
    pub dir_mode: u32,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            file_mode: DEFAULT_FILE_MODE,
            dir_mode: DEFAULT_DIR_MODE,
        }
    }
}

/// Totals for a bulk copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Files written
    pub files: usize,
    /// Bytes written
    pub bytes: u64,
}

impl CopyStats {
    fn record(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }
}

/// Copy `src` over `dst`, returning the number of bytes written
///
/// `dst` is created if absent and truncated if present. The parent
/// directory must already exist.
pub fn copy_file(src: &Path, dst: &Path, options: &CopyOptions) -> Result<u64> {
    let data = std::fs::read(src).map_err(|source| CopyError::Read {
        path: src.to_path_buf(),
        source,
    })?;

    let write_err = |source| CopyError::Write {
        path: dst.to_path_buf(),
        source,
    };

    let mut open = OpenOptions::new();
    open.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        open.mode(options.file_mode);
    }
    #[cfg(not(unix))]
    let _ = options;

    let mut file = open.open(dst).map_err(write_err)?;
    file.write_all(&data).map_err(write_err)?;

    Ok(data.len() as u64)
}

/// Create `dir` and any missing parents with the configured directory mode
pub fn create_dir_all(dir: &Path, options: &CopyOptions) -> Result<()> {
    make_dirs(dir, options).map_err(|source| CopyError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

pub(crate) fn make_dirs(dir: &Path, options: &CopyOptions) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(options.dir_mode);
    }
    #[cfg(not(unix))]
    let _ = options;

    builder.create(dir)
}

/// Copy every regular file under `source_root` into `dest_root`
///
/// Relative paths are preserved. Destination directories are created only
/// when a file has to be placed in them, so empty source directories leave
/// no trace. The walk stops at the first error; files copied before it stay
/// in place. A destination nested inside the source is skipped.
pub fn copy_tree(source_root: &Path, dest_root: &Path, options: &CopyOptions) -> Result<CopyStats> {
    let mut stats = CopyStats::default();
    let skip_destination = is_strictly_inside(dest_root, source_root);

    for entry in WalkDir::new(source_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(skip_destination && e.path().starts_with(dest_root)))
    {
        let entry = entry.map_err(|source| CopyError::Walk {
            path: source
                .path()
                .unwrap_or(source_root)
                .to_path_buf(),
            source,
        })?;

        if !is_copyable(&entry) {
            continue;
        }

        let relative = match entry.path().strip_prefix(source_root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let dest_path = dest_root.join(relative);

        if let Some(parent) = dest_path.parent() {
            create_dir_all(parent, options)?;
        }

        let bytes = copy_file(entry.path(), &dest_path, options)?;
        stats.record(bytes);
        debug!("Copied {} to {}", entry.path().display(), dest_path.display());
    }

    Ok(stats)
}

/// Regular files, and symlinks that resolve to regular files
fn is_copyable(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if file_type.is_symlink() {
        return std::fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false);
    }
    false
}
