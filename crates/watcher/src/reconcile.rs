//! Catch-up copy for newly discovered directories
//!
//! A directory's contents only produce events once the directory itself is
//! watched. Anything written between its creation and the subscription
//! (`mkdir -p a/b && echo x > a/b/f`, `cp -r`, archive extraction) would be
//! missed, so after subscribing a new subtree the files already in it are
//! copied once.

use cpw_core::{copy_file, create_dir_all, CopyOptions, WatchTarget};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Totals for one catch-up pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatchUp {
    /// Files copied
    pub copied: usize,
    /// Bytes copied
    pub bytes: u64,
    /// Files that failed to copy
    pub failed: usize,
}

/// Copy every regular file currently under `dir`
///
/// Unlike the initial bulk copy, a failure here does not stop the walk:
/// each file is handled the way a standalone event for it would be.
pub fn catch_up(
    dir: &Path,
    target: &WatchTarget,
    dest_root: &Path,
    options: &CopyOptions,
) -> CatchUp {
    let mut totals = CatchUp::default();
    let skip_destination = target.contains_destination(dest_root);

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !(skip_destination && e.path().starts_with(dest_root)))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        // Follows symlinks, matching how events are handled
        let is_file = std::fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let Some(dest_path) = target.destination_for(entry.path(), dest_root) else {
            continue;
        };

        let result = match dest_path.parent() {
            Some(parent) => create_dir_all(parent, options),
            None => Ok(()),
        }
        .and_then(|()| copy_file(entry.path(), &dest_path, options));

        match result {
            Ok(bytes) => {
                totals.copied += 1;
                totals.bytes += bytes;
                debug!("Caught up {} to {}", entry.path().display(), dest_path.display());
            }
            Err(e) => {
                totals.failed += 1;
                warn!("Error copying {} to {}: {}", entry.path().display(), dest_path.display(), e);
            }
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpw_core::TargetKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_catch_up_copies_existing_files() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let target = WatchTarget::new(src.path(), TargetKind::Directory);

        let new_dir = src.path().join("fresh");
        fs::create_dir_all(new_dir.join("deeper")).unwrap();
        fs::write(new_dir.join("one.txt"), b"1").unwrap();
        fs::write(new_dir.join("deeper/two.txt"), b"22").unwrap();
        fs::create_dir(new_dir.join("empty")).unwrap();

        let totals = catch_up(&new_dir, &target, dst.path(), &CopyOptions::default());

        assert_eq!(totals, CatchUp { copied: 2, bytes: 3, failed: 0 });
        assert_eq!(fs::read(dst.path().join("fresh/one.txt")).unwrap(), b"1");
        assert_eq!(fs::read(dst.path().join("fresh/deeper/two.txt")).unwrap(), b"22");
        assert!(!dst.path().join("fresh/empty").exists());
    }

    #[test]
    fn test_catch_up_empty_directory_creates_nothing() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let target = WatchTarget::new(src.path(), TargetKind::Directory);
        fs::create_dir(src.path().join("empty")).unwrap();

        let totals = catch_up(&src.path().join("empty"), &target, dst.path(), &CopyOptions::default());

        assert_eq!(totals, CatchUp::default());
        assert_eq!(fs::read_dir(dst.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_catch_up_skips_nested_destination() {
        let src = TempDir::new().unwrap();
        let dst = src.path().join("mirror");
        fs::create_dir_all(dst.join("inner")).unwrap();
        fs::write(dst.join("inner/copy.txt"), b"c").unwrap();
        let target = WatchTarget::new(src.path(), TargetKind::Directory);

        let totals = catch_up(src.path(), &target, &dst, &CopyOptions::default());

        assert_eq!(totals.copied, 0);
        assert!(!dst.join("mirror").exists());
    }

    #[test]
    fn test_catch_up_into_parent_of_source() {
        let dst = TempDir::new().unwrap();
        let src = dst.path().join("src");
        fs::create_dir_all(src.join("new")).unwrap();
        fs::write(src.join("new/a.txt"), b"hello").unwrap();
        let target = WatchTarget::new(&src, TargetKind::Directory);

        let totals = catch_up(&src.join("new"), &target, dst.path(), &CopyOptions::default());

        assert_eq!(totals.copied, 1);
        assert_eq!(fs::read(dst.path().join("new/a.txt")).unwrap(), b"hello");
    }
}
