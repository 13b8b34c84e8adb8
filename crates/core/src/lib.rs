//! Core mirroring primitives for cpw
//!
//! This crate provides:
//! - Watch targets and the source → destination path mapping
//! - Whole-file copy and bulk tree copy
//! - Startup validation of source/destination pairs
//! - Configuration types

pub mod bootstrap;
pub mod config;
pub mod copy;
pub mod error;
pub mod target;

// Re-exports
pub use bootstrap::{prepare, MirrorPair};
pub use config::{LogConfig, MirrorConfig, MirrorSettings};
pub use copy::{copy_file, copy_tree, create_dir_all, CopyOptions, CopyStats};
pub use error::{ConfigError, CopyError, StartupError};
pub use target::{is_strictly_inside, TargetKind, WatchTarget};

/// Result type for copy operations
pub type Result<T> = std::result::Result<T, CopyError>;
