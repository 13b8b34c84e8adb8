//! Configuration for cpw
//!
//! Loaded from a TOML file; every key is optional:
//! ```toml
//! [mirror]
//! file_mode = 420
//! dir_mode = 493
//! event_queue_capacity = 4096
//! catch_up_new_directories = true
//!
//! [log]
//! level = "info"
//! file = "/var/log/cpw.log"
//! ```

use crate::copy::{CopyOptions, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted notification queue
pub const MAX_EVENT_QUEUE_CAPACITY: usize = 1 << 20;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    pub mirror: MirrorSettings,
    pub log: LogConfig,
}

/// Mirroring behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorSettings {
    /// Permission bits for files created in the destination
    pub file_mode: u32,

    /// Permission bits for directories created in the destination
    pub dir_mode: u32,

    /// Capacity of the queue between the notification backend and the
    /// event loop. Events beyond it are dropped.
    pub event_queue_capacity: usize,

    /// Copy files already present in a newly discovered directory
    pub catch_up_new_directories: bool,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            file_mode: DEFAULT_FILE_MODE,
            dir_mode: DEFAULT_DIR_MODE,
            event_queue_capacity: 4096,
            catch_up_new_directories: true,
        }
    }
}

impl MirrorSettings {
    /// Copy options derived from these settings
    pub fn copy_options(&self) -> CopyOptions {
        CopyOptions {
            file_mode: self.file_mode,
            dir_mode: self.dir_mode,
        }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,

    /// Write logs to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl MirrorConfig {
    /// Parse configuration from TOML text
    ///
    /// `origin` is only used for error messages.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: MirrorConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Reject out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mirror.file_mode > 0o7777 {
            return Err(ConfigError::Invalid {
                key: "mirror.file_mode",
                reason: format!("{:#o} is not a permission mode", self.mirror.file_mode),
            });
        }
        if self.mirror.dir_mode > 0o7777 {
            return Err(ConfigError::Invalid {
                key: "mirror.dir_mode",
                reason: format!("{:#o} is not a permission mode", self.mirror.dir_mode),
            });
        }
        // Directories we create must stay traversable by us
        if self.mirror.dir_mode & 0o700 != 0o700 {
            return Err(ConfigError::Invalid {
                key: "mirror.dir_mode",
                reason: format!("{:#o} must grant the owner rwx", self.mirror.dir_mode),
            });
        }
        if self.mirror.event_queue_capacity == 0
            || self.mirror.event_queue_capacity > MAX_EVENT_QUEUE_CAPACITY
        {
            return Err(ConfigError::Invalid {
                key: "mirror.event_queue_capacity",
                reason: format!(
                    "{} is outside 1-{}",
                    self.mirror.event_queue_capacity, MAX_EVENT_QUEUE_CAPACITY
                ),
            });
        }
        match self.log.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::Invalid {
                key: "log.level",
                reason: format!("unknown level '{}'", other),
            }),
        }
    }
}
