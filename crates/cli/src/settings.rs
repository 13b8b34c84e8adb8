//! Configuration file discovery

use cpw_core::{ConfigError, MirrorConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "CPW_CONFIG";

/// Default config location (`~/.config/cpw/config.toml` on Linux)
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cpw").join("config.toml"))
}

/// Load configuration for this process
///
/// An explicit `--config` path or `$CPW_CONFIG` must exist. The default
/// location is optional; when absent the built-in defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<MirrorConfig, ConfigError> {
    let from_env = std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    load_from(explicit, from_env.as_deref(), config_file_path().as_deref())
}

/// Resolution order: explicit path, environment path, default path
pub fn load_from(
    explicit: Option<&Path>,
    from_env: Option<&Path>,
    default: Option<&Path>,
) -> Result<MirrorConfig, ConfigError> {
    if let Some(path) = explicit.or(from_env) {
        debug!("Loading config from {}", path.display());
        return MirrorConfig::load(path);
    }

    match default {
        Some(path) if path.is_file() => {
            debug!("Loading config from {}", path.display());
            MirrorConfig::load(path)
        }
        _ => Ok(MirrorConfig::default()),
    }
}
