//! Platform-specific configuration location.
//!
//! - Linux: `~/.config/wavecap/wavecap.toml`
//! - macOS: `~/Library/Application Support/wavecap/wavecap.toml`
//! - Windows: `%APPDATA%\wavecap\wavecap.toml`

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "wavecap";

/// Configuration file name.
const CONFIG_FILE: &str = "wavecap.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default configuration file path.
pub fn user_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Create the user configuration directory if missing and return it.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Create `dir` and its parents if missing.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}

/// Which file to load: an explicit path always wins, otherwise the user
/// file if it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let path = user_config_path();
            path.is_file().then_some(path)
        }
    }
}
