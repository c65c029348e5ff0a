//! Platform-specific configuration paths.
//!
//! - **User config**: `~/.config/patchbay/` (Linux), `~/Library/Application Support/patchbay/` (macOS), `%APPDATA%\patchbay\` (Windows)
//! - **Server config**: `server.toml` inside the user config directory
//!
//! The `PATCHBAY_CONFIG` environment variable overrides the server config location.
//!
//! ```rust,no_run
//! use patchbay_config::paths;
//!
//! let config = paths::load_server_config().unwrap();
//! println!("server '{}' from {:?}", config.name, paths::find_server_config());
//! ```

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::server::ServerConfig;

/// Application name used for directory paths.
const APP_NAME: &str = "patchbay";

/// File name of the server configuration.
pub const SERVER_CONFIG_FILE: &str = "server.toml";

/// Environment variable naming an explicit server config file.
pub const CONFIG_ENV_VAR: &str = "PATCHBAY_CONFIG";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default server config path in the user config directory.
pub fn server_config_path() -> PathBuf {
    user_config_dir().join(SERVER_CONFIG_FILE)
}

/// Find the server config file.
///
/// Searches in the following order:
/// 1. The file named by `PATCHBAY_CONFIG`, if set and non-empty
/// 2. `server.toml` in the user config directory
pub fn find_server_config() -> Option<PathBuf> {
    let explicit = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty());
    find_server_config_in(explicit.as_deref().map(Path::new), &server_config_path())
}

fn find_server_config_in(explicit: Option<&Path>, default: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.is_file().then(|| path.to_path_buf());
    }
    default.is_file().then(|| default.to_path_buf())
}

/// Load the server config, falling back to defaults when no file exists.
///
/// A file that exists but fails to parse or validate is an error.
pub fn load_server_config() -> Result<ServerConfig, ConfigError> {
    match find_server_config() {
        Some(path) => ServerConfig::load(path),
        None => {
            tracing::debug!("no server config found, using defaults");
            Ok(ServerConfig::default())
        }
    }
}
