use std::env;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;

/// Environment variable naming the configuration directory.
pub const CONFIG_DIR_ENV: &str = "PATTOO_CONFIGDIR";

/// Filesystem locations derived from the pattoo environment.
pub struct Paths;

impl Paths {
    /// Returns the configuration directory from `PATTOO_CONFIGDIR`,
    /// with a leading `~` expanded to the home directory.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let raw = env::var(CONFIG_DIR_ENV).map_err(|_| ConfigError::EnvironmentUnset)?;
        Ok(expand_user(Path::new(&raw)))
    }

    /// Returns the main configuration file path, `<config dir>/pattoo.yaml`.
    pub fn config_file() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("pattoo.yaml"))
    }

    /// Returns the server configuration file path,
    /// `<config dir>/pattoo_server.yaml`.
    pub fn server_config_file() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("pattoo_server.yaml"))
    }

    /// Returns the configuration file path for a named agent program,
    /// `<config dir>/<agent_program>.yaml`.
    pub fn agent_config_file(agent_program: &str) -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(format!("{agent_program}.yaml")))
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, and paths that are not valid UTF-8, are
/// returned unchanged.
pub fn expand_user(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    if text == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }
    if let Some(rest) = text.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
