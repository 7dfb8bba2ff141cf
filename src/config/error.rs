use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving, validating, or provisioning
/// configuration.
///
/// The library never terminates the process; callers decide. Each variant
/// carries a stable numeric code (see [`ConfigError::code`]) that
/// identifies the condition in diagnostics.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration file: YAML mapping not found")]
    NotAMapping,

    #[error("{section}: value in configuration is blank")]
    BlankSection { section: String },

    #[error("{section}.{key} not defined in configuration")]
    MissingKey { section: String, key: String },

    #[error("log_directory {} in configuration does not exist", path.display())]
    LogDirectoryMissing { path: PathBuf },

    #[error("{value} is an invalid directory")]
    InvalidDirectory { value: String },

    #[error("PATTOO_CONFIGDIR environment variable must be set to the configuration directory")]
    EnvironmentUnset,

    #[error("section {section} not found in configuration file")]
    MissingSection { section: String },

    #[error("configuration section {section} does not have a {key} sub-section")]
    MissingSubSection { section: String, key: String },

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to prepare {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{section}.{key} is not a valid port number: {value}")]
    InvalidPort {
        section: String,
        key: String,
        value: String,
    },

    #[error("{section}.{key} has an unexpected value type")]
    UnexpectedType { section: String, key: String },

    #[error("provisioning requires root privileges")]
    NotRoot,

    #[error("command failed: {command}: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("unknown system account: {name}")]
    UnknownAccount { name: String },
}

impl ConfigError {
    /// Numeric code identifying the error condition in logs.
    pub fn code(&self) -> u32 {
        match self {
            ConfigError::LogDirectoryMissing { .. } => 1003,
            ConfigError::BlankSection { .. } => 1004,
            ConfigError::Read { .. } => 1006,
            ConfigError::Yaml(_) => 1008,
            ConfigError::UnexpectedType { .. } => 1009,
            ConfigError::Io { .. } => 1011,
            ConfigError::InvalidPort { .. } => 1012,
            ConfigError::MissingKey { .. } => 1016,
            ConfigError::InvalidDirectory { .. } => 1019,
            ConfigError::NotAMapping => 1021,
            ConfigError::NotRoot => 1029,
            ConfigError::CommandFailed { .. } => 1030,
            ConfigError::UnknownAccount { .. } => 1031,
            ConfigError::EnvironmentUnset => 1041,
            ConfigError::MissingSection { .. } => 1055,
            ConfigError::MissingSubSection { .. } => 1062,
        }
    }
}
