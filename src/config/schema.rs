//! Typed view of the pattoo configuration file.
//!
//! String-key lookups happen once, at load time; afterwards the process
//! reads resolved fields. Only the following YAML sections are consumed:
//!
//! ```text
//! pattoo:
//! pattoo_agent_api:
//! pattoo_web_api:
//! ```

use std::fs;
use std::net::Ipv6Addr;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use crate::config::document::{ConfigDocument, port_from_value, scalar_to_string};
use crate::config::error::ConfigError;
use crate::config::paths::{Paths, expand_user};

/// Path prefix shared by all platform HTTP APIs.
pub const API_SITE_PREFIX: &str = "/pattoo/api/v1";
/// Path prefix of the agent data-collection API.
pub const API_AGENT_PREFIX: &str = "/pattoo/api/v1/agent";
/// Path prefix of the web query API.
pub const API_WEB_PREFIX: &str = "/pattoo/api/v1/web";

pub const DEFAULT_AGENT_API_PORT: u16 = 20201;
pub const DEFAULT_WEB_API_PORT: u16 = 20202;
pub const DEFAULT_LOG_LEVEL: &str = "debug";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_AGENT_API_ADDRESS: &str = "localhost";

/// A resolved `ip_address`/`ip_bind_port` pair.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EndpointConfig {
    pub ip_address: String,
    pub ip_bind_port: u16,
}

/// Route selector for [`Config::web_api_server_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebApiRoute {
    Graphql,
    RestData,
}

/// Resolved platform configuration.
///
/// Populated once from a [`ConfigDocument`] and immutable thereafter.
/// Loading verifies the log directory exists and creates the cache and
/// daemon directories when absent.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Config {
    log_directory: PathBuf,
    log_level: String,
    cache_directory: PathBuf,
    daemon_directory: PathBuf,
    language: String,
    agent_api: EndpointConfig,
    web_api: EndpointConfig,
}

impl Config {
    /// Load `pattoo.yaml` from the directory named by `PATTOO_CONFIGDIR`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Paths::config_file()?;
        Self::from_file(&path)
    }

    /// Load and resolve configuration from an explicit file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let document = ConfigDocument::read(path)?;
        Self::from_document(&document)
    }

    /// Resolve every typed field from a parsed document.
    pub fn from_document(document: &ConfigDocument) -> Result<Self, ConfigError> {
        let log_directory = expand_user(&required_path(document, "pattoo", "log_directory")?);
        if !log_directory.is_dir() {
            return Err(ConfigError::LogDirectoryMissing {
                path: log_directory,
            });
        }

        let log_level = optional_lowercase(document, "pattoo", "log_level", DEFAULT_LOG_LEVEL)?;
        let language = optional_lowercase(document, "pattoo", "language", DEFAULT_LANGUAGE)?;

        let cache_directory = created_directory(document, "pattoo", "cache_directory")?;
        let daemon_directory = created_directory(document, "pattoo", "daemon_directory")?;

        let agent_api = EndpointConfig {
            ip_address: match document.search_optional("pattoo_agent_api", "ip_address")? {
                Some(value) => required_string("pattoo_agent_api", "ip_address", value)?,
                None => DEFAULT_AGENT_API_ADDRESS.to_string(),
            },
            ip_bind_port: optional_port(
                document,
                "pattoo_agent_api",
                "ip_bind_port",
                DEFAULT_AGENT_API_PORT,
            )?,
        };

        let web_api = EndpointConfig {
            ip_address: {
                let value = document.search("pattoo_web_api", "ip_address")?;
                required_string("pattoo_web_api", "ip_address", value)?
            },
            ip_bind_port: optional_port(
                document,
                "pattoo_web_api",
                "ip_bind_port",
                DEFAULT_WEB_API_PORT,
            )?,
        };

        Ok(Self {
            log_directory,
            log_level,
            cache_directory,
            daemon_directory,
            language,
            agent_api,
            web_api,
        })
    }

    pub fn log_directory(&self) -> &Path {
        &self.log_directory
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    pub fn daemon_directory(&self) -> &Path {
        &self.daemon_directory
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn agent_api_ip_address(&self) -> &str {
        &self.agent_api.ip_address
    }

    pub fn agent_api_ip_bind_port(&self) -> u16 {
        self.agent_api.ip_bind_port
    }

    pub fn web_api_ip_address(&self) -> &str {
        &self.web_api.ip_address
    }

    pub fn web_api_ip_bind_port(&self) -> u16 {
        self.web_api.ip_bind_port
    }

    /// Main process log file, `<log_directory>/pattoo.log`.
    pub fn log_file(&self) -> PathBuf {
        self.log_directory.join("pattoo.log")
    }

    /// API process log file, `<log_directory>/pattoo-api.log`.
    pub fn log_file_api(&self) -> PathBuf {
        self.log_directory.join("pattoo-api.log")
    }

    /// Daemon log file, `<log_directory>/pattoo-daemon.log`.
    pub fn log_file_daemon(&self) -> PathBuf {
        self.log_directory.join("pattoo-daemon.log")
    }

    /// Per-agent cache directory, created on first access.
    pub fn agent_cache_directory(&self, agent_program: &str) -> Result<PathBuf, ConfigError> {
        let directory = self.cache_directory.join(agent_program);
        fs::create_dir_all(&directory).map_err(|source| ConfigError::Io {
            path: directory.clone(),
            source,
        })?;
        Ok(directory)
    }

    /// URI path on which the agent API accepts data.
    pub fn agent_api_uri(&self) -> String {
        format!("{API_AGENT_PREFIX}/receive")
    }

    /// Full URL an agent posts its data to.
    pub fn agent_api_server_url(&self, agent_id: &str) -> String {
        format!(
            "http://{}:{}{}/{agent_id}",
            url_host(&self.agent_api.ip_address),
            self.agent_api.ip_bind_port,
            self.agent_api_uri()
        )
    }

    /// Full URL of the web query API.
    pub fn web_api_server_url(&self, route: WebApiRoute) -> String {
        let suffix = match route {
            WebApiRoute::Graphql => "/graphql",
            WebApiRoute::RestData => "/rest/data",
        };
        format!(
            "http://{}:{}{API_WEB_PREFIX}{suffix}",
            url_host(&self.web_api.ip_address),
            self.web_api.ip_bind_port
        )
    }
}

/// Bracket IPv6 literals so they compose into URLs.
fn url_host(address: &str) -> String {
    if address.parse::<Ipv6Addr>().is_ok() {
        format!("[{address}]")
    } else {
        address.to_string()
    }
}

fn required_path(
    document: &ConfigDocument,
    section: &str,
    key: &str,
) -> Result<PathBuf, ConfigError> {
    let value = document.search(section, key)?;
    Ok(PathBuf::from(required_string(section, key, value)?))
}

fn required_string(section: &str, key: &str, value: &Value) -> Result<String, ConfigError> {
    scalar_to_string(value).ok_or_else(|| ConfigError::UnexpectedType {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn optional_lowercase(
    document: &ConfigDocument,
    section: &str,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match document.search_optional(section, key)? {
        Some(value) => Ok(required_string(section, key, value)?.to_lowercase()),
        None => Ok(default.to_string()),
    }
}

fn optional_port(
    document: &ConfigDocument,
    section: &str,
    key: &str,
    default: u16,
) -> Result<u16, ConfigError> {
    match document.search_optional(section, key)? {
        Some(value) => port_from_value(value).ok_or_else(|| ConfigError::InvalidPort {
            section: section.to_string(),
            key: key.to_string(),
            value: scalar_to_string(value).unwrap_or_else(|| format!("{value:?}")),
        }),
        None => Ok(default),
    }
}

/// Resolve and create a directory configured under `section.key`.
fn created_directory(
    document: &ConfigDocument,
    section: &str,
    key: &str,
) -> Result<PathBuf, ConfigError> {
    let directory = expand_user(&required_path(document, section, key)?);
    if !directory.is_dir() {
        debug!(path = %directory.display(), "Creating configured directory");
        fs::create_dir_all(&directory).map_err(|source| ConfigError::Io {
            path: directory.clone(),
            source,
        })?;
    }
    Ok(directory)
}
