//! Install-time creation and merging of configuration files.

use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::config::error::ConfigError;
use crate::config::paths::expand_user;

/// Which platform component a configuration file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Agent,
    Server,
}

impl Role {
    /// Name of the configuration file this role reads.
    pub fn config_filename(self) -> &'static str {
        match self {
            Role::Agent => "pattoo.yaml",
            Role::Server => "pattoo_server.yaml",
        }
    }
}

/// Merge two parsed documents key-by-key.
///
/// Mappings merge recursively; for anything else the override value wins,
/// including when the two sides disagree on type.
pub fn merge(defaults: &Value, overrides: &Value) -> Value {
    match (defaults, overrides) {
        (Value::Mapping(base), Value::Mapping(layer)) => {
            let mut merged = base.clone();
            for (key, value) in layer {
                let combined = match merged.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Value::Mapping(merged)
        }
        _ => overrides.clone(),
    }
}

/// Read a configuration file and overlay it on `defaults`.
///
/// On-disk values win. When the file does not exist, or parses to an
/// empty document, the defaults are returned unchanged.
pub fn read_config(path: &Path, defaults: &Value) -> Result<Value, ConfigError> {
    if !path.is_file() {
        return Ok(defaults.clone());
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let overrides: Value = serde_yaml::from_str(&contents)?;
    if overrides.is_null() {
        return Ok(defaults.clone());
    }

    Ok(merge(defaults, &overrides))
}

/// Create or update the configuration file for a role.
///
/// Merges `defaults` with any existing file (file values win), provisions
/// the directories an agent configuration names, and writes the merged
/// result back. Returns the path written.
pub fn configure(
    config_directory: &Path,
    defaults: &Value,
    role: Role,
) -> Result<PathBuf, ConfigError> {
    let config_file = config_directory.join(role.config_filename());
    info!(path = %config_file.display(), "Configuring file");

    let config = read_config(&config_file, defaults)?;

    if role == Role::Agent {
        provision_directories(&config)?;
    }

    fs::create_dir_all(config_directory).map_err(|source| ConfigError::Io {
        path: config_directory.to_path_buf(),
        source,
    })?;
    let rendered = serde_yaml::to_string(&config)?;
    fs::write(&config_file, rendered).map_err(|source| ConfigError::Io {
        path: config_file.clone(),
        source,
    })?;

    Ok(config_file)
}

/// Validate and create every `*directory` entry under the `pattoo`
/// section.
///
/// A value with no path separator is rejected outright; it would resolve
/// relative to whatever directory the daemon happens to start in.
fn provision_directories(config: &Value) -> Result<(), ConfigError> {
    let Some(section) = config.get("pattoo").and_then(Value::as_mapping) else {
        return Ok(());
    };

    let mut entries: Vec<(&str, &Value)> = section
        .iter()
        .filter_map(|(key, value)| key.as_str().map(|name| (name, value)))
        .filter(|(name, _)| name.contains("directory"))
        .collect();
    entries.sort_by_key(|(name, _)| *name);

    for (name, value) in entries {
        let Some(text) = value.as_str() else {
            return Err(ConfigError::InvalidDirectory {
                value: format!("{value:?}"),
            });
        };
        if !text.contains(MAIN_SEPARATOR) {
            return Err(ConfigError::InvalidDirectory {
                value: text.to_string(),
            });
        }

        let directory = expand_user(Path::new(text));
        if !directory.is_dir() {
            debug!(key = name, path = %directory.display(), "Creating directory");
            fs::create_dir_all(&directory).map_err(|source| ConfigError::Io {
                path: directory.clone(),
                source,
            })?;
            #[cfg(unix)]
            crate::install::user::chown_if_root(&directory)?;
        }
    }

    Ok(())
}

/// Baseline agent configuration written by `pattoo-setup configure`.
pub fn default_agent_config() -> Value {
    let mut core = Mapping::new();
    core.insert("log_directory".into(), "/var/log/pattoo".into());
    core.insert("log_level".into(), "debug".into());
    core.insert("language".into(), "en".into());
    core.insert("cache_directory".into(), "/opt/pattoo-cache".into());
    core.insert("daemon_directory".into(), "/opt/pattoo-daemon".into());

    let mut agent_api = Mapping::new();
    agent_api.insert("ip_address".into(), "127.0.0.1".into());
    agent_api.insert("ip_bind_port".into(), 20201.into());

    let mut web_api = Mapping::new();
    web_api.insert("ip_address".into(), "127.0.0.1".into());
    web_api.insert("ip_bind_port".into(), 20202.into());

    let mut root = Mapping::new();
    root.insert("pattoo".into(), Value::Mapping(core));
    root.insert("pattoo_agent_api".into(), Value::Mapping(agent_api));
    root.insert("pattoo_web_api".into(), Value::Mapping(web_api));
    Value::Mapping(root)
}

/// Baseline server configuration written by `pattoo-setup configure
/// --server`.
pub fn default_server_config() -> Value {
    let mut core = Mapping::new();
    core.insert("log_directory".into(), "/var/log/pattoo".into());
    core.insert("log_level".into(), "debug".into());
    core.insert("language".into(), "en".into());
    core.insert("cache_directory".into(), "/opt/pattoo-cache".into());
    core.insert("daemon_directory".into(), "/opt/pattoo-daemon".into());

    let mut root = Mapping::new();
    root.insert("pattoo".into(), Value::Mapping(core));
    Value::Mapping(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).expect("parse yaml")
    }

    #[test]
    fn test_merge_override_wins() {
        let defaults = yaml("a: 1\nb: 2\n");
        let overrides = yaml("a: 10\n");
        let merged = merge(&defaults, &overrides);
        assert_eq!(merged, yaml("a: 10\nb: 2\n"));
    }

    #[test]
    fn test_merge_recurses_into_mappings() {
        let defaults = yaml("pattoo:\n  log_level: debug\n  language: en\n");
        let overrides = yaml("pattoo:\n  log_level: info\n");
        let merged = merge(&defaults, &overrides);
        assert_eq!(
            merged,
            yaml("pattoo:\n  log_level: info\n  language: en\n")
        );
    }

    #[test]
    fn test_merge_type_conflict_takes_override() {
        let defaults = yaml("a:\n  nested: 1\n");
        let overrides = yaml("a: plain\n");
        let merged = merge(&defaults, &overrides);
        assert_eq!(merged, yaml("a: plain\n"));
    }

    #[test]
    fn test_read_config_missing_file_returns_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let defaults = yaml("a: 1\n");
        let merged = read_config(&temp.path().join("nonexistent.yaml"), &defaults).unwrap();
        assert_eq!(merged, defaults);
    }

    #[test]
    fn test_read_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pattoo.yaml");
        std::fs::write(&path, "a: 2\n").unwrap();

        let merged = read_config(&path, &yaml("a: 1\n")).unwrap();
        assert_eq!(merged, yaml("a: 2\n"));
    }

    #[test]
    fn test_read_config_empty_file_returns_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pattoo.yaml");
        std::fs::write(&path, "").unwrap();

        let defaults = yaml("a: 1\n");
        let merged = read_config(&path, &defaults).unwrap();
        assert_eq!(merged, defaults);
    }

    #[test]
    fn test_role_config_filenames() {
        assert_eq!(Role::Agent.config_filename(), "pattoo.yaml");
        assert_eq!(Role::Server.config_filename(), "pattoo_server.yaml");
    }

    #[test]
    fn test_default_agent_config_sections() {
        let defaults = default_agent_config();
        assert!(defaults.get("pattoo").is_some());
        assert!(defaults.get("pattoo_agent_api").is_some());
        assert!(defaults.get("pattoo_web_api").is_some());
    }
}
