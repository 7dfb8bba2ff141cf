//! Required-key validation, run once at startup before a configuration
//! is trusted.

use std::collections::BTreeMap;

use crate::config::document::ConfigDocument;
use crate::config::error::ConfigError;

/// Required-keys schema: primary section name to its mandatory sub-keys.
///
/// Ordered so diagnostics are deterministic; each component supplies the
/// schema covering the sections it reads.
pub type RequiredKeys = BTreeMap<String, Vec<String>>;

/// Confirm every required primary and secondary key is present.
///
/// Pure check, no mutation; returns the first failure encountered.
pub fn check_config(document: &ConfigDocument, required: &RequiredKeys) -> Result<(), ConfigError> {
    let root = document.root();
    if !root.is_mapping() {
        return Err(ConfigError::NotAMapping);
    }

    for (section, keys) in required {
        let Some(value) = root.get(section.as_str()) else {
            return Err(ConfigError::MissingSection {
                section: section.clone(),
            });
        };
        if !value.is_mapping() {
            return Err(ConfigError::BlankSection {
                section: section.clone(),
            });
        }
        for key in keys {
            if value.get(key.as_str()).is_none() {
                return Err(ConfigError::MissingSubSection {
                    section: section.clone(),
                    key: key.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Schema covering the sections an agent process reads.
pub fn agent_required_keys() -> RequiredKeys {
    let mut required = RequiredKeys::new();
    required.insert(
        "pattoo".to_string(),
        vec![
            "log_directory".to_string(),
            "log_level".to_string(),
            "language".to_string(),
            "cache_directory".to_string(),
            "daemon_directory".to_string(),
        ],
    );
    required.insert(
        "pattoo_agent_api".to_string(),
        vec!["ip_address".to_string(), "ip_bind_port".to_string()],
    );
    required.insert(
        "pattoo_web_api".to_string(),
        vec!["ip_address".to_string(), "ip_bind_port".to_string()],
    );
    required
}

/// Schema covering the core section a server process reads.
pub fn server_required_keys() -> RequiredKeys {
    let mut required = RequiredKeys::new();
    required.insert(
        "pattoo".to_string(),
        vec![
            "log_directory".to_string(),
            "log_level".to_string(),
            "language".to_string(),
            "cache_directory".to_string(),
            "daemon_directory".to_string(),
        ],
    );
    required
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(yaml: &str) -> ConfigDocument {
        ConfigDocument::from_yaml(yaml).expect("parse document")
    }

    fn schema(section: &str, keys: &[&str]) -> RequiredKeys {
        let mut required = RequiredKeys::new();
        required.insert(
            section.to_string(),
            keys.iter().map(ToString::to_string).collect(),
        );
        required
    }

    #[test]
    fn test_passes_when_keys_present() {
        let doc = document("pattoo:\n  log_directory: /var/log/pattoo\n  log_level: info\n");
        let required = schema("pattoo", &["log_directory", "log_level"]);
        assert!(check_config(&doc, &required).is_ok());
    }

    #[test]
    fn test_missing_primary_key_fails() {
        let doc = document("pattoo:\n  log_level: info\n");
        let required = schema("pattoo_web_api", &["ip_address"]);
        let err = check_config(&doc, &required).unwrap_err();
        assert_eq!(err.code(), 1055);
    }

    #[test]
    fn test_missing_secondary_key_fails() {
        let doc = document("pattoo:\n  log_level: info\n");
        let required = schema("pattoo", &["log_level", "cache_directory"]);
        let err = check_config(&doc, &required).unwrap_err();
        assert_eq!(err.code(), 1062);
    }

    #[test]
    fn test_null_section_fails() {
        let doc = document("pattoo:\n");
        let required = schema("pattoo", &["log_level"]);
        let err = check_config(&doc, &required).unwrap_err();
        assert_eq!(err.code(), 1004);
    }

    #[test]
    fn test_agent_schema_sections() {
        let required = agent_required_keys();
        assert!(required.contains_key("pattoo"));
        assert!(required.contains_key("pattoo_agent_api"));
        assert!(required.contains_key("pattoo_web_api"));
    }
}
