//! In-memory representation of a pattoo YAML configuration file.

use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::config::error::ConfigError;

/// A parsed configuration document.
///
/// Loaded once and treated as immutable for the life of the process. All
/// lookups go through the two-level [`search`](ConfigDocument::search)
/// primitive: a primary section key followed by a sub-key.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Value,
}

impl ConfigDocument {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a document from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let root = serde_yaml::from_str(contents)?;
        Ok(Self { root })
    }

    /// Read and parse a document from disk.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Look up `section.key`, failing when the value is not configured.
    pub fn search(&self, section: &str, key: &str) -> Result<&Value, ConfigError> {
        match self.search_optional(section, key)? {
            Some(value) => Ok(value),
            None => Err(ConfigError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            }),
        }
    }

    /// Look up `section.key`, returning `None` when absent.
    ///
    /// Still fails when the document is not a mapping or when the section
    /// exists with a null value; both point at a broken file rather than
    /// an unset option.
    pub fn search_optional(&self, section: &str, key: &str) -> Result<Option<&Value>, ConfigError> {
        if !self.root.is_mapping() {
            return Err(ConfigError::NotAMapping);
        }
        let Some(value) = self.root.get(section) else {
            return Ok(None);
        };
        if value.is_null() {
            return Err(ConfigError::BlankSection {
                section: section.to_string(),
            });
        }
        Ok(value.get(key))
    }
}

/// Render a scalar value as its configured string form.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Interpret a scalar as a TCP port, accepting numeric strings.
pub(crate) fn port_from_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|port| u16::try_from(port).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(yaml: &str) -> ConfigDocument {
        ConfigDocument::from_yaml(yaml).expect("parse document")
    }

    #[test]
    fn test_search_returns_exact_value() {
        let doc = document("pattoo:\n  log_directory: /var/log/pattoo\n");
        let value = doc.search("pattoo", "log_directory").unwrap();
        assert_eq!(value.as_str(), Some("/var/log/pattoo"));
    }

    #[test]
    fn test_search_missing_key_fails() {
        let doc = document("pattoo:\n  log_level: info\n");
        let err = doc.search("pattoo", "log_directory").unwrap_err();
        assert_eq!(err.code(), 1016);
    }

    #[test]
    fn test_search_optional_missing_section_is_none() {
        let doc = document("pattoo:\n  log_level: info\n");
        let value = doc.search_optional("pattoo_agent_api", "ip_address").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_search_optional_missing_key_is_none() {
        let doc = document("pattoo:\n  log_level: info\n");
        let value = doc.search_optional("pattoo", "language").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_non_mapping_document_fails() {
        let doc = document("- just\n- a\n- list\n");
        let err = doc.search_optional("pattoo", "log_level").unwrap_err();
        assert_eq!(err.code(), 1021);
    }

    #[test]
    fn test_null_section_fails_even_when_optional() {
        let doc = document("pattoo:\n");
        let err = doc.search_optional("pattoo", "log_level").unwrap_err();
        assert_eq!(err.code(), 1004);
    }

    #[test]
    fn test_scalar_section_has_no_sub_keys() {
        let doc = document("pattoo: not-a-mapping\n");
        let value = doc.search_optional("pattoo", "log_level").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_scalar_to_string_coerces_numbers() {
        assert_eq!(
            scalar_to_string(&Value::from("debug")),
            Some("debug".to_string())
        );
        assert_eq!(scalar_to_string(&Value::from(7)), Some("7".to_string()));
        assert_eq!(scalar_to_string(&Value::Null), None);
    }

    #[test]
    fn test_port_from_value_accepts_numeric_strings() {
        assert_eq!(port_from_value(&Value::from(20201)), Some(20201));
        assert_eq!(port_from_value(&Value::from("8080")), Some(8080));
        assert_eq!(port_from_value(&Value::from("not-a-port")), None);
        assert_eq!(port_from_value(&Value::from(70000)), None);
    }
}
