//! Declarative cache options.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::serializer::SerializerKind;

/// Option names accepted by [`CacheOptions`].
pub const VALID_OPTIONS: [&str; 3] = ["shared_cache", "ignore_headers", "serializer"];

/// Options that can be loaded from a TOML or JSON document.
///
/// ```toml
/// shared_cache = false
/// ignore_headers = ["X-Request-Id"]
/// serializer = "bincode"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheOptions {
    /// Refuse `private` responses (default `true`).
    pub shared_cache: bool,
    /// Request headers excluded from fingerprints.
    pub ignore_headers: Vec<String>,
    /// Storage format.
    pub serializer: SerializerKind,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            shared_cache: true,
            ignore_headers: Vec::new(),
            serializer: SerializerKind::Json,
        }
    }
}

impl CacheOptions {
    /// Load options from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = raw.parse().map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;
        check_names(table.keys())?;
        let options: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        options.validate()
    }

    /// Load options from a JSON object.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        check_names(object.keys())?;
        let options: Self = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        options.validate()
    }

    /// Reject empty or malformed header names.
    pub fn validate(self) -> Result<Self, ConfigError> {
        check_ignore_headers(&self.ignore_headers)?;
        Ok(self)
    }
}

pub(crate) fn check_ignore_headers(names: &[String]) -> Result<(), ConfigError> {
    for name in names {
        let malformed = name.is_empty()
            || name
                .chars()
                .any(|c| c.is_whitespace() || c == ':' || c.is_control());
        if malformed {
            return Err(ConfigError::InvalidValue {
                name: "ignore_headers".to_string(),
                message: format!("'{}' is not a header name", name),
            });
        }
    }
    Ok(())
}

fn check_names<'a>(names: impl Iterator<Item = &'a String>) -> Result<(), ConfigError> {
    for name in names {
        if !VALID_OPTIONS.contains(&name.as_str()) {
            return Err(ConfigError::UnknownOption {
                name: name.clone(),
                valid: VALID_OPTIONS.join(", "),
            });
        }
    }
    Ok(())
}
