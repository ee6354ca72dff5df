//! Plugin configuration.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use serde::Deserialize;

use crate::rest::error::RestError;
use crate::server::StatusCode;

/// Overrides for the format table and the unsupported-format response.
///
/// ```toml
/// unsupported_format_status = 406
///
/// [serializers]
/// yaml = "YAML"
///
/// [content_types]
/// json = "application/vnd.api+json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Format token to serializer identifier (`JSON`, `YAML`, `Dumper`).
    pub serializers: HashMap<String, String>,
    /// Format token to response content type.
    pub content_types: HashMap<String, String>,
    /// Status sent when a request names a format the table does not know.
    pub unsupported_format_status: u16,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            serializers: HashMap::new(),
            content_types: HashMap::new(),
            unsupported_format_status: 404,
        }
    }
}

impl RestConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RestError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RestError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The configured unsupported-format status, checked to be a known 4xx/5xx code.
    pub fn unsupported_status(&self) -> Result<StatusCode, RestError> {
        StatusCode::from_u16(self.unsupported_format_status)
            .filter(StatusCode::is_error)
            .ok_or(RestError::InvalidStatus(self.unsupported_format_status))
    }
}
