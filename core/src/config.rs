//! Validator configuration.
//!
//! Plain values injected by the host pipeline. Every field has a default, so
//! an empty document is a valid configuration:
//!
//! ```yaml
//! callable_fields: [getHeader, userLocation]
//! min_content_length: 10
//! reject_status: 400
//! content_length_policy: true
//! ```

use crate::{ConfigError, DEFAULT_CALLABLE_FIELDS, DEFAULT_MIN_CONTENT_LENGTH, DEFAULT_REJECT_STATUS};
use serde::Deserialize;

/// Configuration for a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Fields resolved through a sub-key (call-style, then property-style).
    pub callable_fields: Vec<String>,

    /// Minimum `Content-Length` when a JSON content type is required.
    pub min_content_length: u64,

    /// Status code for rejects.
    pub reject_status: u16,

    /// Enable the content-length policy.
    pub content_length_policy: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            callable_fields: DEFAULT_CALLABLE_FIELDS.iter().map(ToString::to_string).collect(),
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            reject_status: DEFAULT_REJECT_STATUS,
            content_length_policy: true,
        }
    }
}

impl ValidatorConfig {
    /// Parse from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on syntax errors or unknown fields.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on syntax errors or unknown fields.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }
}
