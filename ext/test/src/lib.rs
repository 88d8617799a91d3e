//! gatecheck-test: Test domain for conformance testing
//!
//! Provides [`JsonRequest`], a request view over a plain JSON object. It
//! exposes attributes only, so callable fields (`getHeader`, `userLocation`)
//! always resolve through the property fallback. This is the reference
//! request view used by the fixture runner and the CLI.
//!
//! # Example
//!
//! ```
//! use gatecheck_test::prelude::*;
//! use serde_json::json;
//!
//! let request = JsonRequest::new(json!({
//!     "method": "POST",
//!     "getHeader": {"Content-type": "application/json"}
//! }));
//!
//! let resolver = FieldResolver::default();
//! assert_eq!(
//!     resolver.resolve(&request, "getHeader", Some("Content-type")),
//!     FieldValue::from("application/json"),
//! );
//! ```

use gatecheck::{FieldValue, RequestView};
use serde_json::{Map, Value};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Test request: a JSON object whose top-level keys are attributes.
///
/// Nested objects become [`FieldValue::Map`], which is what the property
/// fallback indexes into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonRequest {
    fields: Map<String, Value>,
}

impl JsonRequest {
    /// Wrap a JSON value. Anything other than an object yields an empty request.
    #[must_use]
    pub fn new(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Parse a request from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the parse error when `text` is not valid JSON.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text).map(Self::new)
    }

    /// Add a top-level attribute (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Get a raw attribute by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl From<Value> for JsonRequest {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl RequestView for JsonRequest {
    fn attribute(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).map(FieldValue::from_json)
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::JsonRequest;
    pub use gatecheck::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatecheck::{FieldResolver, Validator};
    use serde_json::json;

    #[test]
    fn test_attributes_and_nesting() {
        let request = JsonRequest::new(json!({
            "url": "/api/v3",
            "getHeader": {"Content-Length": ["15"]},
            "userLocation": {"country": "KR"}
        }));
        assert_eq!(request.attribute("url"), Some(FieldValue::from("/api/v3")));
        assert_eq!(request.attribute("method"), None);

        let resolver = FieldResolver::default();
        assert_eq!(
            resolver.resolve(&request, "getHeader", Some("Content-Length")),
            FieldValue::from(vec!["15"])
        );
        assert_eq!(
            resolver.resolve(&request, "userLocation", Some("country")),
            FieldValue::from("KR")
        );
        assert!(resolver
            .resolve(&request, "getHeader", Some("Host"))
            .is_absent());
    }

    #[test]
    fn test_non_object_is_empty() {
        let request = JsonRequest::new(json!(["url", "/api/v3"]));
        assert_eq!(request, JsonRequest::default());
        assert!(request.call("getHeader", "Host").is_err());
    }

    #[test]
    fn test_builder() {
        let request = JsonRequest::default()
            .with("method", "POST")
            .with("userLocation", json!({"country": "JP"}));
        assert_eq!(request.get("method"), Some(&json!("POST")));
    }

    #[test]
    fn test_property_only_view_validates() {
        let validator = Validator::default();
        let rules = validator
            .load_rules(&json!([{
                "match": {"method": "POST"},
                "required": {"userLocation": {"country": ["JP", "US", "KR"]}}
            }]))
            .unwrap();

        let request = JsonRequest::new(json!({
            "method": "POST",
            "userLocation": {"country": "US"}
        }));
        assert!(validator.validate(&rules, &request).is_pass());

        let request = JsonRequest::new(json!({"method": "POST"}));
        assert!(!validator.validate(&rules, &request).is_pass());
    }
}
