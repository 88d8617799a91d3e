//! Cross-field policies hooked onto specific required checks.
//!
//! A [`FieldPolicy`] is triggered by a `(field, sub_key, expected)`
//! combination in a keyed `required` condition and may add one violation of
//! its own, independent of whether the triggering comparison passed.
//!
//! The only built-in policy is [`ContentLengthPolicy`]: requiring a JSON
//! content type also requires a declared body length of at least a minimum.

use crate::{ExpectedValue, FieldResolver, FieldValue, RequestView, Violation};
use std::fmt::Debug;

/// Default minimum `Content-Length` for JSON requests.
pub const DEFAULT_MIN_CONTENT_LENGTH: u64 = 10;

/// A policy attached to a keyed required check.
pub trait FieldPolicy: Send + Sync + Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Does checking `field[sub_key]` against `expected` trigger this policy?
    fn triggers(&self, field: &str, sub_key: &str, expected: &ExpectedValue) -> bool;

    /// Run the policy. `None` means the request complies.
    fn check(&self, request: &dyn RequestView, resolver: &FieldResolver) -> Option<Violation>;
}

/// Requires a minimum declared body length whenever a JSON content type is
/// required.
///
/// Triggered by `getHeader` / `Content-type` (sub-key compared
/// case-insensitively) / `application/json`. The first declared
/// `Content-Length` value must parse as a number no smaller than the
/// minimum; absent, empty, non-numeric, or non-finite values fail.
///
/// # Example
///
/// ```
/// use gatecheck::{ContentLengthPolicy, FieldPolicy};
///
/// let policy = ContentLengthPolicy::new(32);
/// assert_eq!(policy.minimum(), 32);
/// assert!(policy.triggers("getHeader", "content-type", &"application/json".into()));
/// assert!(!policy.triggers("getHeader", "Content-type", &"text/plain".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLengthPolicy {
    field: String,
    sub_key: String,
    content_type: String,
    length_header: String,
    minimum: u64,
}

impl ContentLengthPolicy {
    /// Create the policy with the standard trigger and the given minimum.
    #[must_use]
    pub fn new(minimum: u64) -> Self {
        Self {
            field: "getHeader".into(),
            sub_key: "Content-type".into(),
            content_type: "application/json".into(),
            length_header: "Content-Length".into(),
            minimum,
        }
    }

    /// Override the triggering field, sub-key and content type.
    #[must_use]
    pub fn triggered_by(
        mut self,
        field: impl Into<String>,
        sub_key: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        self.field = field.into();
        self.sub_key = sub_key.into();
        self.content_type = content_type.into();
        self
    }

    /// Override the header holding the declared length.
    #[must_use]
    pub fn length_header(mut self, header: impl Into<String>) -> Self {
        self.length_header = header.into();
        self
    }

    /// The configured minimum.
    #[must_use]
    pub fn minimum(&self) -> u64 {
        self.minimum
    }

    #[allow(clippy::cast_precision_loss)]
    fn is_too_short(&self, declared: &FieldValue) -> bool {
        declared
            .first()
            .to_number()
            .filter(|length| length.is_finite())
            .map_or(true, |length| length < self.minimum as f64)
    }
}

impl Default for ContentLengthPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONTENT_LENGTH)
    }
}

impl FieldPolicy for ContentLengthPolicy {
    fn name(&self) -> &'static str {
        "content_length"
    }

    fn triggers(&self, field: &str, sub_key: &str, expected: &ExpectedValue) -> bool {
        field == self.field
            && sub_key.eq_ignore_ascii_case(&self.sub_key)
            && expected.as_str() == Some(self.content_type.as_str())
    }

    fn check(&self, request: &dyn RequestView, resolver: &FieldResolver) -> Option<Violation> {
        let declared = resolver.resolve(request, &self.field, Some(&self.length_header));
        if !self.is_too_short(&declared) {
            return None;
        }
        tracing::debug!(declared = %declared, minimum = self.minimum, "content length too short");
        Some(Violation::ContentLengthTooShort {
            value: declared.to_string(),
            minimum: self.minimum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessError;

    #[derive(Debug)]
    struct Headers(Vec<(&'static str, FieldValue)>);

    impl RequestView for Headers {
        fn attribute(&self, _name: &str) -> Option<FieldValue> {
            None
        }

        fn call(&self, name: &str, arg: &str) -> Result<FieldValue, AccessError> {
            if name != "getHeader" {
                return Err(AccessError::NotCallable(name.to_string()));
            }
            Ok(self
                .0
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(arg))
                .map(|(_, v)| v.clone())
                .unwrap_or_default())
        }
    }

    fn check(length: FieldValue) -> Option<Violation> {
        let request = Headers(vec![("Content-Length", length)]);
        ContentLengthPolicy::default().check(&request, &FieldResolver::default())
    }

    #[test]
    fn test_long_enough() {
        assert!(check(FieldValue::from(vec!["15"])).is_none());
        assert!(check(FieldValue::from(vec!["10"])).is_none());
        assert!(check(FieldValue::Number(42.0)).is_none());
    }

    #[test]
    fn test_too_short() {
        let v = check(FieldValue::from(vec!["9"])).unwrap();
        assert_eq!(
            v.to_string(),
            "Invalid Content-length: '9', required bigger than '10'"
        );
    }

    #[test]
    fn test_only_first_value_counts() {
        assert!(check(FieldValue::from(vec!["100", "1"])).is_none());
        assert!(check(FieldValue::from(vec!["1", "100"])).is_some());
    }

    #[test]
    fn test_missing_or_empty() {
        let v = check(FieldValue::Absent).unwrap();
        assert_eq!(
            v.to_string(),
            "Invalid Content-length: '', required bigger than '10'"
        );
        assert!(check(FieldValue::List(vec![])).is_some());
        assert!(check(FieldValue::from(vec![""])).is_some());
        assert!(check(FieldValue::from(vec!["abc"])).is_some());
        assert!(check(FieldValue::from(vec!["NaN"])).is_some());
        assert!(check(FieldValue::from(vec!["inf"])).is_some());
        assert!(check(FieldValue::Number(f64::NAN)).is_some());
    }

    #[test]
    fn test_custom_minimum() {
        let request = Headers(vec![("Content-Length", FieldValue::from(vec!["15"]))]);
        let policy = ContentLengthPolicy::new(20);
        assert!(policy.check(&request, &FieldResolver::default()).is_some());
    }

    #[test]
    fn test_trigger_requires_exact_combination() {
        let policy = ContentLengthPolicy::default();
        assert!(policy.triggers("getHeader", "Content-type", &"application/json".into()));
        assert!(policy.triggers("getHeader", "Content-Type", &"application/json".into()));
        assert!(!policy.triggers("userLocation", "Content-type", &"application/json".into()));
        assert!(!policy.triggers("getHeader", "Accept", &"application/json".into()));
        let set = ExpectedValue::from_json(&serde_json::json!(["application/json"])).unwrap();
        assert!(!policy.triggers("getHeader", "Content-type", &set));
    }

    #[test]
    fn test_retargeted_policy() {
        let policy = ContentLengthPolicy::new(1)
            .triggered_by("getHeader", "Content-type", "application/xml")
            .length_header("X-Body-Length");
        assert!(policy.triggers("getHeader", "Content-type", &"application/xml".into()));
        let request = Headers(vec![("X-Body-Length", FieldValue::from(vec!["5"]))]);
        assert!(policy.check(&request, &FieldResolver::default()).is_none());
    }
}
