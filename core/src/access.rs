//! Field accessor layer — pulls named fields out of an opaque request
//!
//! A request exposes plain attributes (`url`, `method`, ...) and compound
//! fields keyed by a sub-key (`getHeader` by header name, `userLocation` by
//! attribute). Different request views expose the same compound field either
//! as something callable or as a nested mapping, so the [`FieldResolver`]
//! tries a call-style strategy first and falls back to property-style
//! indexing. Failures never escape: an unresolvable field is
//! [`FieldValue::Absent`].

use crate::FieldValue;
use std::collections::BTreeSet;
use std::fmt::Debug;
use tracing::debug;

/// Compound fields resolved through a sub-key unless configured otherwise.
pub const DEFAULT_CALLABLE_FIELDS: &[&str] = &["getHeader", "userLocation"];

/// Why a call-style lookup did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The request has no callable by this name.
    #[error("`{0}` is not callable on this request")]
    NotCallable(String),

    /// The callable exists but refused the argument.
    #[error("`{field}({arg})` failed: {reason}")]
    Failed {
        /// The callable field.
        field: String,
        /// The sub-key passed to it.
        arg: String,
        /// What went wrong.
        reason: String,
    },
}

/// The request under validation, as seen by the validator.
///
/// Implementors expose direct attributes and, optionally, call-style lookups
/// for compound fields. The validator only reads through this trait.
///
/// # Example
///
/// ```
/// use gatecheck::{FieldValue, RequestView};
///
/// struct Probe;
///
/// impl RequestView for Probe {
///     fn attribute(&self, name: &str) -> Option<FieldValue> {
///         (name == "method").then(|| FieldValue::from("GET"))
///     }
/// }
///
/// assert_eq!(Probe.attribute("method"), Some(FieldValue::from("GET")));
/// assert!(Probe.call("getHeader", "Host").is_err());
/// ```
pub trait RequestView {
    /// Resolve a direct attribute. `None` when the request has no such attribute.
    fn attribute(&self, name: &str) -> Option<FieldValue>;

    /// Invoke the callable named `name` with `arg`.
    ///
    /// A successful call may still return [`FieldValue::Absent`] (e.g. a
    /// missing header); only an `Err` triggers the property fallback.
    ///
    /// # Errors
    ///
    /// The default implementation reports [`AccessError::NotCallable`].
    fn call(&self, name: &str, arg: &str) -> Result<FieldValue, AccessError> {
        let _ = arg;
        Err(AccessError::NotCallable(name.to_string()))
    }

    /// Index the attribute named `name` as a mapping, then by `key`.
    fn property(&self, name: &str, key: &str) -> Option<FieldValue> {
        match self.attribute(name)? {
            FieldValue::Map(mut map) => map.remove(key),
            _ => None,
        }
    }
}

impl<T: RequestView + ?Sized> RequestView for &T {
    fn attribute(&self, name: &str) -> Option<FieldValue> {
        (**self).attribute(name)
    }

    fn call(&self, name: &str, arg: &str) -> Result<FieldValue, AccessError> {
        (**self).call(name, arg)
    }

    fn property(&self, name: &str, key: &str) -> Option<FieldValue> {
        (**self).property(name, key)
    }
}

/// Outcome of one strategy's attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The strategy produced a value (which may itself be `Absent`).
    Found(FieldValue),
    /// The strategy could not resolve the field; try the next one.
    NotFound,
}

/// One way of resolving a keyed field.
pub trait AccessStrategy: Send + Sync + Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Attempt to resolve `field[sub_key]`.
    fn resolve(&self, request: &dyn RequestView, field: &str, sub_key: &str) -> Resolution;
}

/// Call-style: `request.field(sub_key)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallStrategy;

impl AccessStrategy for CallStrategy {
    fn name(&self) -> &'static str {
        "call"
    }

    fn resolve(&self, request: &dyn RequestView, field: &str, sub_key: &str) -> Resolution {
        match request.call(field, sub_key) {
            Ok(value) => Resolution::Found(value),
            Err(error) => {
                debug!(field, sub_key, %error, "call-style lookup failed");
                Resolution::NotFound
            }
        }
    }
}

/// Property-style: `request.field[sub_key]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyStrategy;

impl AccessStrategy for PropertyStrategy {
    fn name(&self) -> &'static str {
        "property"
    }

    fn resolve(&self, request: &dyn RequestView, field: &str, sub_key: &str) -> Resolution {
        request
            .property(field, sub_key)
            .map_or(Resolution::NotFound, Resolution::Found)
    }
}

/// Resolves fields from a [`RequestView`], knowing which ones are callable.
///
/// Callable fields go through the strategy chain (call, then property by
/// default); everything else is a direct attribute.
///
/// # Example
///
/// ```
/// use gatecheck::{FieldResolver, FieldValue, RequestView};
/// use std::collections::BTreeMap;
///
/// struct Nested;
///
/// impl RequestView for Nested {
///     fn attribute(&self, name: &str) -> Option<FieldValue> {
///         match name {
///             "userLocation" => Some(FieldValue::Map(BTreeMap::from([
///                 ("country".to_string(), FieldValue::from("KR")),
///             ]))),
///             _ => None,
///         }
///     }
/// }
///
/// let resolver = FieldResolver::default();
/// // Not callable on `Nested`, so the property fallback answers.
/// assert_eq!(
///     resolver.resolve(&Nested, "userLocation", Some("country")),
///     FieldValue::from("KR"),
/// );
/// assert_eq!(resolver.resolve(&Nested, "url", None), FieldValue::Absent);
/// ```
#[derive(Debug)]
pub struct FieldResolver {
    callable: BTreeSet<String>,
    strategies: Vec<Box<dyn AccessStrategy>>,
}

impl FieldResolver {
    /// Create a resolver treating `callable` as the compound fields.
    pub fn new<I, S>(callable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            callable: callable.into_iter().map(Into::into).collect(),
            strategies: vec![Box::new(CallStrategy), Box::new(PropertyStrategy)],
        }
    }

    /// Replace the strategy chain. Strategies are tried in order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn AccessStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Returns `true` if `field` is resolved through a sub-key.
    #[must_use]
    pub fn is_callable(&self, field: &str) -> bool {
        self.callable.contains(field)
    }

    /// The registered callable fields.
    pub fn callable_fields(&self) -> impl Iterator<Item = &str> {
        self.callable.iter().map(String::as_str)
    }

    /// Resolve `field` (keyed by `sub_key` when callable).
    ///
    /// Never fails: anything unresolvable is [`FieldValue::Absent`].
    pub fn resolve(
        &self,
        request: &dyn RequestView,
        field: &str,
        sub_key: Option<&str>,
    ) -> FieldValue {
        match sub_key {
            Some(key) if self.is_callable(field) => self.resolve_keyed(request, field, key),
            _ => request.attribute(field).unwrap_or_default(),
        }
    }

    fn resolve_keyed(&self, request: &dyn RequestView, field: &str, sub_key: &str) -> FieldValue {
        for strategy in &self.strategies {
            if let Resolution::Found(value) = strategy.resolve(request, field, sub_key) {
                debug!(field, sub_key, strategy = strategy.name(), "resolved");
                return value;
            }
        }
        debug!(field, sub_key, "no strategy resolved field");
        FieldValue::Absent
    }
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CALLABLE_FIELDS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Exposes `getHeader` as a callable, `userLocation` as a nested map.
    #[derive(Debug)]
    struct MixedRequest;

    impl RequestView for MixedRequest {
        fn attribute(&self, name: &str) -> Option<FieldValue> {
            match name {
                "method" => Some("POST".into()),
                "userLocation" => Some(FieldValue::Map(BTreeMap::from([(
                    "country".to_string(),
                    FieldValue::from("JP"),
                )]))),
                _ => None,
            }
        }

        fn call(&self, name: &str, arg: &str) -> Result<FieldValue, AccessError> {
            match (name, arg) {
                ("getHeader", "Content-type") => Ok("application/json".into()),
                ("getHeader", _) => Ok(FieldValue::Absent),
                _ => Err(AccessError::NotCallable(name.to_string())),
            }
        }
    }

    #[test]
    fn test_call_strategy_wins() {
        let resolver = FieldResolver::default();
        let value = resolver.resolve(&MixedRequest, "getHeader", Some("Content-type"));
        assert_eq!(value, FieldValue::from("application/json"));
    }

    #[test]
    fn test_successful_call_returning_absent_does_not_fall_back() {
        let resolver = FieldResolver::default();
        let value = resolver.resolve(&MixedRequest, "getHeader", Some("X-Missing"));
        assert_eq!(value, FieldValue::Absent);
    }

    #[test]
    fn test_property_fallback() {
        let resolver = FieldResolver::default();
        let value = resolver.resolve(&MixedRequest, "userLocation", Some("country"));
        assert_eq!(value, FieldValue::from("JP"));
    }

    #[test]
    fn test_unresolvable_is_absent() {
        let resolver = FieldResolver::default();
        assert!(resolver
            .resolve(&MixedRequest, "userLocation", Some("city"))
            .is_absent());
        assert!(resolver.resolve(&MixedRequest, "scheme", None).is_absent());
    }

    #[test]
    fn test_non_callable_ignores_sub_key() {
        let resolver = FieldResolver::default();
        assert_eq!(
            resolver.resolve(&MixedRequest, "method", Some("ignored")),
            FieldValue::from("POST")
        );
    }

    #[test]
    fn test_custom_callable_set() {
        let resolver = FieldResolver::new(["getHeader"]);
        assert!(resolver.is_callable("getHeader"));
        assert!(!resolver.is_callable("userLocation"));
        // userLocation is now a direct attribute: the whole map comes back.
        assert!(matches!(
            resolver.resolve(&MixedRequest, "userLocation", Some("country")),
            FieldValue::Map(_)
        ));
    }

    #[test]
    fn test_property_only_chain() {
        let resolver = FieldResolver::default().with_strategies(vec![Box::new(PropertyStrategy)]);
        assert!(resolver
            .resolve(&MixedRequest, "getHeader", Some("Content-type"))
            .is_absent());
    }

    #[test]
    fn test_resolver_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldResolver>();
    }
}
