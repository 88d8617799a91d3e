//! `HttpRequest`: an owned HTTP request exposed to the validator.

use crate::query::{get_query_param, parse_path_only, parse_query_string};
use gatecheck::{AccessError, FieldValue, RequestView};
use std::collections::{BTreeMap, HashMap};

/// Header whose values are always reported as a list.
const CONTENT_LENGTH: &str = "content-length";

/// HTTP request context for validation.
///
/// Attributes: `url` (full request target), `path`, `query` (the raw query
/// string), `queryParams` (a mapping of query parameters), `method`,
/// `scheme`, `host`, and `userLocation` (a mapping). Callables: `getHeader(name)` and `userLocation(key)`.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    url: String,
    method: String,
    scheme: String,
    host: String,
    headers: HashMap<String, Vec<String>>,
    location: BTreeMap<String, String>,
}

impl HttpRequest {
    /// Create a builder for `HttpRequest`.
    #[must_use]
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Get the full request target, query string included.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        parse_path_only(&self.url)
    }

    /// Get the raw query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        parse_query_string(&self.url)
    }

    /// Get a query parameter by name.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        get_query_param(self.query()?, name)
    }

    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the scheme.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get every value of a header (case-insensitive), in arrival order.
    #[must_use]
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_lowercase())
            .map_or(&[][..], Vec::as_slice)
    }

    /// Get the first value of a header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().map(String::as_str)
    }

    /// Get a user-location attribute.
    #[must_use]
    pub fn location(&self, key: &str) -> Option<&str> {
        self.location.get(key).map(String::as_str)
    }

    fn header_field(&self, name: &str) -> FieldValue {
        let values = self.header_values(name);
        match values {
            [] => FieldValue::Absent,
            [one] if !name.eq_ignore_ascii_case(CONTENT_LENGTH) => one.as_str().into(),
            _ => values.to_vec().into(),
        }
    }

    fn query_params_field(&self) -> FieldValue {
        let Some(query) = self.query() else {
            return FieldValue::Absent;
        };
        let mut params = BTreeMap::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params
                .entry(key.to_string())
                .or_insert_with(|| FieldValue::from(value));
        }
        FieldValue::Map(params)
    }
}

impl RequestView for HttpRequest {
    fn attribute(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "url" => self.url.as_str().into(),
            "path" => self.path().into(),
            "query" => self.query().map_or(FieldValue::Absent, Into::into),
            "queryParams" => self.query_params_field(),
            "method" => self.method.as_str().into(),
            "scheme" => self.scheme.as_str().into(),
            "host" => self.host.as_str().into(),
            "userLocation" => FieldValue::Map(
                self.location
                    .iter()
                    .map(|(k, v)| (k.clone(), v.as_str().into()))
                    .collect(),
            ),
            _ => return None,
        };
        Some(value)
    }

    fn call(&self, name: &str, arg: &str) -> Result<FieldValue, AccessError> {
        match name {
            "getHeader" => Ok(self.header_field(arg)),
            "userLocation" => Ok(self.location(arg).into()),
            _ => Err(AccessError::NotCallable(name.to_string())),
        }
    }
}

/// Builder for `HttpRequest`.
#[derive(Debug, Default)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    /// Set the request target (path plus optional query string).
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.request.url = url.into();
        self
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.method = method.into();
        self
    }

    /// Set the scheme.
    #[must_use]
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.request.scheme = scheme.into();
        self
    }

    /// Set the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.request.host = host.into();
        self
    }

    /// Add a header value. Repeated names accumulate; lookup is case-insensitive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .headers
            .entry(name.into().to_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Set a user-location attribute.
    #[must_use]
    pub fn location(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.location.insert(key.into(), value.into());
        self
    }

    /// Build the `HttpRequest`.
    #[must_use]
    pub fn build(self) -> HttpRequest {
        self.request
    }
}
