//! gatecheck-http: HTTP request view for gatecheck
//!
//! Provides [`HttpRequest`], an owned request that implements
//! [`RequestView`](gatecheck::RequestView):
//!
//! | Field | Kind | Value |
//! |-------|------|-------|
//! | `url`, `path`, `query`, `method`, `scheme`, `host` | attribute | string |
//! | `queryParams` | attribute | mapping of query parameters |
//! | `getHeader` | callable | one value as string, several as list |
//! | `userLocation` | callable (and mapping attribute) | string |
//!
//! `Content-Length` is always reported as a list of its raw values.
//!
//! # Example
//!
//! ```
//! use gatecheck_http::prelude::*;
//!
//! let validator = Validator::default();
//! let rules = validator
//!     .load_rules_json(
//!         r#"[{"match": {"url": "/api/v3"}, "required": {"method": "POST"}}]"#,
//!     )
//!     .unwrap();
//!
//! let request = HttpRequest::builder().url("/api/v3").method("GET").build();
//! let response = validator.check(&rules, &request).unwrap();
//! assert_eq!(response.status, 400);
//! ```

mod query;
mod request;

pub use query::{get_query_param, parse_path_only, parse_query_string};
pub use request::{HttpRequest, HttpRequestBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{HttpRequest, HttpRequestBuilder};
    pub use gatecheck::prelude::*;
}
