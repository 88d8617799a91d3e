//! gatecheck - declarative request validation
//!
//! Decides whether an incoming request may proceed, given an ordered set of
//! rules, and explains every reason when it may not.
//!
//! # Architecture
//!
//! - [`FieldResolver`] — Resolves fields from a [`RequestView`], call-style then property-style
//! - [`compare`] — Scalar equality and composite membership
//! - [`Rule::matches`] — The `match` clause: a conjunction of strict equalities
//! - [`RequiredEvaluator`] — The `required` clause, plus [`FieldPolicy`] hooks
//! - [`Validator`] — Drives a [`RuleSet`] to one [`Decision`]
//!
//! # Key Design Points
//!
//! 1. **Everything is evaluated**: every rule, every condition. Violations from
//!    all matched rules are pooled and the decision is made once, at the end.
//!
//! 2. **Shapes are decided at load time**: [`ExpectedValue`] is `Scalar` or
//!    `Set` before any request is seen; callable fields are known to the loader.
//!
//! 3. **Nothing throws**: unresolvable fields are [`FieldValue::Absent`],
//!    malformed rules become [`Violation::MalformedRule`].
//!
//! # Example
//!
//! ```
//! use gatecheck::prelude::*;
//! use std::collections::HashMap;
//!
//! #[derive(Debug)]
//! struct Request {
//!     url: String,
//!     method: String,
//!     headers: HashMap<String, Vec<String>>,
//! }
//!
//! impl RequestView for Request {
//!     fn attribute(&self, name: &str) -> Option<FieldValue> {
//!         match name {
//!             "url" => Some(self.url.as_str().into()),
//!             "method" => Some(self.method.as_str().into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn call(&self, name: &str, arg: &str) -> Result<FieldValue, AccessError> {
//!         if name != "getHeader" {
//!             return Err(AccessError::NotCallable(name.to_string()));
//!         }
//!         Ok(match self.headers.get(arg).map(Vec::as_slice) {
//!             Some([one]) if arg != "Content-Length" => one.as_str().into(),
//!             Some(values) => values.to_vec().into(),
//!             None => FieldValue::Absent,
//!         })
//!     }
//! }
//!
//! let validator = Validator::default();
//! let rules = validator
//!     .load_rules_json(
//!         r#"[{
//!             "match": {"url": "/api/v3"},
//!             "required": {"method": "POST", "getHeader": {"Content-type": "application/json"}}
//!         }]"#,
//!     )
//!     .unwrap();
//!
//! let request = Request {
//!     url: "/api/v3".into(),
//!     method: "POST".into(),
//!     headers: HashMap::from([
//!         ("Content-type".into(), vec!["application/json".into()]),
//!         ("Content-Length".into(), vec!["15".into()]),
//!     ]),
//! };
//!
//! assert!(validator.validate(&rules, &request).is_pass());
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod access;
pub mod compare;
mod config;
mod decision;
mod engine;
mod evaluator;
mod matcher;
mod policy;
mod rule;
mod value;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Values
pub use value::{ExpectedValue, FieldValue, Scalar};

// Field access
pub use access::{
    AccessError, AccessStrategy, CallStrategy, FieldResolver, PropertyStrategy, RequestView,
    Resolution, DEFAULT_CALLABLE_FIELDS,
};

// Rules
pub use rule::{Condition, Rule, RuleEntry, RuleSet};

// Evaluation
pub use config::ValidatorConfig;
pub use engine::{EngineState, Validator};
pub use evaluator::RequiredEvaluator;
pub use policy::{ContentLengthPolicy, FieldPolicy, DEFAULT_MIN_CONTENT_LENGTH};

// Results
pub use decision::{
    Decision, Diagnostics, Outcome, RejectResponse, RuleStep, StepStatus, Violation,
    DEFAULT_REJECT_STATUS,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use gatecheck::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Field access
        AccessError,
        // Errors
        ConfigError,
        // Results
        Decision,
        Diagnostics,
        // Values
        ExpectedValue,
        FieldResolver,
        FieldValue,
        Outcome,
        RejectResponse,
        RequestView,
        // Rules
        Rule,
        RuleSet,
        // Evaluation
        Validator,
        ValidatorConfig,
        Violation,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from loading rules or configuration.
///
/// These happen at load time, before any request is validated. Validation
/// itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON syntax or shape error.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML syntax or shape error.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The rule set root was not a sequence.
    #[error("rule set must be a sequence of rules, found {found}")]
    NotASequence {
        /// JSON type actually found.
        found: &'static str,
    },

    /// A configuration file could not be read.
    #[error("failed to read \"{path}\": {source}")]
    Io {
        /// The path that was read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
