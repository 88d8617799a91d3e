//! Diagnostics and the final decision for one validation run.
//!
//! A [`Decision`] carries the outcome, the diagnostics that go into a reject
//! body, and a per-rule trace of what the engine did. The trace is for
//! debugging only and is never part of the response.

use serde::{Serialize, Serializer};
use std::fmt;

/// HTTP status used for rejects unless configured otherwise.
pub const DEFAULT_REJECT_STATUS: u16 = 400;

/// One reason a request was rejected.
///
/// Each variant renders to the exact diagnostic string placed in the reject
/// body, and serializes as that string.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Scalar inequality.
    FieldMismatch {
        /// Field path, e.g. `method` or `getHeader 'Content-type'`.
        path: String,
        /// The value found on the request.
        actual: String,
        /// The value the rule demanded.
        expected: String,
    },
    /// Composite comparison failed (either side was a list or mapping).
    MembershipMismatch {
        /// Field path.
        path: String,
        /// The value found on the request.
        actual: String,
        /// The set the rule demanded.
        expected: String,
    },
    /// A JSON body was required but the declared length is missing or too small.
    ContentLengthTooShort {
        /// The raw `Content-Length` value(s) found.
        value: String,
        /// Configured minimum.
        minimum: u64,
    },
    /// A rule entry could not be loaded and was skipped.
    MalformedRule {
        /// Position in the rule set (0-based).
        index: usize,
        /// Why it was rejected at load time.
        reason: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldMismatch {
                path,
                actual,
                expected,
            } => write!(f, "Invalid {path}: '{actual}', required '{expected}'"),
            Self::MembershipMismatch {
                path,
                actual,
                expected,
            } => write!(
                f,
                "[OBJECT] Invalid {path}: '{actual}', required '{expected}'"
            ),
            Self::ContentLengthTooShort { value, minimum } => write!(
                f,
                "Invalid Content-length: '{value}', required bigger than '{minimum}'"
            ),
            Self::MalformedRule { index, reason } => {
                write!(f, "Malformed rule #{index} skipped: {reason}")
            }
        }
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Matched-rule notes and violations accumulated over one run.
///
/// Serializes to the reject body shape `{"match": [...], "error": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// One note per successful match comparison, e.g. `Matched rule 'url' => '/api/v3'`.
    #[serde(rename = "match")]
    pub matched_rules: Vec<String>,
    /// Every violation, pooled across all matched rules, in evaluation order.
    #[serde(rename = "error")]
    pub violations: Vec<Violation>,
}

impl Diagnostics {
    /// Violation messages as strings.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Pass or reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The request may proceed.
    Pass,
    /// The request is refused with a diagnostic body.
    Reject,
}

/// What happened to one rule entry during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The `match` clause was not fully satisfied (or absent).
    NotMatched,
    /// The rule matched; its `required` clause added this many violations.
    Evaluated {
        /// Violations contributed by this rule.
        violations: usize,
    },
    /// The entry was malformed and skipped.
    Malformed,
}

/// One rule entry's evaluation in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleStep {
    /// Position in the rule set (0-based).
    pub index: usize,
    /// What happened.
    pub status: StepStatus,
}

impl RuleStep {
    /// Did the rule's `match` clause hold?
    #[must_use]
    pub fn matched(&self) -> bool {
        matches!(self.status, StepStatus::Evaluated { .. })
    }
}

/// The final result of validating one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Reject iff `diagnostics.violations` is non-empty.
    pub outcome: Outcome,
    /// Notes and violations for the reject body.
    pub diagnostics: Diagnostics,
    /// One entry per rule, in rule-set order.
    pub steps: Vec<RuleStep>,
}

impl Decision {
    /// Returns `true` when the request may proceed.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// Turn a reject into a response; `None` on pass.
    ///
    /// ```
    /// use gatecheck::{Decision, Diagnostics, Outcome, Violation};
    ///
    /// let decision = Decision {
    ///     outcome: Outcome::Reject,
    ///     diagnostics: Diagnostics {
    ///         matched_rules: vec!["Matched rule 'url' => '/api/v3'".into()],
    ///         violations: vec![Violation::FieldMismatch {
    ///             path: "method".into(),
    ///             actual: "GET".into(),
    ///             expected: "POST".into(),
    ///         }],
    ///     },
    ///     steps: vec![],
    /// };
    ///
    /// let response = decision.response(400).unwrap();
    /// assert_eq!(response.status, 400);
    /// assert_eq!(
    ///     response.body_json().unwrap(),
    ///     r#"{"match":["Matched rule 'url' => '/api/v3'"],"error":["Invalid method: 'GET', required 'POST'"]}"#,
    /// );
    /// ```
    #[must_use]
    pub fn response(&self, status: u16) -> Option<RejectResponse> {
        match self.outcome {
            Outcome::Pass => None,
            Outcome::Reject => Some(RejectResponse {
                status,
                body: self.diagnostics.clone(),
            }),
        }
    }
}

/// A reject ready for the host pipeline to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectResponse {
    /// HTTP status code.
    pub status: u16,
    /// Diagnostic body.
    pub body: Diagnostics,
}

impl RejectResponse {
    /// The body as compact JSON.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn body_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.body)
    }
}
