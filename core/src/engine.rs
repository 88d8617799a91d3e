//! Validation engine — drives a rule set to one decision.
//!
//! Each call to [`Validator::validate`] runs a fresh [`Run`] through
//! `Idle → Evaluating → Decided`. All rules are evaluated; violations from
//! every matched rule are pooled into one [`Diagnostics`], and the decision
//! is made once, after the last rule.

use crate::evaluator::RequiredEvaluator;
use crate::{
    ConfigError, ContentLengthPolicy, Decision, Diagnostics, FieldPolicy, FieldResolver, Outcome,
    RejectResponse, RequestView, RuleEntry, RuleSet, RuleStep, StepStatus, ValidatorConfig,
    Violation,
};
use serde_json::Value;
use tracing::{debug, info};

/// Validates requests against rule sets.
///
/// Holds no per-request state: one `Validator` can be shared by any number
/// of concurrent validations.
///
/// # Example
///
/// ```
/// use gatecheck::{FieldValue, RequestView, Validator};
///
/// struct Req;
/// impl RequestView for Req {
///     fn attribute(&self, name: &str) -> Option<FieldValue> {
///         match name {
///             "url" => Some("/api/v3".into()),
///             "method" => Some("GET".into()),
///             _ => None,
///         }
///     }
/// }
///
/// let validator = Validator::default();
/// let rules = validator
///     .load_rules_json(r#"[{"match": {"url": "/api/v3"}, "required": {"method": "POST"}}]"#)
///     .unwrap();
///
/// let decision = validator.validate(&rules, &Req);
/// assert!(!decision.is_pass());
/// assert_eq!(
///     decision.diagnostics.messages(),
///     vec!["Invalid method: 'GET', required 'POST'"],
/// );
/// ```
#[derive(Debug)]
pub struct Validator {
    resolver: FieldResolver,
    policies: Vec<Box<dyn FieldPolicy>>,
    reject_status: u16,
}

impl Validator {
    /// Build a validator from configuration.
    #[must_use]
    pub fn new(config: &ValidatorConfig) -> Self {
        let mut policies: Vec<Box<dyn FieldPolicy>> = Vec::new();
        if config.content_length_policy {
            policies.push(Box::new(ContentLengthPolicy::new(config.min_content_length)));
        }
        Self {
            resolver: FieldResolver::new(config.callable_fields.iter().cloned()),
            policies,
            reject_status: config.reject_status,
        }
    }

    /// Add a cross-field policy.
    #[must_use]
    pub fn with_policy(mut self, policy: impl FieldPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    /// Replace the field resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: FieldResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// The field resolver (and with it the callable-field set).
    #[must_use]
    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    /// Status code used for rejects.
    #[must_use]
    pub fn reject_status(&self) -> u16 {
        self.reject_status
    }

    /// Load a rule set using this validator's callable-field set.
    ///
    /// # Errors
    ///
    /// See [`RuleSet::from_value`].
    pub fn load_rules(&self, value: &Value) -> Result<RuleSet, ConfigError> {
        RuleSet::from_value(value, &self.resolver)
    }

    /// Load a rule set from JSON text.
    ///
    /// # Errors
    ///
    /// See [`RuleSet::from_json`].
    pub fn load_rules_json(&self, text: &str) -> Result<RuleSet, ConfigError> {
        RuleSet::from_json(text, &self.resolver)
    }

    /// Load a rule set from YAML text.
    ///
    /// # Errors
    ///
    /// See [`RuleSet::from_yaml`].
    pub fn load_rules_yaml(&self, text: &str) -> Result<RuleSet, ConfigError> {
        RuleSet::from_yaml(text, &self.resolver)
    }

    /// Validate `request` against every rule in `rules`.
    ///
    /// Never fails: malformed entries and unresolvable fields become
    /// violations. Identical inputs always produce identical decisions.
    #[must_use]
    pub fn validate(&self, rules: &RuleSet, request: &dyn RequestView) -> Decision {
        let mut run = Run::new(self);
        run.begin();
        for (index, entry) in rules.iter().enumerate() {
            run.step(index, entry, request);
        }
        run.finish()
    }

    /// Validate and, on reject, build the response to send.
    #[must_use]
    pub fn check(&self, rules: &RuleSet, request: &dyn RequestView) -> Option<RejectResponse> {
        self.validate(rules, request).response(self.reject_status)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ValidatorConfig::default())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Run state machine
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a [`Run`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Created, no rule seen yet.
    Idle,
    /// Iterating the rule set.
    Evaluating,
    /// Decision produced; the run is spent.
    Decided,
}

/// One validation run: owns the diagnostics accumulator for one request.
struct Run<'v> {
    validator: &'v Validator,
    state: EngineState,
    diagnostics: Diagnostics,
    steps: Vec<RuleStep>,
}

impl<'v> Run<'v> {
    fn new(validator: &'v Validator) -> Self {
        Self {
            validator,
            state: EngineState::Idle,
            diagnostics: Diagnostics::default(),
            steps: Vec::new(),
        }
    }

    fn begin(&mut self) {
        debug_assert_eq!(self.state, EngineState::Idle);
        self.state = EngineState::Evaluating;
    }

    fn step(&mut self, index: usize, entry: &RuleEntry, request: &dyn RequestView) {
        debug_assert_eq!(self.state, EngineState::Evaluating);
        let status = match entry {
            RuleEntry::Malformed { reason, .. } => {
                self.diagnostics.violations.push(Violation::MalformedRule {
                    index,
                    reason: reason.clone(),
                });
                StepStatus::Malformed
            }
            RuleEntry::Rule(rule) => {
                let validator = self.validator;
                if rule.matches(request, &validator.resolver, &mut self.diagnostics.matched_rules) {
                    debug!(index, "rule matched");
                    let violations = RequiredEvaluator::new(&validator.resolver, &validator.policies)
                        .evaluate(&rule.required, request, &mut self.diagnostics);
                    StepStatus::Evaluated { violations }
                } else {
                    StepStatus::NotMatched
                }
            }
        };
        self.steps.push(RuleStep { index, status });
    }

    fn finish(mut self) -> Decision {
        debug_assert_eq!(self.state, EngineState::Evaluating);
        self.state = EngineState::Decided;
        let outcome = if self.diagnostics.violations.is_empty() {
            Outcome::Pass
        } else {
            Outcome::Reject
        };
        info!(
            ?outcome,
            rules = self.steps.len(),
            matched = self.steps.iter().filter(|s| s.matched()).count(),
            violations = self.diagnostics.violations.len(),
            "request validated"
        );
        Decision {
            outcome,
            diagnostics: self.diagnostics,
            steps: self.steps,
        }
    }
}
