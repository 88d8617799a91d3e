//! Required-field evaluator — checks a matched rule's `required` clause.

use crate::compare;
use crate::{Condition, Diagnostics, FieldPolicy, FieldResolver, RequestView};
use tracing::debug;

/// Checks `required` conditions and appends violations to shared diagnostics.
///
/// Every condition is checked; nothing short-circuits. For keyed conditions
/// the field path is `{field} '{sub_key}'`, otherwise just `{field}`.
/// Policies triggered by a keyed check run after the comparison, whatever its
/// result.
#[derive(Debug, Clone, Copy)]
pub struct RequiredEvaluator<'a> {
    resolver: &'a FieldResolver,
    policies: &'a [Box<dyn FieldPolicy>],
}

impl<'a> RequiredEvaluator<'a> {
    /// Create an evaluator over a resolver and a set of policies.
    #[must_use]
    pub fn new(resolver: &'a FieldResolver, policies: &'a [Box<dyn FieldPolicy>]) -> Self {
        Self { resolver, policies }
    }

    /// Check every condition, appending to `diagnostics.violations`.
    ///
    /// Returns the number of violations added.
    pub fn evaluate(
        &self,
        required: &[Condition],
        request: &dyn RequestView,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        let before = diagnostics.violations.len();
        for condition in required {
            match condition {
                Condition::Direct { field, expected } => {
                    let actual = self.resolver.resolve(request, field, None);
                    debug!(field, %expected, %actual, "required check");
                    diagnostics
                        .violations
                        .extend(compare::check(field, expected, &actual));
                }
                Condition::Keyed { field, entries } => {
                    for (sub_key, expected) in entries {
                        let actual = self.resolver.resolve(request, field, Some(sub_key));
                        debug!(field, sub_key, %expected, %actual, "required check");
                        let path = format!("{field} '{sub_key}'");
                        diagnostics
                            .violations
                            .extend(compare::check(&path, expected, &actual));

                        for policy in self.policies {
                            if policy.triggers(field, sub_key, expected) {
                                debug!(policy = policy.name(), "policy triggered");
                                diagnostics
                                    .violations
                                    .extend(policy.check(request, self.resolver));
                            }
                        }
                    }
                }
            }
        }
        diagnostics.violations.len() - before
    }
}
