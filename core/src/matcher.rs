//! Rule matcher — does a rule's `match` clause apply to this request?
//!
//! Every condition is a strict equality and the clause is their conjunction.
//! All conditions are evaluated, even after one fails, and each successful
//! comparison leaves a note. The notes therefore record partial matches too.

use crate::compare::strictly_equals;
use crate::{Condition, ExpectedValue, FieldResolver, FieldValue, RequestView, Rule};
use tracing::debug;

impl Rule {
    /// Returns `true` if this rule has a non-empty `match` clause.
    ///
    /// Rules without one never apply.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        !self.match_clause.is_empty()
    }

    /// Evaluate the `match` clause.
    ///
    /// Appends `Matched rule '{field}' => '{expected}'` to `notes` for each
    /// condition that holds. Returns `true` only if every condition holds and
    /// there is at least one.
    ///
    /// # Example
    ///
    /// ```
    /// use gatecheck::{Condition, FieldResolver, FieldValue, RequestView, Rule};
    ///
    /// struct Req;
    /// impl RequestView for Req {
    ///     fn attribute(&self, name: &str) -> Option<FieldValue> {
    ///         (name == "url").then(|| FieldValue::from("/api/v3"))
    ///     }
    /// }
    ///
    /// let rule = Rule::new(
    ///     vec![Condition::Direct { field: "url".into(), expected: "/api/v3".into() }],
    ///     vec![],
    /// );
    /// let mut notes = Vec::new();
    /// assert!(rule.matches(&Req, &FieldResolver::default(), &mut notes));
    /// assert_eq!(notes, vec!["Matched rule 'url' => '/api/v3'".to_string()]);
    /// ```
    pub fn matches(
        &self,
        request: &dyn RequestView,
        resolver: &FieldResolver,
        notes: &mut Vec<String>,
    ) -> bool {
        if !self.is_applicable() {
            return false;
        }

        let mut all_matched = true;
        for condition in &self.match_clause {
            match condition {
                Condition::Direct { field, expected } => {
                    let actual = resolver.resolve(request, field, None);
                    all_matched &= record(field, expected, &actual, notes);
                }
                Condition::Keyed { field, entries } => {
                    for (sub_key, expected) in entries {
                        let actual = resolver.resolve(request, field, Some(sub_key));
                        let path = format!("{field} '{sub_key}'");
                        all_matched &= record(&path, expected, &actual, notes);
                    }
                }
            }
        }
        all_matched
    }
}

fn record(
    path: &str,
    expected: &ExpectedValue,
    actual: &FieldValue,
    notes: &mut Vec<String>,
) -> bool {
    let matched = strictly_equals(expected, actual);
    if matched {
        let note = format!("Matched rule '{path}' => '{expected}'");
        debug!("{note}");
        notes.push(note);
    } else {
        debug!(path, %expected, %actual, "match condition failed");
    }
    matched
}
