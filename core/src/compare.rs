//! Value comparator — does an actual value satisfy an expected one?
//!
//! Two regimes:
//!
//! - **Scalar** (neither side composite): strict value equality.
//! - **Membership** (either side composite): the actual value, taken as
//!   text, must equal, contain, or be contained by some element of the
//!   composite side. Mismatches are tagged `[OBJECT]` in diagnostics.
//!
//! `match` clauses never use membership; they go through
//! [`strictly_equals`].

use crate::{ExpectedValue, FieldValue, Violation};

/// Strict equality, as used by `match` clauses.
///
/// A `Set` is only strictly equal to a list holding the same scalars in the
/// same order.
///
/// ```
/// use gatecheck::{compare, FieldValue};
///
/// assert!(compare::strictly_equals(&"/api/v3".into(), &"/api/v3".into()));
/// assert!(!compare::strictly_equals(&"/api/v3".into(), &"/api/v3/".into()));
/// assert!(!compare::strictly_equals(&"x".into(), &FieldValue::Absent));
/// ```
#[must_use]
pub fn strictly_equals(expected: &ExpectedValue, actual: &FieldValue) -> bool {
    match expected {
        ExpectedValue::Scalar(scalar) => scalar.equals(actual),
        ExpectedValue::Set(items) => match actual {
            FieldValue::List(values) => {
                values.len() == items.len() && items.iter().zip(values).all(|(e, a)| e.equals(a))
            }
            _ => false,
        },
    }
}

/// Does `actual` satisfy `expected` for a `required` check?
///
/// `Absent` never satisfies anything.
///
/// ```
/// use gatecheck::{compare, ExpectedValue};
/// use serde_json::json;
///
/// let countries = ExpectedValue::from_json(&json!(["JP", "US", "KR"])).unwrap();
/// assert!(compare::satisfies(&countries, &"KR".into()));
/// assert!(!compare::satisfies(&countries, &"FR".into()));
/// ```
#[must_use]
pub fn satisfies(expected: &ExpectedValue, actual: &FieldValue) -> bool {
    if actual.is_absent() {
        return false;
    }
    if is_membership(expected, actual) {
        overlaps_any(expected, actual)
    } else {
        strictly_equals(expected, actual)
    }
}

/// Describe a failed comparison.
///
/// Composite comparisons yield [`Violation::MembershipMismatch`], scalar
/// ones [`Violation::FieldMismatch`].
#[must_use]
pub fn explain(path: &str, expected: &ExpectedValue, actual: &FieldValue) -> Violation {
    let path = path.to_string();
    let expected_text = expected.to_string();
    let actual_text = actual.to_string();
    if is_membership(expected, actual) {
        Violation::MembershipMismatch {
            path,
            actual: actual_text,
            expected: expected_text,
        }
    } else {
        Violation::FieldMismatch {
            path,
            actual: actual_text,
            expected: expected_text,
        }
    }
}

/// [`satisfies`] and [`explain`] in one step: `None` when satisfied.
#[must_use]
pub fn check(path: &str, expected: &ExpectedValue, actual: &FieldValue) -> Option<Violation> {
    if satisfies(expected, actual) {
        None
    } else {
        Some(explain(path, expected, actual))
    }
}

fn is_membership(expected: &ExpectedValue, actual: &FieldValue) -> bool {
    expected.is_set() || actual.is_composite()
}

fn overlaps_any(expected: &ExpectedValue, actual: &FieldValue) -> bool {
    let members = actual.member_texts();
    expected.elements().iter().any(|element| {
        let element = element.to_string();
        members.iter().any(|member| overlaps(member, &element))
    })
}

fn overlaps(actual: &str, element: &str) -> bool {
    actual == element
        || (!actual.is_empty()
            && !element.is_empty()
            && (actual.contains(element) || element.contains(actual)))
}
