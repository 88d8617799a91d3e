//! `FieldValue` and `ExpectedValue` — the two sides of every comparison
//!
//! [`FieldValue`] is what the accessor layer pulls out of a request.
//! [`ExpectedValue`] is what a rule demands, already classified as a scalar
//! or a membership set when the rule was loaded. Comparisons never inspect
//! runtime types ad hoc; they branch on these variants.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A value resolved from a request.
///
/// # Variants
///
/// - `Absent` — Nothing could be resolved (the typed "not found" result)
/// - `String` — Most common: urls, methods, header values
/// - `Number` — Numeric attributes
/// - `Bool` — Boolean attributes
/// - `List` — Multi-valued data, e.g. repeated headers
/// - `Map` — Nested attributes, e.g. a location record
///
/// # Example
///
/// ```
/// use gatecheck::FieldValue;
///
/// let value = FieldValue::from("POST");
/// assert_eq!(value.as_str(), Some("POST"));
/// assert!(!value.is_absent());
/// assert!(FieldValue::Absent.is_absent());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Nothing resolved. Never satisfies an expectation.
    #[default]
    Absent,

    /// String data.
    String(String),

    /// Numeric data.
    Number(f64),

    /// Boolean data.
    Bool(bool),

    /// Ordered multi-valued data.
    List(Vec<FieldValue>),

    /// Keyed nested data.
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Returns `true` if this is the `Absent` variant.
    #[inline]
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` for `List` and `Map`.
    #[inline]
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a number.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Index a `Map` by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// The first declared value.
    ///
    /// For a `List` this is its first element (or `Absent` when empty);
    /// every other variant is its own first value.
    #[must_use]
    pub fn first(&self) -> &FieldValue {
        match self {
            Self::List(items) => items.first().unwrap_or(&FieldValue::Absent),
            other => other,
        }
    }

    /// Interpret the value as a number, parsing strings.
    ///
    /// ```
    /// use gatecheck::FieldValue;
    ///
    /// assert_eq!(FieldValue::from("15").to_number(), Some(15.0));
    /// assert_eq!(FieldValue::Number(3.0).to_number(), Some(3.0));
    /// assert_eq!(FieldValue::from("abc").to_number(), None);
    /// ```
    #[must_use]
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Flatten into the string forms of its members.
    ///
    /// Composites yield one entry per (non-absent) element value; map keys are
    /// ignored. Scalars yield themselves; `Absent` yields nothing.
    #[must_use]
    pub fn member_texts(&self) -> Vec<String> {
        match self {
            Self::Absent => Vec::new(),
            Self::List(items) => items
                .iter()
                .filter(|item| !item.is_absent())
                .map(ToString::to_string)
                .collect(),
            Self::Map(map) => map
                .values()
                .filter(|item| !item.is_absent())
                .map(ToString::to_string)
                .collect(),
            scalar => vec![scalar.to_string()],
        }
    }

    /// Returns a string describing the variant, for logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Convert a JSON value. `null` becomes `Absent`.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::Absent, Self::Number),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Renders the way diagnostics quote values: lists and maps are
/// comma-joined member values, `Absent` is empty.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => Ok(()),
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write_number(f, *n),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(_) | Self::Map(_) => f.write_str(&self.member_texts().join(",")),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Expected values
// ═══════════════════════════════════════════════════════════════════════════════

/// A single expected scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Expected string.
    String(String),
    /// Expected number.
    Number(f64),
    /// Expected boolean.
    Bool(bool),
}

impl Scalar {
    /// Convert a JSON scalar. Returns `None` for `null`, arrays and objects.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Strict equality: same type, same value.
    #[must_use]
    pub fn equals(&self, actual: &FieldValue) -> bool {
        match (self, actual) {
            (Self::String(a), FieldValue::String(b)) => a == b,
            #[allow(clippy::float_cmp)]
            (Self::Number(a), FieldValue::Number(b)) => a == b,
            (Self::Bool(a), FieldValue::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write_number(f, *n),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// What a rule demands of a field.
///
/// The variant is fixed when the rule is loaded, from the shape of the
/// configuration: a scalar stays a scalar, a sequence or mapping of scalars
/// becomes a membership `Set` (mapping keys are dropped, values kept in order).
///
/// ```
/// use gatecheck::{ExpectedValue, Scalar};
/// use serde_json::json;
///
/// let expected = ExpectedValue::from_json(&json!(["JP", "US", "KR"])).unwrap();
/// assert!(expected.is_set());
/// assert_eq!(expected.to_string(), "JP,US,KR");
///
/// let expected = ExpectedValue::from_json(&json!("POST")).unwrap();
/// assert_eq!(expected, ExpectedValue::Scalar(Scalar::from("POST")));
///
/// assert!(ExpectedValue::from_json(&json!([["nested"]])).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedValue {
    /// Compared by strict value equality.
    Scalar(Scalar),
    /// Compared by membership.
    Set(Vec<Scalar>),
}

impl ExpectedValue {
    /// Classify a configuration value.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the value is `null` or nested
    /// deeper than one level.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Err("expected value must not be null".into()),
            Value::Array(items) => Self::set_from(items.iter()),
            Value::Object(map) => Self::set_from(map.values()),
            scalar => Scalar::from_json(scalar)
                .map(Self::Scalar)
                .ok_or_else(|| format!("unsupported expected value {scalar}")),
        }
    }

    fn set_from<'a>(items: impl Iterator<Item = &'a Value>) -> Result<Self, String> {
        items
            .map(|item| {
                Scalar::from_json(item)
                    .ok_or_else(|| format!("set members must be scalars, found {item}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Set)
    }

    /// Returns `true` for the `Set` variant.
    #[inline]
    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// The scalars making up this expectation (one for `Scalar`).
    #[must_use]
    pub fn elements(&self) -> &[Scalar] {
        match self {
            Self::Scalar(s) => std::slice::from_ref(s),
            Self::Set(items) => items,
        }
    }

    /// The expected string, when this is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Set(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ExpectedValue {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::from(s))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}
