//! Rules and rule sets, loaded from configuration data.
//!
//! The configuration grammar is a sequence of rules:
//!
//! ```json
//! [
//!   {
//!     "match":    { "url": "/api/v3" },
//!     "required": { "method": "POST", "getHeader": { "Content-type": "application/json" } }
//!   }
//! ]
//! ```
//!
//! Loading classifies every expected value ([`ExpectedValue`]) and every
//! field as direct or keyed (callable) up front, so evaluation never inspects
//! configuration shapes. An entry that cannot be loaded is kept as
//! [`RuleEntry::Malformed`] and reported when the rule set is validated.

use crate::{ConfigError, ExpectedValue, FieldResolver};
use serde_json::{Map, Value};

/// A single field condition inside a `match` or `required` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A direct attribute compared against one expectation.
    Direct {
        /// Attribute name, e.g. `method`.
        field: String,
        /// What the attribute must be.
        expected: ExpectedValue,
    },
    /// A callable field with one expectation per sub-key.
    Keyed {
        /// Callable field name, e.g. `getHeader`.
        field: String,
        /// `(sub_key, expected)` pairs in configuration order.
        entries: Vec<(String, ExpectedValue)>,
    },
}

impl Condition {
    /// The field this condition is about.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Direct { field, .. } | Self::Keyed { field, .. } => field,
        }
    }
}

/// A `match` clause gating a `required` clause.
///
/// A rule with an empty `match` clause never applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    /// Conjunction of strict equalities.
    pub match_clause: Vec<Condition>,
    /// Conditions checked once the rule matches.
    pub required: Vec<Condition>,
}

impl Rule {
    /// Create a rule from its two clauses.
    #[must_use]
    pub fn new(match_clause: Vec<Condition>, required: Vec<Condition>) -> Self {
        Self {
            match_clause,
            required,
        }
    }
}

/// One position in a [`RuleSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEntry {
    /// A loaded rule.
    Rule(Rule),
    /// An entry that failed to load.
    Malformed {
        /// Position in the rule set (0-based).
        index: usize,
        /// Why loading failed.
        reason: String,
    },
}

/// An ordered sequence of rules.
///
/// Order only affects the order of diagnostics: every rule is evaluated.
///
/// # Example
///
/// ```
/// use gatecheck::{FieldResolver, RuleSet};
///
/// let rules = RuleSet::from_json(
///     r#"[{"match": {"url": "/api/v3"}, "required": {"method": "POST"}}, 42]"#,
///     &FieldResolver::default(),
/// )
/// .unwrap();
///
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules.malformed().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    entries: Vec<RuleEntry>,
}

impl RuleSet {
    /// Build a rule set from already-loaded entries.
    #[must_use]
    pub fn new(entries: Vec<RuleEntry>) -> Self {
        Self { entries }
    }

    /// Build a rule set where every entry loaded cleanly.
    #[must_use]
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self::new(rules.into_iter().map(RuleEntry::Rule).collect())
    }

    /// Load from a parsed configuration value.
    ///
    /// `resolver` decides which fields are callable, and therefore which
    /// mappings are sub-key tables rather than membership sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotASequence`] if `value` is not an array.
    /// Individual bad entries do not fail the load.
    pub fn from_value(value: &Value, resolver: &FieldResolver) -> Result<Self, ConfigError> {
        let items = value.as_array().ok_or(ConfigError::NotASequence {
            found: json_type(value),
        })?;
        let entries = items
            .iter()
            .enumerate()
            .map(|(index, item)| match load_rule(item, resolver) {
                Ok(rule) => RuleEntry::Rule(rule),
                Err(reason) => {
                    tracing::warn!(index, %reason, "malformed rule entry");
                    RuleEntry::Malformed { index, reason }
                }
            })
            .collect();
        Ok(Self { entries })
    }

    /// Parse JSON text, then [`from_value`](Self::from_value).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on invalid JSON, or any error of
    /// [`from_value`](Self::from_value).
    pub fn from_json(text: &str, resolver: &FieldResolver) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value, resolver)
    }

    /// Parse YAML text, then [`from_value`](Self::from_value).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on invalid YAML, or any error of
    /// [`from_value`](Self::from_value).
    pub fn from_yaml(text: &str, resolver: &FieldResolver) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(&value, resolver)
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleEntry> {
        self.entries.iter()
    }

    /// `(index, reason)` for every malformed entry.
    pub fn malformed(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            RuleEntry::Malformed { index, reason } => Some((*index, reason.as_str())),
            RuleEntry::Rule(_) => None,
        })
    }

    /// Number of entries, malformed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleEntry;
    type IntoIter = std::slice::Iter<'a, RuleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_rule(value: &Value, resolver: &FieldResolver) -> Result<Rule, String> {
    let rule = value
        .as_object()
        .ok_or_else(|| format!("rule must be a mapping, found {}", json_type(value)))?;
    Ok(Rule {
        match_clause: load_clause(rule, "match", resolver)?,
        required: load_clause(rule, "required", resolver)?,
    })
}

fn load_clause(
    rule: &Map<String, Value>,
    clause: &str,
    resolver: &FieldResolver,
) -> Result<Vec<Condition>, String> {
    let Some(value) = rule.get(clause) else {
        return Ok(Vec::new());
    };
    let fields = value.as_object().ok_or_else(|| {
        format!(
            "`{clause}` must be a mapping, found {}",
            json_type(value)
        )
    })?;
    fields
        .iter()
        .map(|(field, expected)| load_condition(clause, field, expected, resolver))
        .collect()
}

fn load_condition(
    clause: &str,
    field: &str,
    value: &Value,
    resolver: &FieldResolver,
) -> Result<Condition, String> {
    if !resolver.is_callable(field) {
        let expected =
            ExpectedValue::from_json(value).map_err(|reason| format!("`{clause}.{field}`: {reason}"))?;
        return Ok(Condition::Direct {
            field: field.to_string(),
            expected,
        });
    }

    let table = value.as_object().ok_or_else(|| {
        format!(
            "`{clause}.{field}` must map sub-keys to expected values, found {}",
            json_type(value)
        )
    })?;
    let entries = table
        .iter()
        .map(|(sub_key, expected)| {
            ExpectedValue::from_json(expected)
                .map(|expected| (sub_key.clone(), expected))
                .map_err(|reason| format!("`{clause}.{field}.{sub_key}`: {reason}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Condition::Keyed {
        field: field.to_string(),
        entries,
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
