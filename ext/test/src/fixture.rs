//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the validation engine.
//!
//! ```yaml
//! name: api_v3_json_post
//! description: JSON posts to /api/v3
//! config:                # optional ValidatorConfig
//!   min_content_length: 10
//! rules:
//!   - match: { url: /api/v3 }
//!     required: { method: POST }
//! cases:
//!   - name: wrong method
//!     request: { url: /api/v3, method: GET }
//!     expect: reject
//!     violations: ["Invalid method: 'GET', required 'POST'"]
//! ```

use crate::JsonRequest;
use gatecheck::{Decision, Outcome, Validator, ValidatorConfig};
use serde::Deserialize;
use serde_json::Value;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: Option<ValidatorConfig>,
    pub rules: Value,
    pub cases: Vec<TestCase>,
}

/// Expected outcome of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expect {
    Pass,
    Reject,
}

impl Expect {
    fn holds(self, outcome: Outcome) -> bool {
        matches!(
            (self, outcome),
            (Expect::Pass, Outcome::Pass) | (Expect::Reject, Outcome::Reject)
        )
    }
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub request: Value,
    pub expect: Expect,
    /// Exact violation messages, in order, when given.
    #[serde(default)]
    pub violations: Option<Vec<String>>,
    /// Exact match notes, in order, when given.
    #[serde(default)]
    pub matched: Option<Vec<String>>,
}

impl TestCase {
    /// Build the request view for this case
    pub fn build_request(&self) -> JsonRequest {
        JsonRequest::new(self.request.clone())
    }

    fn mismatches(&self, decision: &Decision) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.expect.holds(decision.outcome) {
            problems.push(format!(
                "expected {:?}, got {:?}",
                self.expect, decision.outcome
            ));
        }
        let messages = decision.diagnostics.messages();
        if let Some(expected) = &self.violations {
            if *expected != messages {
                problems.push(format!("violations: expected {expected:?}, got {messages:?}"));
            }
        }
        if let Some(expected) = &self.matched {
            let actual = &decision.diagnostics.matched_rules;
            if expected != actual {
                problems.push(format!("matched: expected {expected:?}, got {actual:?}"));
            }
        }
        problems
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub problems: Vec<String>,
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Build the validator this fixture runs under
    pub fn validator(&self) -> Validator {
        self.config
            .as_ref()
            .map_or_else(Validator::default, Validator::new)
    }

    /// Run all test cases and return results
    ///
    /// # Panics
    ///
    /// Panics if the fixture's rule set root is not a sequence.
    pub fn run(&self) -> Vec<CaseResult> {
        let validator = self.validator();
        let rules = validator
            .load_rules(&self.rules)
            .unwrap_or_else(|e| panic!("Fixture '{}' rules: {e}", self.name));
        self.cases
            .iter()
            .map(|case| {
                let decision = validator.validate(&rules, &case.build_request());
                let problems = case.mismatches(&decision);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: problems.is_empty(),
                    problems,
                }
            })
            .collect()
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        for result in self.run() {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: {}",
                self.name,
                result.case_name,
                result.problems.join("; ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
name: inline
rules:
  - match: { url: /api/v3 }
    required: { method: POST }
cases:
  - name: pass
    request: { url: /api/v3, method: POST }
    expect: pass
    matched: ["Matched rule 'url' => '/api/v3'"]
  - name: reject
    request: { url: /api/v3, method: GET }
    expect: reject
    violations: ["Invalid method: 'GET', required 'POST'"]
"#;

    #[test]
    fn test_inline_fixture() {
        let fixture = Fixture::from_yaml(FIXTURE).unwrap();
        assert_eq!(fixture.cases.len(), 2);
        assert_eq!(fixture.cases[1].expect, Expect::Reject);
        fixture.run_and_assert();
    }

    #[test]
    fn test_mismatch_is_reported() {
        let mut fixture = Fixture::from_yaml(FIXTURE).unwrap();
        fixture.cases[0].expect = Expect::Reject;
        let results = fixture.run();
        assert!(!results[0].passed);
        assert_eq!(results[0].problems, vec!["expected Reject, got Pass"]);
        assert!(results[1].passed);
    }

    #[test]
    fn test_config_applies() {
        let yaml = r"
name: strict
config: { content_length_policy: false }
rules:
  - match: { method: POST }
    required: { getHeader: { Content-type: application/json } }
cases:
  - name: no length needed
    request: { method: POST, getHeader: { Content-type: application/json } }
    expect: pass
";
        Fixture::from_yaml(yaml).unwrap().run_and_assert();
    }
}
