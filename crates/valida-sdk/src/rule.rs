//! Rules
//!
//! A rule pairs a data path with a value condition. Testing a rule resolves
//! the path against a document and filters the matched elements with the
//! condition; every element that is filtered out is a failure.

use crate::config::ValidationConfig;
use crate::error::{Result, SdkError};
use std::fmt;
use valida_core::condition::PredicateRegistry;
use valida_core::{Condition, CoreError, DataPath, EvalOptions, FailureReason, Value};
use valida_parser::{RuleDefinition, SchemaParser};

/// A path and the condition every element at that path must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: Option<String>,
    path: DataPath,
    condition: Condition,
}

impl Rule {
    /// Create a rule; the condition must be value-like
    pub fn new(path: DataPath, condition: Condition) -> Result<Self> {
        if !condition.is_value_like() {
            return Err(CoreError::IncompatibleRole(format!(
                "rule conditions must be value-like, got {condition}"
            ))
            .into());
        }
        Ok(Self {
            name: None,
            path,
            condition,
        })
    }

    /// Attach a display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Compile a `{path, condition, name}` spec
    pub fn from_spec(spec: &Value) -> Result<Self> {
        Self::from_spec_with_registry(spec, &PredicateRegistry::default())
    }

    /// Compile a spec whose condition may name custom predicates
    pub fn from_spec_with_registry(spec: &Value, registry: &PredicateRegistry) -> Result<Self> {
        let definition = SchemaParser::parse_rule(spec, registry)?;
        Self::from_definition(definition)
    }

    pub fn from_definition(definition: RuleDefinition) -> Result<Self> {
        let rule = Self::new(definition.path, definition.condition)?;
        Ok(match definition.name {
            Some(name) => rule.with_name(name),
            None => rule,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> &DataPath {
        &self.path
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Test the rule against a document
    pub fn test(&self, data: &Value, config: &ValidationConfig) -> Result<RuleTest> {
        let matches = match self.path.resolve(data) {
            Ok(matches) => matches,
            Err(CoreError::ArityViolation(message)) => {
                tracing::debug!(rule = %self, %message, "Arity violation");
                return Ok(RuleTest {
                    tested: true,
                    num_matches: 0,
                    failures: vec![RuleFailure::without_datum(RuleFailureKind::Arity(message))],
                });
            }
            Err(e) => return Err(SdkError::from(e)),
        };

        if matches.is_empty() {
            tracing::debug!(rule = %self, "Path matched no data");
            let failures = if config.require_data {
                vec![RuleFailure::without_datum(RuleFailureKind::NoData)]
            } else {
                Vec::new()
            };
            return Ok(RuleTest {
                tested: false,
                num_matches: 0,
                failures,
            });
        }

        let values = Value::List(matches.iter().map(|m| m.value.clone()).collect());
        let options = EvalOptions::new()
            .with_source(data)
            .with_strict(config.strict);
        let filtered = self.condition.filter_with(&values, options)?;

        let failures: Vec<RuleFailure> = matches
            .into_iter()
            .zip(filtered.failures())
            .filter_map(|(m, reason)| {
                reason.map(|reason| RuleFailure {
                    path: m.path,
                    datum: m.value,
                    kind: RuleFailureKind::Condition(reason),
                })
            })
            .collect();

        tracing::debug!(
            rule = %self,
            matched = filtered.len(),
            failed = failures.len(),
            "Rule tested"
        );
        Ok(RuleTest {
            tested: true,
            num_matches: filtered.len(),
            failures,
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        write!(f, "{} => {}", self.path, self.condition)
    }
}

/// Why a rule failed
#[derive(Debug, Clone, PartialEq)]
pub enum RuleFailureKind {
    /// An element at the path did not satisfy the condition
    Condition(FailureReason),
    /// The path matched nothing and data is required
    NoData,
    /// The path's arity selector was violated
    Arity(String),
}

impl fmt::Display for RuleFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleFailureKind::Condition(reason) => write!(f, "{reason}"),
            RuleFailureKind::NoData => f.write_str("no data at path"),
            RuleFailureKind::Arity(message) => write!(f, "arity violation: {message}"),
        }
    }
}

/// One failed element
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    /// Keys and indices leading from the document root to the datum
    pub path: Vec<Value>,
    pub datum: Value,
    pub kind: RuleFailureKind,
}

impl RuleFailure {
    fn without_datum(kind: RuleFailureKind) -> Self {
        Self {
            path: Vec::new(),
            datum: Value::Null,
            kind,
        }
    }
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RuleFailureKind::Condition(_) => write!(
                f,
                "{}: {} ({})",
                format_provenance(&self.path),
                self.datum,
                self.kind
            ),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Render a provenance path as `a/0/b`
pub(crate) fn format_provenance(path: &[Value]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    path.iter()
        .map(|part| match part {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Outcome of testing one rule
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTest {
    tested: bool,
    num_matches: usize,
    failures: Vec<RuleFailure>,
}

impl RuleTest {
    /// Whether the path matched anything
    pub fn tested(&self) -> bool {
        self.tested
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn num_matches(&self) -> usize {
        self.num_matches
    }

    pub fn num_failures(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valida_core::prelude::*;

    fn document() -> Value {
        Value::Map(
            Map::new()
                .with("a", Map::new().with("b", vec![1, 2, 3]))
                .with("limit", 2),
        )
    }

    fn items() -> DataPath {
        DataPath::default() / "a" / "b" / ContainerValue::list_value().build().unwrap()
    }

    #[test]
    fn test_rule_reports_failures_with_provenance() {
        let rule = Rule::new(items(), value().less_than(3)).unwrap();
        let test = rule.test(&document(), &ValidationConfig::default()).unwrap();
        assert!(test.tested());
        assert!(!test.is_valid());
        assert_eq!(test.num_matches(), 3);
        assert_eq!(test.num_failures(), 1);

        let failure = &test.failures()[0];
        assert_eq!(failure.path, vec![Value::from("a"), Value::from("b"), Value::Int(2)]);
        assert_eq!(failure.datum, Value::Int(3));
        assert_eq!(
            failure.kind,
            RuleFailureKind::Condition(FailureReason::PredicateFalse)
        );
        assert_eq!(failure.to_string(), "a/b/2: 3 (predicate false)");
    }

    #[test]
    fn test_path_argument_uses_document() {
        let rule = Rule::new(
            items(),
            value().less_than_or_equal_to(DataPath::default() / "limit"),
        )
        .unwrap();
        let test = rule.test(&document(), &ValidationConfig::default()).unwrap();
        assert_eq!(test.num_failures(), 1);
    }

    #[test]
    fn test_missing_data_is_untested() {
        let rule = Rule::new(DataPath::default() / "missing", value().truthy()).unwrap();
        let lenient = rule.test(&document(), &ValidationConfig::default()).unwrap();
        assert!(!lenient.tested());
        assert!(lenient.is_valid());

        let required = rule
            .test(&document(), &ValidationConfig::new().require_data(true))
            .unwrap();
        assert!(!required.tested());
        assert_eq!(required.failures()[0].kind, RuleFailureKind::NoData);
    }

    #[test]
    fn test_arity_violation_is_a_failure() {
        let rule = Rule::new(items().single().unwrap(), Condition::Null).unwrap();
        let test = rule.test(&document(), &ValidationConfig::default()).unwrap();
        assert!(test.tested());
        assert!(matches!(test.failures()[0].kind, RuleFailureKind::Arity(_)));
    }

    #[test]
    fn test_rule_requires_value_condition() {
        let err = Rule::new(items(), key().equal_to("a")).unwrap_err();
        assert!(matches!(err, SdkError::CoreError(CoreError::IncompatibleRole(_))));
    }

    #[test]
    fn test_strict_mode_propagates() {
        let data = Value::Map(Map::new().with("x", vec![Value::Int(1), Value::from("two")]));
        let rule = Rule::new(
            DataPath::default() / "x" / ContainerValue::list_value().build().unwrap(),
            value().length().equal_to(3),
        )
        .unwrap();

        let lenient = rule.test(&data, &ValidationConfig::default()).unwrap();
        assert_eq!(
            lenient.failures()[0].kind,
            RuleFailureKind::Condition(FailureReason::PreProcessingError)
        );
        assert!(rule.test(&data, &ValidationConfig::new().strict(true)).is_err());
    }

    #[test]
    fn test_rule_from_spec() {
        let spec: Value = valida_parser::YamlParser::parse(
            "{name: small, path: [a, b], condition: {value.length.lte: 3}}",
        )
        .unwrap();
        let rule = Rule::from_spec(&spec).unwrap();
        assert_eq!(rule.name(), Some("small"));
        assert_eq!(rule.condition(), &value().length().less_than_or_equal_to(3));
        assert!(rule.test(&document(), &ValidationConfig::default()).unwrap().is_valid());
    }
}
