//! Schemas and validation results

use crate::config::ValidationConfig;
use crate::error::{Result, SdkError};
use crate::rule::{Rule, RuleTest};
use std::fmt;
use std::path::Path;
use valida_core::condition::PredicateRegistry;
use valida_core::Value;
use valida_parser::{SchemaDocument, SchemaParser};

/// An ordered list of rules and the configuration to validate them with
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    rules: Vec<Rule>,
    config: ValidationConfig,
}

impl Schema {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            config: ValidationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Load a schema from YAML text
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        Self::from_yaml_with_registry(yaml_str, &PredicateRegistry::default())
    }

    /// Load a schema whose conditions may name custom predicates
    pub fn from_yaml_with_registry(yaml_str: &str, registry: &PredicateRegistry) -> Result<Self> {
        let document = SchemaParser::parse_with_registry(yaml_str, registry)?;
        Self::from_document(document)
    }

    /// Load a schema from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content).map_err(|e| match e {
            SdkError::ParseError(parse) => SdkError::InvalidSchemaFile(format!(
                "{}: {}",
                path.as_ref().display(),
                parse
            )),
            other => other,
        })
    }

    pub fn from_document(document: SchemaDocument) -> Result<Self> {
        let config = match &document.config {
            Some(config) => ValidationConfig::from_value(config)?,
            None => ValidationConfig::default(),
        };
        let rules = document
            .rules
            .into_iter()
            .map(Rule::from_definition)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules, config })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Test every rule against a document
    pub fn validate<'s>(&'s self, data: &Value) -> Result<ValidatedData<'s>> {
        let rule_tests = self
            .rules
            .iter()
            .map(|rule| rule.test(data, &self.config))
            .collect::<Result<Vec<_>>>()?;
        let validated = ValidatedData {
            schema: self,
            rule_tests,
        };

        tracing::info!(
            is_valid = validated.is_valid(),
            rules = self.len(),
            tested = validated.num_rules_tested(),
            failures = validated.num_failures(),
            "Schema validation completed"
        );
        Ok(validated)
    }
}

/// Results of validating a document against a schema
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedData<'s> {
    schema: &'s Schema,
    rule_tests: Vec<RuleTest>,
}

impl<'s> ValidatedData<'s> {
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Per-rule outcomes, in rule order
    pub fn rule_tests(&self) -> &[RuleTest] {
        &self.rule_tests
    }

    pub fn is_valid(&self) -> bool {
        self.rule_tests.iter().all(RuleTest::is_valid)
    }

    pub fn num_rules_tested(&self) -> usize {
        self.rule_tests.iter().filter(|t| t.tested()).count()
    }

    /// Share of rules whose path matched any data; zero for an empty schema
    pub fn frac_rules_tested(&self) -> f64 {
        if self.schema.is_empty() {
            return 0.0;
        }
        self.num_rules_tested() as f64 / self.schema.len() as f64
    }

    /// Total failed elements across all rules
    pub fn num_failures(&self) -> usize {
        self.rule_tests.iter().map(RuleTest::num_failures).sum()
    }

    pub fn num_rules_failed(&self) -> usize {
        self.rule_tests.iter().filter(|t| !t.is_valid()).count()
    }

    /// Human-readable summary of every failed rule
    pub fn failure_report(&self) -> String {
        let tested = format!(
            "{}/{} rules were tested.",
            self.num_rules_tested(),
            self.schema.len()
        );
        if self.is_valid() {
            return format!("Data is valid. {tested}");
        }

        let failed = self.num_rules_failed();
        let mut report = format!(
            "{failed} rule{} failed validation. {tested}\n",
            if failed > 1 { "s" } else { "" }
        );
        for (idx, (rule, test)) in self.schema.rules.iter().zip(&self.rule_tests).enumerate() {
            if test.is_valid() {
                continue;
            }
            let header = format!("Rule #{}", idx + 1);
            report.push_str(&format!("\n{header}\n{}\n", "-".repeat(header.len())));
            report.push_str(&format!("{rule}\n"));
            for failure in test.failures() {
                report.push_str(&format!("  {failure}\n"));
            }
        }
        report
    }
}

impl fmt::Display for ValidatedData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ValidatedData(is_valid={}, num_failures={}, frac_rules_tested={})",
            self.is_valid(),
            self.num_failures(),
            self.frac_rules_tested()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valida_core::prelude::*;

    const SCHEMA: &str = r#"
rules:
  - path: [a, b]
    condition: {value.dtype.equal_to: list}
  - path: [a, c]
    condition: {value.truthy: null}
"#;

    #[test]
    fn test_schema_from_yaml() {
        let schema = Schema::from_yaml(SCHEMA).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.config(), &ValidationConfig::default());
        assert_eq!(
            schema.rules()[0].condition(),
            &value().dtype().equal_to(DataType::List)
        );
    }

    #[test]
    fn test_validate_counts() {
        let schema = Schema::from_yaml(SCHEMA).unwrap();
        let data = Value::Map(Map::new().with("a", Map::new().with("b", 1)));
        let validated = schema.validate(&data).unwrap();
        assert!(!validated.is_valid());
        assert_eq!(validated.num_rules_tested(), 1);
        assert_eq!(validated.frac_rules_tested(), 0.5);
        assert_eq!(validated.num_failures(), 1);
        assert_eq!(
            validated.to_string(),
            "ValidatedData(is_valid=false, num_failures=1, frac_rules_tested=0.5)"
        );
    }

    #[test]
    fn test_failure_report_layout() {
        let schema = Schema::from_yaml(SCHEMA).unwrap();
        let data = Value::Map(Map::new().with("a", Map::new().with("b", 1).with("c", 0)));
        let report = schema.validate(&data).unwrap().failure_report();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "2 rules failed validation. 2/2 rules were tested.");
        assert_eq!(&lines[1..4], &["", "Rule #1", "-------"]);
        assert_eq!(lines[5], "  a/b: 1 (predicate false)");
        assert_eq!(&lines[6..8], &["", "Rule #2"]);
        assert!(report.ends_with("a/c: 0 (predicate false)\n"));
    }

    #[test]
    fn test_empty_schema() {
        let schema = Schema::default();
        let validated = schema.validate(&Value::Null).unwrap();
        assert!(validated.is_valid());
        assert_eq!(validated.frac_rules_tested(), 0.0);
        assert_eq!(validated.failure_report(), "Data is valid. 0/0 rules were tested.");
    }

    #[test]
    fn test_config_section_applies() {
        let yaml = format!("config:\n  require_data: true\n{SCHEMA}");
        let schema = Schema::from_yaml(&yaml).unwrap();
        assert!(schema.config().require_data);
        let validated = schema.validate(&Value::Map(Map::new())).unwrap();
        assert_eq!(validated.num_rules_failed(), 2);
    }
}
