//! Integration tests for schema validation
//!
//! Loads schemas from YAML files and validates nested documents end to end.

use std::io::Write;
use tempfile::NamedTempFile;
use valida_parser::YamlParser;
use valida_sdk::{RuleFailureKind, Schema, SchemaBuilder, SdkError, Value};

const WORKFLOW_SCHEMA: &str = r#"
config:
  strict: false
rules:
  - name: tasks is a non-empty list
    path: [tasks]
    condition:
      and:
        - value.dtype.equal_to: list
        - value.length.gt: 0
  - name: every task is named
    path:
      - tasks
      - type: list_value
    condition:
      value.keys_contain: name
  - name: inputs are numeric
    path:
      - tasks
      - type: list_value
      - inputs
      - type: map_value
        key.dtype.equal_to: str
    condition:
      value.is_instance: [int, float]
  - name: at most one of retry/timeout
    path: [settings]
    condition:
      value.keys_contain_at_most_one_of: [retry, timeout]
"#;

fn schema_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn document(yaml: &str) -> Value {
    YamlParser::parse(yaml).unwrap()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_schema_from_yaml_file() -> anyhow::Result<()> {
    let file = schema_file(WORKFLOW_SCHEMA);
    let schema = Schema::from_yaml_file(file.path())?;
    assert_eq!(schema.len(), 4);
    assert_eq!(schema.rules()[0].name(), Some("tasks is a non-empty list"));
    Ok(())
}

#[test]
fn test_invalid_schema_file_names_the_file() {
    let file = schema_file("rules:\n  - path: [a]\n    condition: {value.eqaul_to: 1}\n");
    let err = Schema::from_yaml_file(file.path()).unwrap_err();
    match err {
        SdkError::InvalidSchemaFile(message) => {
            assert!(message.contains(&file.path().display().to_string()));
            assert!(message.contains("eqaul_to"));
        }
        other => panic!("Expected InvalidSchemaFile, got {other:?}"),
    }
}

#[test]
fn test_builder_loads_files() -> anyhow::Result<()> {
    let file = schema_file(WORKFLOW_SCHEMA);
    let schema = SchemaBuilder::new()
        .add_schema_file(file.path())
        .require_data(true)
        .build()?;
    assert_eq!(schema.len(), 4);
    assert!(schema.config().require_data);
    Ok(())
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_valid_document() -> anyhow::Result<()> {
    let schema = Schema::from_yaml(WORKFLOW_SCHEMA)?;
    let data = document(
        r#"
tasks:
  - name: setup
    inputs: {p1: 1}
  - name: run
    inputs: {p1: 2.5, p2: 3}
settings:
  retry: 3
"#,
    );
    let validated = schema.validate(&data)?;
    assert!(validated.is_valid());
    assert_eq!(validated.num_rules_tested(), 4);
    assert_eq!(validated.frac_rules_tested(), 1.0);
    assert_eq!(validated.failure_report(), "Data is valid. 4/4 rules were tested.");
    Ok(())
}

#[test]
fn test_invalid_document_report() -> anyhow::Result<()> {
    let schema = Schema::from_yaml(WORKFLOW_SCHEMA)?;
    let data = document(
        r#"
tasks:
  - name: setup
    inputs: {p1: one}
  - inputs: {p1: 2}
settings:
  retry: 3
  timeout: 10
"#,
    );
    let validated = schema.validate(&data)?;
    assert!(!validated.is_valid());
    assert_eq!(validated.num_rules_failed(), 3);
    assert_eq!(validated.num_failures(), 3);

    let unnamed = &validated.rule_tests()[1].failures()[0];
    assert_eq!(unnamed.path, vec![Value::from("tasks"), Value::Int(1)]);

    let report = validated.failure_report();
    assert!(report.starts_with("3 rules failed validation. 4/4 rules were tested."));
    assert!(report.contains("Rule #2\n-------\n"));
    assert!(report.contains("tasks/0/inputs/p1: 'one' (predicate false)"));
    assert!(!report.contains("Rule #1\n"));
    Ok(())
}

#[test]
fn test_missing_data_only_fails_when_required() -> anyhow::Result<()> {
    let data = document("tasks: []");
    let lenient = Schema::from_yaml(WORKFLOW_SCHEMA)?;
    let validated = lenient.validate(&data)?;
    assert_eq!(validated.num_rules_tested(), 1);
    assert_eq!(validated.num_rules_failed(), 1);

    let file = schema_file(WORKFLOW_SCHEMA);
    let strict = SchemaBuilder::new()
        .add_schema_file(file.path())
        .require_data(true)
        .build()?;
    let validated = strict.validate(&data)?;
    assert_eq!(validated.num_rules_failed(), 4);
    assert_eq!(
        validated.rule_tests()[3].failures()[0].kind,
        RuleFailureKind::NoData
    );
    Ok(())
}

#[test]
fn test_strict_mode_raises() {
    let schema = SchemaBuilder::new()
        .add_schema_content("rules: [{path: [a], condition: {value.length.equal_to: 1}}]")
        .strict(true)
        .build()
        .unwrap();
    let err = schema.validate(&document("a: 5")).unwrap_err();
    assert!(matches!(err, SdkError::CoreError(_)));
}
