//! Schema parser
//!
//! Parses schema documents of the form
//!
//! ```yaml
//! config:
//!   strict: false
//! rules:
//!   - path: [a, b, c]
//!     condition: {value.equal_to: 1}
//! ```
//!
//! into compiled rule definitions. The `config` section is passed through
//! untouched for the caller to deserialize.

use crate::compiler::Compiler;
use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use valida_core::condition::PredicateRegistry;
use valida_core::{Condition, DataPath, Value};

const RULE_FIELDS: &[&str] = &["path", "condition", "name"];
const SCHEMA_FIELDS: &[&str] = &["rules", "config"];

/// A compiled rule: where to look, and what must hold there
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    pub name: Option<String>,
    pub path: DataPath,
    pub condition: Condition,
}

/// A parsed schema document
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub rules: Vec<RuleDefinition>,
    /// Raw `config` section, if present
    pub config: Option<Value>,
}

/// Schema parser
pub struct SchemaParser;

impl SchemaParser {
    /// Parse a schema from YAML text
    pub fn parse(yaml_str: &str) -> Result<SchemaDocument> {
        Self::parse_with_registry(yaml_str, &PredicateRegistry::default())
    }

    /// Parse a schema whose conditions may name custom predicates
    pub fn parse_with_registry(
        yaml_str: &str,
        registry: &PredicateRegistry,
    ) -> Result<SchemaDocument> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_value(&yaml, registry)
    }

    /// Parse a schema from an already loaded document
    pub fn parse_from_value(doc: &Value, registry: &PredicateRegistry) -> Result<SchemaDocument> {
        YamlParser::validate_fields(doc, SCHEMA_FIELDS, "schema")?;
        let rules = YamlParser::get_array(doc, "rules")?
            .iter()
            .enumerate()
            .map(|(idx, spec)| {
                Self::parse_rule(spec, registry).map_err(|e| match e {
                    ParseError::MalformedSpec(msg) => {
                        ParseError::MalformedSpec(format!("rule #{}: {msg}", idx + 1))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let config = YamlParser::get(doc, "config").filter(|c| !matches!(c, Value::Null)).cloned();

        log::debug!("Parsed schema with {} rule(s)", rules.len());
        Ok(SchemaDocument { rules, config })
    }

    /// Parse one `{path, condition, name}` rule spec
    pub fn parse_rule(spec: &Value, registry: &PredicateRegistry) -> Result<RuleDefinition> {
        if spec.as_map().is_none() {
            return Err(ParseError::malformed(format!("rule spec must be a mapping, got {spec}")));
        }
        YamlParser::validate_fields(spec, RULE_FIELDS, "rule")?;

        let compiler = Compiler::new(registry);
        let path = YamlParser::get(spec, "path").ok_or_else(|| ParseError::MissingField {
            field: "path".to_string(),
        })?;
        let path = compiler.path(path)?;
        let condition = match YamlParser::get(spec, "condition") {
            Some(condition) => compiler.condition(condition)?,
            None => Condition::Null,
        };

        Ok(RuleDefinition {
            name: YamlParser::get_optional_string(spec, "name"),
            path,
            condition,
        })
    }
}
