//! Condition parser
//!
//! Compiles condition specs such as
//!
//! ```yaml
//! and:
//!   - value.dtype.equal_to: str
//!   - value.length.in_range: [1, 10]
//! ```
//!
//! into `Condition` trees. Every dotted segment is case-insensitive and the
//! usual aliases (`len`, `type`, `eq`, `in`, ...) are accepted.

use crate::compiler::Compiler;
use crate::error::Result;
use crate::yaml_parser::YamlParser;
use valida_core::condition::{CustomPredicate, PredicateRegistry};
use valida_core::{Condition, Value};

/// Condition parser
#[derive(Debug, Clone, Default)]
pub struct ConditionParser {
    registry: PredicateRegistry,
}

impl ConditionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that also resolves the registry's custom predicates by name
    pub fn with_registry(registry: PredicateRegistry) -> Self {
        Self { registry }
    }

    pub fn register(&mut self, predicate: CustomPredicate) {
        self.registry.register(predicate);
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    /// Parse a condition from YAML text
    pub fn parse(&self, yaml_str: &str) -> Result<Condition> {
        let spec = YamlParser::parse(yaml_str)?;
        self.parse_value(&spec)
    }

    /// Compile a condition spec value; `null` compiles to the neutral condition
    pub fn parse_value(&self, spec: &Value) -> Result<Condition> {
        Compiler::new(&self.registry).condition(spec)
    }
}
