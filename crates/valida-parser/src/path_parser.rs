//! Path parser
//!
//! Compiles path specs into `DataPath`s. Accepted forms:
//! - a list of parts: literal keys/indices and selector mappings
//!   (`{"type": "map_value", "key": ..., "value": ...}`)
//! - a transform chain `{"path.<arity>.<transform>": [<parts>]}`
//! - a `/`-delimited string

use crate::compiler::Compiler;
use crate::error::Result;
use crate::yaml_parser::YamlParser;
use valida_core::condition::PredicateRegistry;
use valida_core::{DataPath, Value};

/// Path parser
#[derive(Debug, Clone, Default)]
pub struct PathParser {
    registry: PredicateRegistry,
}

impl PathParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser whose selector conditions may use the registry's custom predicates
    pub fn with_registry(registry: PredicateRegistry) -> Self {
        Self { registry }
    }

    /// Parse a path from YAML text
    pub fn parse(&self, yaml_str: &str) -> Result<DataPath> {
        let spec = YamlParser::parse(yaml_str)?;
        self.parse_value(&spec)
    }

    /// Compile a path spec value
    pub fn parse_value(&self, spec: &Value) -> Result<DataPath> {
        Compiler::new(&self.registry).path(spec)
    }
}
