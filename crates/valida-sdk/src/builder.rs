//! Builder pattern for Schema

use crate::config::ValidationConfig;
use crate::error::{Result, SdkError};
use crate::rule::Rule;
use crate::schema::Schema;
use std::path::PathBuf;
use valida_core::condition::{CustomPredicate, PredicateRegistry};
use valida_core::{Condition, DataPath};
use valida_parser::SchemaParser;

/// Builder for Schema
///
/// # Example
///
/// ```rust,ignore
/// use valida_sdk::SchemaBuilder;
///
/// let schema = SchemaBuilder::new()
///     .add_schema_file("schemas/workflow.yaml")
///     .add_rule(path, value().truthy())
///     .strict(true)
///     .build()?;
///
/// let validated = schema.validate(&document)?;
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    rules: Vec<(DataPath, Condition)>,
    schema_files: Vec<PathBuf>,
    schema_contents: Vec<String>,
    registry: PredicateRegistry,
    config: Option<ValidationConfig>,
}

impl SchemaBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule built in code
    pub fn add_rule(mut self, path: DataPath, condition: Condition) -> Self {
        self.rules.push((path, condition));
        self
    }

    /// Add a schema file whose rules are appended
    pub fn add_schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_files.push(path.into());
        self
    }

    /// Add schema YAML content directly (alternative to file path)
    pub fn add_schema_content(mut self, content: impl Into<String>) -> Self {
        self.schema_contents.push(content.into());
        self
    }

    /// Make a custom predicate available to schema conditions
    pub fn register_predicate(mut self, predicate: CustomPredicate) -> Self {
        self.registry.register(predicate);
        self
    }

    /// Set the validation configuration, overriding any `config:` sections
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Enable strict evaluation
    pub fn strict(mut self, enable: bool) -> Self {
        self.config = Some(self.config.unwrap_or_default().strict(enable));
        self
    }

    /// Require every rule path to match data
    pub fn require_data(mut self, enable: bool) -> Self {
        self.config = Some(self.config.unwrap_or_default().require_data(enable));
        self
    }

    /// Build the schema
    ///
    /// Rules from files come first, then rules from content, then rules
    /// added in code. Without an explicit configuration the first `config:`
    /// section found is used.
    pub fn build(self) -> Result<Schema> {
        let mut contents = Vec::with_capacity(self.schema_files.len() + self.schema_contents.len());
        for path in &self.schema_files {
            tracing::debug!(path = %path.display(), "Loading schema file");
            let content = std::fs::read_to_string(path)?;
            contents.push((Some(path), content));
        }
        contents.extend(self.schema_contents.iter().map(|c| (None, c.clone())));

        let mut rules = Vec::new();
        let mut document_config = None;
        for (path, content) in contents {
            let document =
                SchemaParser::parse_with_registry(&content, &self.registry).map_err(|e| {
                    match path {
                        Some(path) => {
                            SdkError::InvalidSchemaFile(format!("{}: {}", path.display(), e))
                        }
                        None => SdkError::from(e),
                    }
                })?;
            if document_config.is_none() {
                document_config = document.config.clone();
            }
            for definition in document.rules {
                rules.push(Rule::from_definition(definition)?);
            }
        }
        for (path, condition) in self.rules {
            rules.push(Rule::new(path, condition)?);
        }

        let config = match (self.config, document_config) {
            (Some(config), _) => config,
            (None, Some(value)) => ValidationConfig::from_value(&value)?,
            (None, None) => ValidationConfig::default(),
        };
        tracing::info!(rules = rules.len(), ?config, "Schema built");
        Ok(Schema::new(rules).with_config(config))
    }
}
