//! Valida Parser - spec compiler for the Valida validation engine
//!
//! This crate turns dictionary-shaped specifications (typically loaded from
//! YAML or JSON) into `valida-core` condition trees and data paths, and reads
//! whole schema documents into rule definitions.

mod compiler;
pub mod condition_parser;
pub mod error;
pub mod path_parser;
pub mod schema_parser;
pub mod yaml_parser;

// Re-export main parser types
pub use condition_parser::ConditionParser;
pub use error::{ParseError, Result};
pub use path_parser::PathParser;
pub use schema_parser::{RuleDefinition, SchemaDocument, SchemaParser};
pub use yaml_parser::YamlParser;
