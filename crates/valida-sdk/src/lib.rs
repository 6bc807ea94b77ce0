//! Valida SDK
//!
//! High-level API for validating documents against rule schemas.

pub mod builder;
pub mod config;
pub mod error;
pub mod rule;
pub mod schema;

// Re-export main types
pub use builder::SchemaBuilder;
pub use config::ValidationConfig;
pub use error::{Result, SdkError};
pub use rule::{Rule, RuleFailure, RuleFailureKind, RuleTest};
pub use schema::{Schema, ValidatedData};

// Re-export commonly used types from dependencies
pub use valida_core::condition::CustomPredicate;
pub use valida_core::{Condition, DataPath, Value};
