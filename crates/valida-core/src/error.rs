//! Error types for Valida Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Conditions of conflicting roles were combined, or a condition of the
    /// wrong role was supplied where a specific role is required
    #[error("Incompatible role: {0}")]
    IncompatibleRole(String),

    /// A predicate produced something other than a boolean
    #[error("Predicate '{predicate}' did not return a boolean (got {actual})")]
    InvalidPredicateResult { predicate: String, actual: String },

    /// A pre-processor could not be applied to a datum (strict mode only)
    #[error("Pre-processor '{pre_processor}' failed: {message}")]
    PreProcessingFailure {
        pre_processor: String,
        message: String,
    },

    /// A predicate could not be evaluated against a datum (strict mode only)
    #[error("Predicate '{predicate}' failed: {message}")]
    PredicateFailure { predicate: String, message: String },

    /// A path-valued argument could not be resolved (strict mode only)
    #[error("Unresolved argument '{argument}': {message}")]
    UnresolvedArgument { argument: String, message: String },

    /// Arguments do not match the predicate's declared parameters
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Arity selector violated, or applied to a concrete path
    #[error("Arity violation: {0}")]
    ArityViolation(String),

    /// Value is not a list or a map
    #[error("Data is not filterable: {0}")]
    NotFilterable(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
