//! Parser error types

use thiserror::Error;
use valida_core::CoreError;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// Spec violates the condition or path grammar
    #[error("Malformed spec: {0}")]
    MalformedSpec(String),

    /// Unrecognised segment of a dotted spec key
    #[error("Unknown segment '{segment}' in '{key}'")]
    UnknownSegment { segment: String, key: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Role or arity error raised while building the compiled structure
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ParseError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ParseError::MalformedSpec(message.into())
    }

    pub(crate) fn unknown(segment: &str, key: &str) -> Self {
        ParseError::UnknownSegment {
            segment: segment.to_string(),
            key: key.to_string(),
        }
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
