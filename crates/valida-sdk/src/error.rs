//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Parser error
    #[error("Parser error: {0}")]
    ParseError(#[from] valida_parser::ParseError),

    /// Core engine error
    #[error("Core error: {0}")]
    CoreError(#[from] valida_core::CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid schema file
    #[error("Invalid schema file: {0}")]
    InvalidSchemaFile(String),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("unknown field `strcit`".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("strcit"));
    }

    #[test]
    fn test_invalid_schema_file() {
        let error = SdkError::InvalidSchemaFile("schema.yaml".to_string());
        assert_eq!(error.to_string(), "Invalid schema file: schema.yaml");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("File not found"));
    }

    #[test]
    fn test_core_error_conversion() {
        let core = valida_core::CoreError::ArityViolation("no matches".to_string());
        let sdk_error: SdkError = core.into();
        assert!(matches!(sdk_error, SdkError::CoreError(_)));
        assert!(sdk_error.to_string().contains("no matches"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse = valida_parser::ParseError::MissingField {
            field: "rules".to_string(),
        };
        let sdk_error: SdkError = parse.into();
        assert!(sdk_error.to_string().starts_with("Parser error"));
    }
}
