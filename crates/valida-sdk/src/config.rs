//! Configuration types for schema validation

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use valida_core::Value;

/// Validation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Raise per-datum pre-processing, predicate and argument errors
    /// instead of recording them as failures
    pub strict: bool,

    /// Count a rule whose path matches nothing as failed
    pub require_data: bool,
}

impl ValidationConfig {
    /// Create a new validation configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict evaluation
    pub fn strict(mut self, enable: bool) -> Self {
        self.strict = enable;
        self
    }

    /// Require every rule path to match at least one element
    pub fn require_data(mut self, enable: bool) -> Self {
        self.require_data = enable;
        self
    }

    /// Deserialize a `config:` section of a schema document
    pub fn from_value(value: &Value) -> Result<Self> {
        let yaml = serde_yaml::to_value(value).map_err(|e| SdkError::ConfigError(e.to_string()))?;
        serde_yaml::from_value(yaml).map_err(|e| SdkError::ConfigError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valida_core::Map;

    #[test]
    fn test_config_builder() {
        let config = ValidationConfig::new().strict(true).require_data(false);
        assert!(config.strict);
        assert!(!config.require_data);
        assert_eq!(ValidationConfig::default(), ValidationConfig::new());
    }

    #[test]
    fn test_config_from_value() {
        let value = Value::Map(Map::new().with("require_data", true));
        let config = ValidationConfig::from_value(&value).unwrap();
        assert!(config.require_data);
        assert!(!config.strict);
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let value = Value::Map(Map::new().with("strcit", true));
        let err = ValidationConfig::from_value(&value).unwrap_err();
        assert!(matches!(err, SdkError::ConfigError(_)));
    }
}
