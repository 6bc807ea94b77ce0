//! Roles and pre-processors
//!
//! A condition leaf tests one facet of a container entry: its value, its map
//! key, or its list index. Roles are carried per leaf and reduced over the
//! flattened tree; nothing about them is stored on combinator nodes.

use super::predicate::PredicateScope;
use crate::error::{CoreError, Result};
use crate::types::Value;
use std::fmt;

/// The data facet a condition leaf tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Value,
    Key,
    Index,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Value => "value",
            Role::Key => "key",
            Role::Index => "index",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "value" => Some(Role::Value),
            "key" => Some(Role::Key),
            "index" => Some(Role::Index),
            _ => None,
        }
    }

    /// Whether leaves of this role may carry a pre-processor
    pub fn supports_pre_processor(&self) -> bool {
        !matches!(self, Role::Index)
    }

    /// Check that a predicate of `scope` may be used by this role, optionally
    /// after `pre_processor`
    pub fn check(
        &self,
        pre_processor: Option<PreProcessor>,
        scope: PredicateScope,
        predicate: &str,
    ) -> Result<()> {
        if let Some(pre) = pre_processor {
            if !self.supports_pre_processor() {
                return Err(CoreError::IncompatibleRole(format!(
                    "{} conditions do not support the '{}' pre-processor",
                    self.name(),
                    pre.name()
                )));
            }
        }
        if scope == PredicateScope::Map && (pre_processor.is_some() || *self == Role::Index) {
            return Err(CoreError::IncompatibleRole(format!(
                "mapping predicate '{predicate}' is not available to {}{} conditions",
                self.name(),
                pre_processor.map(|p| format!(".{}", p.name())).unwrap_or_default()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reject leaf role sets that mix key and index conditions
pub(crate) fn check_role_mix(roles: impl IntoIterator<Item = Role>) -> Result<()> {
    let (mut has_key, mut has_index) = (false, false);
    for role in roles {
        has_key |= role == Role::Key;
        has_index |= role == Role::Index;
    }
    if has_key && has_index {
        return Err(CoreError::IncompatibleRole(
            "cannot combine key and index conditions".to_string(),
        ));
    }
    Ok(())
}

/// Transform applied to a datum before its predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreProcessor {
    Length,
    DataType,
}

impl PreProcessor {
    pub fn name(&self) -> &'static str {
        match self {
            PreProcessor::Length => "length",
            PreProcessor::DataType => "dtype",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "length" | "len" => Some(PreProcessor::Length),
            "dtype" | "type" => Some(PreProcessor::DataType),
            _ => None,
        }
    }

    pub fn apply(&self, datum: &Value) -> std::result::Result<Value, String> {
        match self {
            PreProcessor::Length => datum
                .len()
                .map(Value::from)
                .ok_or_else(|| format!("{} has no length", datum.dtype())),
            PreProcessor::DataType => Ok(Value::Type(datum.dtype())),
        }
    }
}
