//! YAML Parser
//!
//! Reads YAML or JSON text into the core `Value` model and offers field
//! accessors over the resulting mappings.

use crate::error::{ParseError, Result};
use valida_core::Value;

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML text into a value
    pub fn parse(yaml_str: &str) -> Result<Value> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    /// Parse JSON text into a value
    pub fn parse_json(json_str: &str) -> Result<Value> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Field of a mapping looked up by string key
    pub fn get<'a>(obj: &'a Value, field: &str) -> Option<&'a Value> {
        obj.as_map()?.get(&Value::from(field))
    }

    /// Get a required string field from a mapping
    pub fn get_string(obj: &Value, field: &str) -> Result<String> {
        Self::get_optional_string(obj, field).ok_or_else(|| ParseError::MissingField {
            field: field.to_string(),
        })
    }

    /// Get an optional string field from a mapping
    pub fn get_optional_string(obj: &Value, field: &str) -> Option<String> {
        Self::get(obj, field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get a required list field from a mapping
    pub fn get_array<'a>(obj: &'a Value, field: &str) -> Result<&'a Vec<Value>> {
        Self::get(obj, field)
            .and_then(|v| v.as_list())
            .ok_or_else(|| ParseError::MissingField {
                field: field.to_string(),
            })
    }

    /// Check if a field exists in a mapping
    pub fn has_field(obj: &Value, field: &str) -> bool {
        Self::get(obj, field).is_some()
    }

    /// All string keys of a mapping
    pub fn get_keys(obj: &Value) -> Vec<String> {
        obj.as_map()
            .map(|map| {
                map.keys()
                    .filter_map(|k| k.as_str())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reject string keys outside `known_fields`
    pub fn validate_fields(obj: &Value, known_fields: &[&str], context: &str) -> Result<()> {
        let unknown: Vec<String> = Self::get_keys(obj)
            .into_iter()
            .filter(|k| !known_fields.contains(&k.as_str()))
            .map(|k| match find_similar(&k, known_fields) {
                Some(similar) => format!("'{k}' (did you mean '{similar}'?)"),
                None => format!("'{k}'"),
            })
            .collect();

        if unknown.is_empty() {
            return Ok(());
        }
        for field in &unknown {
            log::error!("Unknown field {} in {}", field, context);
        }
        Err(ParseError::malformed(format!(
            "unknown fields in {context}: {}",
            unknown.join(", ")
        )))
    }
}

/// Closest candidate within an edit distance of 2
pub(crate) fn find_similar<'a>(name: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (levenshtein_distance(name, c), *c))
        .filter(|(d, _)| *d <= 2)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
