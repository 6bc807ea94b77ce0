//! Predicate arguments
//!
//! An argument is either a literal value or a `DataPath` that is resolved
//! against the source document at evaluation time.

use crate::path::{DataPath, Resolved};
use crate::types::{DataType, Map, Value};
use std::fmt;

/// A bound predicate argument
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Literal(Value),
    Path(DataPath),
}

impl Argument {
    pub fn is_path(&self) -> bool {
        matches!(self, Argument::Path(_))
    }

    /// Resolve to a concrete value; path arguments need a source document
    pub fn resolve(&self, source: Option<&Value>) -> std::result::Result<Value, String> {
        match self {
            Argument::Literal(value) => Ok(value.clone()),
            Argument::Path(path) => {
                let source =
                    source.ok_or_else(|| format!("no source data to resolve {path}"))?;
                match path.get_data(source).map_err(|e| e.to_string())? {
                    Resolved::One(value) => Ok(value),
                    Resolved::Many(values) if !values.is_empty() => Ok(Value::List(values)),
                    _ => Err(format!("{path} matched no data")),
                }
            }
        }
    }

    /// Read string literals that name a type (`str`, `map`, ...) as type tags
    pub(crate) fn with_type_names(self) -> Self {
        match self {
            Argument::Literal(value) => Argument::Literal(type_names(value)),
            path => path,
        }
    }

    pub fn to_spec(&self) -> Value {
        match self {
            Argument::Literal(value) => escape_literal(value),
            Argument::Path(path) => path.to_spec(),
        }
    }
}

/// Whether a mapping key would be read as a path argument (`path`, `path.<transform>`)
pub fn is_path_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    lower == "path" || lower.starts_with("path.")
}

fn type_names(value: Value) -> Value {
    match value {
        Value::String(name) => match DataType::from_name(&name) {
            Some(dtype) => Value::Type(dtype),
            None => Value::String(name),
        },
        Value::List(items) => Value::List(items.into_iter().map(type_names).collect()),
        other => other,
    }
}

/// Prefix path-like keys of a literal mapping with one escape character so
/// that the spec compiler reads them back verbatim
fn escape_literal(value: &Value) -> Value {
    match value {
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| match k {
                    Value::String(s) if is_path_key(s.trim_start_matches('\\')) => {
                        (Value::String(format!("\\{s}")), v.clone())
                    }
                    _ => (k.clone(), v.clone()),
                })
                .collect::<Map>(),
        ),
        other => other.clone(),
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Literal(value) => write!(f, "{value}"),
            Argument::Path(path) => write!(f, "{path}"),
        }
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Literal(value)
    }
}

impl From<DataPath> for Argument {
    fn from(path: DataPath) -> Self {
        Argument::Path(path)
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        Argument::Literal(b.into())
    }
}

impl From<i64> for Argument {
    fn from(i: i64) -> Self {
        Argument::Literal(i.into())
    }
}

impl From<i32> for Argument {
    fn from(i: i32) -> Self {
        Argument::Literal(i.into())
    }
}

impl From<f64> for Argument {
    fn from(f: f64) -> Self {
        Argument::Literal(f.into())
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::Literal(s.into())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::Literal(s.into())
    }
}

impl From<DataType> for Argument {
    fn from(t: DataType) -> Self {
        Argument::Literal(t.into())
    }
}

impl From<Map> for Argument {
    fn from(map: Map) -> Self {
        Argument::Literal(map.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Argument {
    fn from(items: Vec<T>) -> Self {
        Argument::Literal(items.into())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Argument {
    fn from(items: [T; N]) -> Self {
        Argument::Literal(items.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_keys() {
        assert!(is_path_key("path"));
        assert!(is_path_key("PATH.map_keys"));
        assert!(!is_path_key("paths"));
        assert!(!is_path_key("\\path"));
    }

    #[test]
    fn test_literal_escaping() {
        let literal = Map::new().with("path", vec!["A", "B"]).with("key", "val");
        let spec = Argument::from(literal).to_spec();
        let map = spec.as_map().unwrap();
        assert!(map.contains_key(&Value::from("\\path")));
        assert!(map.contains_key(&Value::from("key")));

        let already_escaped = Map::new().with("\\path", 1);
        let spec = Argument::from(already_escaped).to_spec();
        assert!(spec.as_map().unwrap().contains_key(&Value::from("\\\\path")));
    }

    #[test]
    fn test_path_argument_needs_source() {
        let arg = Argument::Path(DataPath::new(vec!["a".into()]));
        assert!(arg.resolve(None).is_err());
        let source = Value::Map(Map::new().with("a", 3));
        assert_eq!(arg.resolve(Some(&source)), Ok(Value::Int(3)));
    }
}
