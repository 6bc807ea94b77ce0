//! Data paths
//!
//! A `DataPath` is an ordered list of segments: literal keys/indices or
//! container selectors. A path made only of literals is concrete and
//! addresses at most one location. Non-concrete paths fan out and may carry
//! an arity selector; any path may carry a derived-value transform.

mod container;
mod resolve;

pub use container::{ContainerKind, ContainerValue, Criterion, SelectorBuilder};
pub use resolve::{Match, Resolved};

use crate::condition::{key, GeneralPredicates};
use crate::error::{CoreError, Result};
use crate::types::{Map, Value};
use std::fmt;
use std::ops::Div;
use std::str::FromStr;

/// One segment of a path
#[derive(Debug, Clone, PartialEq)]
pub enum PathPart {
    /// Exact map key or list index
    Literal(Value),
    Container(ContainerValue),
}

impl PathPart {
    pub fn is_literal(&self) -> bool {
        matches!(self, PathPart::Literal(_))
    }

    fn to_spec(&self) -> Value {
        match self {
            PathPart::Literal(v) => v.clone(),
            PathPart::Container(c) => c.to_spec(),
        }
    }
}

impl From<Value> for PathPart {
    fn from(v: Value) -> Self {
        PathPart::Literal(v)
    }
}

impl From<&str> for PathPart {
    fn from(s: &str) -> Self {
        PathPart::Literal(s.into())
    }
}

impl From<String> for PathPart {
    fn from(s: String) -> Self {
        PathPart::Literal(s.into())
    }
}

impl From<i64> for PathPart {
    fn from(i: i64) -> Self {
        PathPart::Literal(i.into())
    }
}

impl From<i32> for PathPart {
    fn from(i: i32) -> Self {
        PathPart::Literal(i.into())
    }
}

impl From<usize> for PathPart {
    fn from(i: usize) -> Self {
        PathPart::Literal(i.into())
    }
}

impl From<ContainerValue> for PathPart {
    fn from(c: ContainerValue) -> Self {
        PathPart::Container(c)
    }
}

impl fmt::Display for PathPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPart::Literal(Value::String(s)) => f.write_str(s),
            PathPart::Literal(v) => write!(f, "{v}"),
            PathPart::Container(c) => write!(f, "{c}"),
        }
    }
}

/// Derived value taken from each match after the positional segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatumType {
    MapKeys,
    MapValues,
    Length,
    DataType,
}

impl DatumType {
    pub fn name(&self) -> &'static str {
        match self {
            DatumType::MapKeys => "map_keys",
            DatumType::MapValues => "map_values",
            DatumType::Length => "length",
            DatumType::DataType => "dtype",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "map_keys" => Some(DatumType::MapKeys),
            "map_values" => Some(DatumType::MapValues),
            "length" | "len" => Some(DatumType::Length),
            "dtype" | "type" => Some(DatumType::DataType),
            _ => None,
        }
    }

    /// Derived value, or `None` when the transform does not apply
    pub fn apply(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (DatumType::MapKeys, Value::Map(map)) => Some(Value::List(map.keys().cloned().collect())),
            (DatumType::MapKeys, Value::List(items)) => {
                Some(Value::List((0..items.len()).map(Value::from).collect()))
            }
            (DatumType::MapValues, Value::Map(map)) => {
                Some(Value::List(map.values().cloned().collect()))
            }
            (DatumType::MapValues, Value::List(items)) => Some(Value::List(items.clone())),
            (DatumType::Length, v) => v.len().map(Value::from),
            (DatumType::DataType, v) => Some(Value::Type(v.dtype())),
            _ => None,
        }
    }
}

/// How many matches a non-concrete path may yield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Single,
    First,
    Last,
    All,
}

impl Arity {
    pub fn name(&self) -> &'static str {
        match self {
            Arity::Single => "single",
            Arity::First => "first",
            Arity::Last => "last",
            Arity::All => "all",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "single" => Some(Arity::Single),
            "first" => Some(Arity::First),
            "last" => Some(Arity::Last),
            "all" => Some(Arity::All),
            _ => None,
        }
    }

    /// Narrow a match set; `single` needs exactly one match, `first` and
    /// `last` at least one
    pub fn apply<T>(&self, mut matches: Vec<T>) -> Result<Vec<T>> {
        match self {
            Arity::All => Ok(matches),
            Arity::Single if matches.len() == 1 => Ok(matches),
            Arity::Single => Err(CoreError::ArityViolation(format!(
                "single() expects exactly one match, found {}",
                matches.len()
            ))),
            Arity::First | Arity::Last if matches.is_empty() => Err(CoreError::ArityViolation(
                format!("{}() found no matches", self.name()),
            )),
            Arity::First => {
                matches.truncate(1);
                Ok(matches)
            }
            Arity::Last => Ok(matches.pop().into_iter().collect()),
        }
    }

    /// Whether the result is a single datum rather than a collection
    pub fn is_singular(&self) -> bool {
        !matches!(self, Arity::All)
    }
}

/// Path into nested list/map data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataPath {
    parts: Vec<PathPart>,
    datum_type: Option<DatumType>,
    arity: Option<Arity>,
}

impl DataPath {
    pub fn new(parts: Vec<PathPart>) -> Self {
        Self {
            parts,
            datum_type: None,
            arity: None,
        }
    }

    /// Parse a delimited string; integer segments may address a list index
    /// or an integer-like map key
    pub fn from_str_with_delimiter(s: &str, delimiter: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        let mut parts = Vec::new();
        for segment in s.split(delimiter) {
            let part = match segment.parse::<i64>() {
                Ok(n) => PathPart::Container(
                    ContainerValue::map_or_list_value()
                        .key(key().in_(vec![Value::from(segment), Value::Int(n)]))
                        .index(n)
                        .build()?,
                ),
                Err(_) => PathPart::from(segment),
            };
            parts.push(part);
        }
        Ok(Self::new(parts))
    }

    pub fn parts(&self) -> &[PathPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn datum_type(&self) -> Option<DatumType> {
        self.datum_type
    }

    pub fn arity(&self) -> Option<Arity> {
        self.arity
    }

    /// Every segment is a literal key or index
    pub fn is_concrete(&self) -> bool {
        self.parts.iter().all(PathPart::is_literal)
    }

    /// Append a segment
    pub fn push(mut self, part: impl Into<PathPart>) -> Self {
        self.parts.push(part.into());
        self
    }

    /// Append the segments of another path; its transform and arity win if set
    pub fn join(mut self, other: DataPath) -> Self {
        self.parts.extend(other.parts);
        self.datum_type = other.datum_type.or(self.datum_type);
        self.arity = other.arity.or(self.arity);
        self
    }

    pub fn with_datum_type(mut self, datum_type: DatumType) -> Self {
        self.datum_type = Some(datum_type);
        self
    }

    pub fn map_keys(self) -> Self {
        self.with_datum_type(DatumType::MapKeys)
    }

    pub fn map_values(self) -> Self {
        self.with_datum_type(DatumType::MapValues)
    }

    pub fn length(self) -> Self {
        self.with_datum_type(DatumType::Length)
    }

    pub fn dtype(self) -> Self {
        self.with_datum_type(DatumType::DataType)
    }

    /// Set the arity selector; concrete paths already address one location
    pub fn with_arity(mut self, arity: Arity) -> Result<Self> {
        if self.is_concrete() {
            return Err(CoreError::ArityViolation(format!(
                "{}() cannot apply to concrete path {self}",
                arity.name()
            )));
        }
        self.arity = Some(arity);
        Ok(self)
    }

    pub fn single(self) -> Result<Self> {
        self.with_arity(Arity::Single)
    }

    pub fn first(self) -> Result<Self> {
        self.with_arity(Arity::First)
    }

    pub fn last(self) -> Result<Self> {
        self.with_arity(Arity::Last)
    }

    pub fn all(self) -> Result<Self> {
        self.with_arity(Arity::All)
    }

    /// Spec key, e.g. `path.single.map_keys`
    pub fn spec_key(&self) -> String {
        let mut key = String::from("path");
        if let Some(arity) = self.arity {
            key.push('.');
            key.push_str(arity.name());
        }
        if let Some(datum_type) = self.datum_type {
            key.push('.');
            key.push_str(datum_type.name());
        }
        key
    }

    pub fn to_spec(&self) -> Value {
        let parts = Value::List(self.parts.iter().map(PathPart::to_spec).collect());
        Value::Map(Map::new().with(self.spec_key(), parts))
    }
}

impl<T: Into<PathPart>> Div<T> for DataPath {
    type Output = DataPath;

    fn div(self, rhs: T) -> DataPath {
        self.push(rhs)
    }
}

impl FromStr for DataPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_delimiter(s, "/")
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parts.is_empty() {
            f.write_str("(root)")?;
        }
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            write!(f, "{part}")?;
        }
        if let Some(arity) = self.arity {
            write!(f, ".{}", arity.name())?;
        }
        if let Some(datum_type) = self.datum_type {
            write!(f, ".{}", datum_type.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::value;

    #[test]
    fn test_concreteness() {
        let path = DataPath::new(vec!["a".into(), 0.into(), "b".into()]);
        assert!(path.is_concrete());
        let path = DataPath::new(vec!["a".into()]) / ContainerValue::new(ContainerKind::Map);
        assert!(!path.is_concrete());
        assert!(DataPath::default().is_concrete());
    }

    #[test]
    fn test_arity_on_concrete_path_rejected() {
        let path = DataPath::new(vec!["a".into()]);
        assert!(matches!(path.clone().single(), Err(CoreError::ArityViolation(_))));
        assert!(path.first().is_err());
    }

    #[test]
    fn test_transform_order_is_irrelevant() {
        let base = DataPath::new(vec![ContainerValue::new(ContainerKind::Map).into()]);
        let a = base.clone().map_keys().single().unwrap();
        let b = base.single().unwrap().map_keys();
        assert_eq!(a, b);
        assert_eq!(a.spec_key(), "path.single.map_keys");
    }

    #[test]
    fn test_arity_apply() {
        assert!(Arity::Single.apply(vec![1, 2]).is_err());
        assert!(Arity::Single.apply(Vec::<i32>::new()).is_err());
        assert!(Arity::First.apply(Vec::<i32>::new()).is_err());
        assert_eq!(Arity::First.apply(vec![1, 2]).unwrap(), vec![1]);
        assert_eq!(Arity::Last.apply(vec![1, 2]).unwrap(), vec![2]);
        assert_eq!(Arity::All.apply(Vec::<i32>::new()).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_datum_type_apply() {
        let map = Value::Map(Map::new().with("a", 1).with("b", 2));
        assert_eq!(DatumType::MapKeys.apply(&map), Some(Value::from(vec!["a", "b"])));
        assert_eq!(DatumType::MapValues.apply(&map), Some(Value::from(vec![1, 2])));
        assert_eq!(DatumType::Length.apply(&map), Some(Value::Int(2)));
        assert_eq!(DatumType::Length.apply(&Value::Int(2)), None);
        assert_eq!(DatumType::MapKeys.apply(&Value::from(vec![7, 8])), Some(Value::from(vec![0, 1])));
        assert_eq!(DatumType::MapKeys.apply(&Value::Null), None);
    }

    #[test]
    fn test_from_str() {
        let path: DataPath = "a/0".parse().unwrap();
        let expected = DataPath::new(vec![
            "a".into(),
            ContainerValue::map_or_list_value()
                .key(key().in_(vec![Value::from("0"), Value::Int(0)]))
                .index(0)
                .build()
                .unwrap()
                .into(),
        ]);
        assert_eq!(path, expected);
        assert!(!path.is_concrete());
        assert_eq!("".parse::<DataPath>().unwrap(), DataPath::default());
        let dotted = DataPath::from_str_with_delimiter("a.b", ".").unwrap();
        assert_eq!(dotted, DataPath::new(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_to_spec_and_display() {
        let path = DataPath::new(vec![
            "a".into(),
            ContainerValue::map_value()
                .value(value().truthy())
                .build()
                .unwrap()
                .into(),
        ])
        .length();
        let spec = path.to_spec();
        let map = spec.as_map().unwrap();
        let parts = map.get(&Value::from("path.length")).unwrap().as_list().unwrap();
        assert_eq!(parts[0], Value::from("a"));
        assert_eq!(path.to_string(), "a/map_value(value.truthy()).length");
    }
}
