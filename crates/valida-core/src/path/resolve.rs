//! Path resolution
//!
//! Resolution walks a working set of `(value, path taken)` pairs, seeded with
//! the root. Each segment maps every member to zero or more children and the
//! results are concatenated; missing keys and empty selections just prune.

use super::{DataPath, PathPart};
use crate::data::Data;
use crate::error::Result;
use crate::types::Value;

/// A resolved datum and the concrete keys/indices taken to reach it
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub value: Value,
    pub path: Vec<Value>,
}

/// Outcome of resolving a path
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    /// A concrete path that addresses nothing
    Missing,
    /// A concrete path, or a path narrowed by `single`/`first`/`last`
    One(T),
    /// A non-concrete path; possibly empty
    Many(Vec<T>),
}

impl<T> Resolved<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Resolved::Missing)
    }

    /// Number of resolved data
    pub fn len(&self) -> usize {
        match self {
            Resolved::Missing => 0,
            Resolved::One(_) => 1,
            Resolved::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Resolved::Missing => Vec::new(),
            Resolved::One(item) => vec![item],
            Resolved::Many(items) => items,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Resolved<U> {
        match self {
            Resolved::Missing => Resolved::Missing,
            Resolved::One(item) => Resolved::One(f(item)),
            Resolved::Many(items) => Resolved::Many(items.into_iter().map(f).collect()),
        }
    }
}

impl DataPath {
    /// All matches in encounter order, after transforms and arity
    pub fn resolve(&self, root: &Value) -> Result<Vec<Match>> {
        let mut working: Vec<(&Value, Vec<Value>)> = vec![(root, Vec::new())];

        for part in self.parts() {
            let mut next = Vec::new();
            for (value, taken) in working {
                match part {
                    PathPart::Literal(literal) => {
                        let child = Data::new(value).ok().and_then(|data| data.child(literal));
                        if let Some(entry) = child {
                            next.push((entry.value, extend(&taken, entry.key.to_value())));
                        }
                    }
                    PathPart::Container(selector) => {
                        for entry in selector.select(value, root)? {
                            next.push((entry.value, extend(&taken, entry.key.to_value())));
                        }
                    }
                }
            }
            working = next;
        }

        let mut matches = Vec::with_capacity(working.len());
        for (value, path) in working {
            let value = match self.datum_type() {
                None => value.clone(),
                Some(datum_type) => match datum_type.apply(value) {
                    Some(derived) => derived,
                    None => {
                        log::debug!("{} does not apply to {} at {:?}", datum_type.name(), value, path);
                        continue;
                    }
                },
            };
            matches.push(Match { value, path });
        }

        match self.arity() {
            Some(arity) => arity.apply(matches),
            None => Ok(matches),
        }
    }

    /// Resolve with provenance
    pub fn get_data_with_paths(&self, root: &Value) -> Result<Resolved<Match>> {
        let matches = self.resolve(root)?;
        let singular = self.is_concrete() || self.arity().map_or(false, |a| a.is_singular());
        if singular {
            Ok(matches.into_iter().next().map_or(Resolved::Missing, Resolved::One))
        } else {
            Ok(Resolved::Many(matches))
        }
    }

    /// Resolve to values only
    pub fn get_data(&self, root: &Value) -> Result<Resolved<Value>> {
        Ok(self.get_data_with_paths(root)?.map(|m| m.value))
    }
}

fn extend(taken: &[Value], step: Value) -> Vec<Value> {
    let mut path = Vec::with_capacity(taken.len() + 1);
    path.extend_from_slice(taken);
    path.push(step);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{key, value, GeneralPredicates};
    use crate::error::CoreError;
    use crate::path::{ContainerKind, ContainerValue};
    use crate::types::Map;

    fn any_map() -> PathPart {
        ContainerValue::new(ContainerKind::Map).into()
    }

    #[test]
    fn test_concrete_path_returns_single_value() {
        let data = Value::Map(Map::new().with("a", vec![10, 20]));
        let path = DataPath::new(vec!["a".into(), 1.into()]);
        assert_eq!(path.get_data(&data).unwrap(), Resolved::One(Value::Int(20)));
        let missing = DataPath::new(vec!["b".into()]);
        assert_eq!(missing.get_data(&data).unwrap(), Resolved::Missing);
    }

    #[test]
    fn test_fan_out_with_key_condition() {
        let data = Value::Map(
            Map::new()
                .with("A1", Map::new().with("X1", 1))
                .with("A2", Map::new().with("X1", 2)),
        );
        let path = DataPath::new(vec![
            any_map(),
            ContainerValue::map_value().key("X1").build().unwrap().into(),
        ]);
        assert_eq!(
            path.get_data(&data).unwrap(),
            Resolved::Many(vec![Value::Int(1), Value::Int(2)])
        );
        let with_paths = path.get_data_with_paths(&data).unwrap().into_vec();
        assert_eq!(with_paths[1].path, vec![Value::from("A2"), Value::from("X1")]);
    }

    #[test]
    fn test_arity_selectors() {
        let data = Value::Map(
            Map::new()
                .with("c", Map::new().with("C1", 19).with("C2", 20))
                .with("d", Map::new().with("D1", 21)),
        );
        let selector = ContainerValue::map_value()
            .key(key().in_(vec!["c", "d"]))
            .build()
            .unwrap();
        let path = DataPath::new(vec![selector.into()]);

        let first = path.clone().first().unwrap();
        assert_eq!(
            first.get_data(&data).unwrap(),
            Resolved::One(Value::Map(Map::new().with("C1", 19).with("C2", 20)))
        );
        let single = path.clone().single().unwrap();
        assert!(matches!(single.get_data(&data), Err(CoreError::ArityViolation(_))));
        let all = path.all().unwrap();
        assert_eq!(all.get_data(&data).unwrap().len(), 2);
    }

    #[test]
    fn test_non_concrete_path_always_returns_collection() {
        let data = Value::Map(Map::new().with("a", 1));
        let path = DataPath::new(vec![any_map()]);
        assert_eq!(path.get_data(&data).unwrap(), Resolved::Many(vec![Value::Int(1)]));
        let none = DataPath::new(vec![ContainerValue::new(ContainerKind::List).into()]);
        assert_eq!(none.get_data(&data).unwrap(), Resolved::Many(vec![]));
    }

    #[test]
    fn test_transforms() {
        let data = Value::Map(Map::new().with("c", "hey!"));
        assert_eq!(
            DataPath::default().length().get_data(&data).unwrap(),
            Resolved::One(Value::Int(1))
        );
        let keys = DataPath::default().map_keys().get_data(&data).unwrap();
        assert_eq!(keys, Resolved::One(Value::from(vec!["c"])));

        let mixed = Value::from(vec![Value::from("ab"), Value::Int(3)]);
        let lengths = DataPath::new(vec![ContainerValue::new(ContainerKind::List).into()])
            .length()
            .get_data(&mixed)
            .unwrap();
        assert_eq!(lengths, Resolved::Many(vec![Value::Int(2)]));
    }

    #[test]
    fn test_value_condition_selects_nested_maps() {
        let data = Value::Map(
            Map::new()
                .with("a", Map::new().with("x", 1))
                .with("b", 2)
                .with("c", Map::new().with("y", 3)),
        );
        let dicts = ContainerValue::map_value()
            .value(value().dtype().equal_to(crate::types::DataType::Dict))
            .build()
            .unwrap();
        let path = DataPath::new(vec![dicts.into(), any_map()]);
        assert_eq!(
            path.get_data(&data).unwrap().into_vec(),
            vec![Value::Int(1), Value::Int(3)]
        );
    }
}
