//! Container selectors
//!
//! A selector fans out over the children of a map, a list, or either, and
//! keeps those that pass its condition. The map-side condition may use key
//! and value leaves, the list-side condition index and value leaves.

use crate::condition::{index, key, value, Condition, EvalOptions, GeneralPredicates};
use crate::data::Entry;
use crate::error::{CoreError, Result};
use crate::types::{Map, Value};
use std::fmt;

/// Which containers a selector applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Map,
    List,
    MapOrList,
}

impl ContainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Map => "map_value",
            ContainerKind::List => "list_value",
            ContainerKind::MapOrList => "map_or_list_value",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "map_value" => Some(ContainerKind::Map),
            "list_value" => Some(ContainerKind::List),
            "map_or_list_value" => Some(ContainerKind::MapOrList),
            _ => None,
        }
    }

    fn accepts_map(&self) -> bool {
        !matches!(self, ContainerKind::List)
    }

    fn accepts_list(&self) -> bool {
        !matches!(self, ContainerKind::Map)
    }
}

/// A selector slot: either a full condition or a literal to compare against
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Condition(Condition),
    Literal(Value),
}

impl From<Condition> for Criterion {
    fn from(c: Condition) -> Self {
        Criterion::Condition(c)
    }
}

impl From<Value> for Criterion {
    fn from(v: Value) -> Self {
        Criterion::Literal(v)
    }
}

impl From<&str> for Criterion {
    fn from(s: &str) -> Self {
        Criterion::Literal(s.into())
    }
}

impl From<String> for Criterion {
    fn from(s: String) -> Self {
        Criterion::Literal(s.into())
    }
}

impl From<i64> for Criterion {
    fn from(i: i64) -> Self {
        Criterion::Literal(i.into())
    }
}

impl From<i32> for Criterion {
    fn from(i: i32) -> Self {
        Criterion::Literal(i.into())
    }
}

impl From<usize> for Criterion {
    fn from(i: usize) -> Self {
        Criterion::Literal(i.into())
    }
}

impl From<f64> for Criterion {
    fn from(f: f64) -> Self {
        Criterion::Literal(f.into())
    }
}

impl From<bool> for Criterion {
    fn from(b: bool) -> Self {
        Criterion::Literal(b.into())
    }
}

/// Path segment that selects zero or more children of a container
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerValue {
    kind: ContainerKind,
    map_condition: Condition,
    list_condition: Condition,
    label: Option<String>,
}

impl ContainerValue {
    /// Selector matching every child of the given container kind
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            map_condition: Condition::Null,
            list_condition: Condition::Null,
            label: None,
        }
    }

    pub fn map_value() -> SelectorBuilder {
        SelectorBuilder::new(ContainerKind::Map)
    }

    pub fn list_value() -> SelectorBuilder {
        SelectorBuilder::new(ContainerKind::List)
    }

    pub fn map_or_list_value() -> SelectorBuilder {
        SelectorBuilder::new(ContainerKind::MapOrList)
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Condition applied when the container is a map
    pub fn map_condition(&self) -> &Condition {
        &self.map_condition
    }

    /// Condition applied when the container is a list
    pub fn list_condition(&self) -> &Condition {
        &self.list_condition
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Children of `value` kept by this selector; path arguments resolve
    /// against `root`. Scalars and containers of the wrong kind yield nothing.
    pub fn select<'a>(&self, value: &'a Value, root: &Value) -> Result<Vec<Entry<'a>>> {
        let condition = match value {
            Value::Map(_) if self.kind.accepts_map() => &self.map_condition,
            Value::List(_) if self.kind.accepts_list() => &self.list_condition,
            _ => return Ok(Vec::new()),
        };
        let options = EvalOptions::new().with_source(root);
        Ok(condition.filter_with(value, options)?.kept_entries())
    }

    /// Child values of `value` kept by this selector
    pub fn filter<'a>(&self, value: &'a Value) -> Result<Vec<&'a Value>> {
        Ok(self
            .select(value, value)?
            .into_iter()
            .map(|entry| entry.value)
            .collect())
    }

    pub fn to_spec(&self) -> Value {
        let mut spec = Map::new().with("type", self.kind.name());
        match self.kind {
            ContainerKind::Map if !self.map_condition.is_null() => {
                spec.insert("condition", self.map_condition.to_spec());
            }
            ContainerKind::List if !self.list_condition.is_null() => {
                spec.insert("condition", self.list_condition.to_spec());
            }
            ContainerKind::MapOrList => {
                if !self.map_condition.is_null() {
                    spec.insert("map_condition", self.map_condition.to_spec());
                }
                if !self.list_condition.is_null() {
                    spec.insert("list_condition", self.list_condition.to_spec());
                }
            }
            _ => {}
        }
        if let Some(label) = &self.label {
            spec.insert("label", label.as_str());
        }
        Value::Map(spec)
    }
}

impl fmt::Display for ContainerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        if let Some(label) = &self.label {
            write!(f, "[{label}]")?;
        }
        match self.kind {
            ContainerKind::Map if !self.map_condition.is_null() => {
                write!(f, "({})", self.map_condition)
            }
            ContainerKind::List if !self.list_condition.is_null() => {
                write!(f, "({})", self.list_condition)
            }
            ContainerKind::MapOrList
                if !(self.map_condition.is_null() && self.list_condition.is_null()) =>
            {
                write!(f, "(map: {}, list: {})", self.map_condition, self.list_condition)
            }
            _ => Ok(()),
        }
    }
}

/// Builder for [`ContainerValue`]
#[derive(Debug, Clone)]
pub struct SelectorBuilder {
    kind: ContainerKind,
    condition: Condition,
    map_condition: Condition,
    list_condition: Condition,
    key: Option<Criterion>,
    index: Option<Criterion>,
    value: Option<Criterion>,
    label: Option<String>,
}

impl SelectorBuilder {
    fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            condition: Condition::Null,
            map_condition: Condition::Null,
            list_condition: Condition::Null,
            key: None,
            index: None,
            value: None,
            label: None,
        }
    }

    /// Map key: a literal or a key condition
    pub fn key(mut self, key: impl Into<Criterion>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// List index: a literal or an index condition
    pub fn index(mut self, index: impl Into<Criterion>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Child value: a literal or a value condition
    pub fn value(mut self, value: impl Into<Criterion>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Condition applied to every container kind this selector accepts
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Extra condition applied only to maps
    pub fn map_condition(mut self, condition: Condition) -> Self {
        self.map_condition = condition;
        self
    }

    /// Extra condition applied only to lists
    pub fn list_condition(mut self, condition: Condition) -> Self {
        self.list_condition = condition;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn build(self) -> Result<ContainerValue> {
        let kind = self.kind;
        if kind == ContainerKind::Map && (self.index.is_some() || !self.list_condition.is_null()) {
            return Err(CoreError::IncompatibleRole(
                "map_value selectors do not take an index or list condition".to_string(),
            ));
        }
        if kind == ContainerKind::List && (self.key.is_some() || !self.map_condition.is_null()) {
            return Err(CoreError::IncompatibleRole(
                "list_value selectors do not take a key or map condition".to_string(),
            ));
        }

        let on_key = slot(self.key, "key", |c| c.is_key_like(), |v| key().equal_to(v))?;
        let on_index = slot(self.index, "index", |c| c.is_index_like(), |v| index().equal_to(v))?;
        let on_value = slot(self.value, "value", |c| c.is_value_like(), |v| value().equal_to(v))?;

        let (map_condition, list_condition) = match kind {
            ContainerKind::Map => (
                self.condition.and(self.map_condition)?.and(on_key)?.and(on_value)?,
                Condition::Null,
            ),
            ContainerKind::List => (
                Condition::Null,
                self.condition.and(self.list_condition)?.and(on_index)?.and(on_value)?,
            ),
            ContainerKind::MapOrList => (
                self.condition
                    .clone()
                    .and(self.map_condition)?
                    .and(on_key)?
                    .and(on_value.clone())?,
                self.condition.and(self.list_condition)?.and(on_index)?.and(on_value)?,
            ),
        };

        if map_condition.has_index_leaves() {
            return Err(CoreError::IncompatibleRole(format!(
                "index condition cannot apply to maps in {}",
                kind.name()
            )));
        }
        if list_condition.has_key_leaves() {
            return Err(CoreError::IncompatibleRole(format!(
                "key condition cannot apply to lists in {}",
                kind.name()
            )));
        }

        Ok(ContainerValue {
            kind,
            map_condition,
            list_condition,
            label: self.label,
        })
    }
}

fn slot(
    criterion: Option<Criterion>,
    role: &str,
    fits: impl Fn(&Condition) -> bool,
    literal: impl Fn(Value) -> Condition,
) -> Result<Condition> {
    match criterion {
        None => Ok(Condition::Null),
        Some(Criterion::Literal(v)) => Ok(literal(v)),
        Some(Criterion::Condition(c)) if fits(&c) => Ok(c),
        Some(Criterion::Condition(c)) => Err(CoreError::IncompatibleRole(format!(
            "{role} slot needs a {role} condition, got {c}"
        ))),
    }
}
