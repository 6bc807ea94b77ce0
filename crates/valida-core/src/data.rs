//! Data adapter
//!
//! `Data` wraps a list or a map and exposes its children uniformly as ordered
//! `(key, value)` entries: list entries are keyed by their index, map entries
//! by their key. Scalars are never copied; nested containers are wrapped on
//! demand through [`Entry::as_data`].

use crate::error::{CoreError, Result};
use crate::path::{DataPath, Match, Resolved};
use crate::types::Value;

/// Key of a container entry: a list index or a map key
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataKey<'a> {
    Index(usize),
    Key(&'a Value),
}

impl DataKey<'_> {
    /// Owned value of this key (indices become integers)
    pub fn to_value(&self) -> Value {
        match self {
            DataKey::Index(idx) => Value::from(*idx),
            DataKey::Key(key) => (*key).clone(),
        }
    }
}

/// One child of a container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<'a> {
    pub key: DataKey<'a>,
    pub value: &'a Value,
}

impl<'a> Entry<'a> {
    /// Wrap this entry's value if it is itself a container
    pub fn as_data(&self) -> Option<Data<'a>> {
        Data::new(self.value).ok()
    }
}

/// Read-only view over a list or map
#[derive(Debug, Clone, PartialEq)]
pub struct Data<'a> {
    root: &'a Value,
    is_list: bool,
    entries: Vec<Entry<'a>>,
}

impl<'a> Data<'a> {
    /// Wrap a list or map; any other value is not filterable
    pub fn new(root: &'a Value) -> Result<Self> {
        let (is_list, entries) = match root {
            Value::List(items) => (
                true,
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, value)| Entry {
                        key: DataKey::Index(idx),
                        value,
                    })
                    .collect(),
            ),
            Value::Map(map) => (
                false,
                map.iter()
                    .map(|(key, value)| Entry {
                        key: DataKey::Key(key),
                        value,
                    })
                    .collect(),
            ),
            other => return Err(CoreError::NotFilterable(other.to_string())),
        };
        Ok(Self {
            root,
            is_list,
            entries,
        })
    }

    /// The wrapped value
    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn is_map(&self) -> bool {
        !self.is_list
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry<'a>] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = DataKey<'a>> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &'a Value> + '_ {
        self.entries.iter().map(|e| e.value)
    }

    /// Direct child lookup: map key equality, or list index for integer literals
    pub fn child(&self, literal: &Value) -> Option<Entry<'a>> {
        if self.is_list {
            let idx = usize::try_from(literal.as_i64()?).ok()?;
            self.entries.get(idx).copied()
        } else {
            self.entries
                .iter()
                .find(|e| matches!(e.key, DataKey::Key(k) if k.loose_eq(literal)))
                .copied()
        }
    }

    /// Resolve a path against the wrapped value
    pub fn get(&self, path: &DataPath) -> Result<Resolved<Value>> {
        path.get_data(self.root)
    }

    /// Resolve a path against the wrapped value, keeping provenance
    pub fn get_with_paths(&self, path: &DataPath) -> Result<Resolved<Match>> {
        path.get_data_with_paths(self.root)
    }
}
