//! Predicate registry
//!
//! A fixed, statically declared catalog of named boolean checks. Each entry
//! states its canonical name, aliases, ordered parameter list and scope up
//! front so the spec compiler can dispatch by name and validate positional
//! vs. keyword invocation without any introspection.
//!
//! User code may add [`CustomPredicate`]s; those return a `Value`, and
//! anything other than a boolean is reported as an invalid predicate result.

use crate::types::{DataType, Value};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Non-fatal failure while evaluating a predicate against one datum
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateError(pub String);

impl PredicateError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for PredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared parameter of a predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param {
    pub name: &'static str,
    pub default: Option<f64>,
}

impl Param {
    const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: None,
        }
    }

    const fn optional(name: &'static str, default: f64) -> Self {
        Self {
            name,
            default: Some(default),
        }
    }
}

/// Which data a predicate makes sense for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateScope {
    /// Any datum; usable by every role and after any pre-processor
    General,
    /// Mapping data only; usable by plain value and key conditions
    Map,
}

/// Built-in predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    EqualTo,
    NotEqualTo,
    LessThan,
    GreaterThan,
    LessThanOrEqualTo,
    GreaterThanOrEqualTo,
    In,
    NotIn,
    InRange,
    NotInRange,
    EqualToApprox,
    Truthy,
    Falsy,
    Null,
    IsInstance,
    KeysContain,
    KeysContainAnyOf,
    KeysContainAllOf,
    KeysContainOneOf,
    KeysContainAtLeastOneOf,
    KeysContainAtMostOneOf,
    KeysContainNOf,
    KeysContainAtLeastNOf,
    KeysContainAtMostNOf,
    KeysEqualTo,
    ItemsContain,
}

const VALUE: &[Param] = &[Param::required("value")];
const RANGE: &[Param] = &[Param::required("lower"), Param::required("upper")];
const APPROX: &[Param] = &[Param::required("value"), Param::optional("tolerance", 1e-8)];
const NONE: &[Param] = &[];
const CLASSES: &[Param] = &[Param::required("classes")];
const KEY: &[Param] = &[Param::required("key")];
const KEYS: &[Param] = &[Param::required("keys")];
const N_KEYS: &[Param] = &[Param::required("n"), Param::required("keys")];
const ITEMS: &[Param] = &[Param::required("items")];

impl Builtin {
    pub const ALL: [Builtin; 26] = [
        Builtin::EqualTo,
        Builtin::NotEqualTo,
        Builtin::LessThan,
        Builtin::GreaterThan,
        Builtin::LessThanOrEqualTo,
        Builtin::GreaterThanOrEqualTo,
        Builtin::In,
        Builtin::NotIn,
        Builtin::InRange,
        Builtin::NotInRange,
        Builtin::EqualToApprox,
        Builtin::Truthy,
        Builtin::Falsy,
        Builtin::Null,
        Builtin::IsInstance,
        Builtin::KeysContain,
        Builtin::KeysContainAnyOf,
        Builtin::KeysContainAllOf,
        Builtin::KeysContainOneOf,
        Builtin::KeysContainAtLeastOneOf,
        Builtin::KeysContainAtMostOneOf,
        Builtin::KeysContainNOf,
        Builtin::KeysContainAtLeastNOf,
        Builtin::KeysContainAtMostNOf,
        Builtin::KeysEqualTo,
        Builtin::ItemsContain,
    ];

    /// Canonical (lower-case) name
    pub fn name(self) -> &'static str {
        match self {
            Builtin::EqualTo => "equal_to",
            Builtin::NotEqualTo => "not_equal_to",
            Builtin::LessThan => "less_than",
            Builtin::GreaterThan => "greater_than",
            Builtin::LessThanOrEqualTo => "less_than_or_equal_to",
            Builtin::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            Builtin::In => "in_",
            Builtin::NotIn => "not_in",
            Builtin::InRange => "in_range",
            Builtin::NotInRange => "not_in_range",
            Builtin::EqualToApprox => "equal_to_approx",
            Builtin::Truthy => "truthy",
            Builtin::Falsy => "falsy",
            Builtin::Null => "null",
            Builtin::IsInstance => "is_instance",
            Builtin::KeysContain => "keys_contain",
            Builtin::KeysContainAnyOf => "keys_contain_any_of",
            Builtin::KeysContainAllOf => "keys_contain_all_of",
            Builtin::KeysContainOneOf => "keys_contain_one_of",
            Builtin::KeysContainAtLeastOneOf => "keys_contain_at_least_one_of",
            Builtin::KeysContainAtMostOneOf => "keys_contain_at_most_one_of",
            Builtin::KeysContainNOf => "keys_contain_n_of",
            Builtin::KeysContainAtLeastNOf => "keys_contain_at_least_n_of",
            Builtin::KeysContainAtMostNOf => "keys_contain_at_most_n_of",
            Builtin::KeysEqualTo => "keys_equal_to",
            Builtin::ItemsContain => "items_contain",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Builtin::EqualTo => &["eq"],
            Builtin::LessThan => &["lt"],
            Builtin::GreaterThan => &["gt"],
            Builtin::LessThanOrEqualTo => &["lte"],
            Builtin::GreaterThanOrEqualTo => &["gte"],
            Builtin::In => &["in"],
            _ => &[],
        }
    }

    pub fn params(self) -> &'static [Param] {
        match self {
            Builtin::EqualTo
            | Builtin::NotEqualTo
            | Builtin::LessThan
            | Builtin::GreaterThan
            | Builtin::LessThanOrEqualTo
            | Builtin::GreaterThanOrEqualTo
            | Builtin::In
            | Builtin::NotIn => VALUE,
            Builtin::InRange | Builtin::NotInRange => RANGE,
            Builtin::EqualToApprox => APPROX,
            Builtin::Truthy | Builtin::Falsy | Builtin::Null => NONE,
            Builtin::IsInstance => CLASSES,
            Builtin::KeysContain => KEY,
            Builtin::KeysContainAnyOf
            | Builtin::KeysContainAllOf
            | Builtin::KeysContainOneOf
            | Builtin::KeysContainAtLeastOneOf
            | Builtin::KeysContainAtMostOneOf
            | Builtin::KeysEqualTo => KEYS,
            Builtin::KeysContainNOf | Builtin::KeysContainAtLeastNOf | Builtin::KeysContainAtMostNOf => {
                N_KEYS
            }
            Builtin::ItemsContain => ITEMS,
        }
    }

    pub fn scope(self) -> PredicateScope {
        match self {
            Builtin::KeysContain
            | Builtin::KeysContainAnyOf
            | Builtin::KeysContainAllOf
            | Builtin::KeysContainOneOf
            | Builtin::KeysContainAtLeastOneOf
            | Builtin::KeysContainAtMostOneOf
            | Builtin::KeysContainNOf
            | Builtin::KeysContainAtLeastNOf
            | Builtin::KeysContainAtMostNOf
            | Builtin::KeysEqualTo
            | Builtin::ItemsContain => PredicateScope::Map,
            _ => PredicateScope::General,
        }
    }

    /// Look up by canonical name or alias (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.name() == name || b.aliases().iter().any(|alias| *alias == name))
    }

    /// Evaluate against a (pre-processed) datum with arguments bound in
    /// declared parameter order
    pub fn evaluate(self, datum: &Value, args: &[Value]) -> Result<bool, PredicateError> {
        let arg = |idx: usize| {
            args.get(idx).ok_or_else(|| {
                PredicateError::new(format!("missing argument #{idx} for '{}'", self.name()))
            })
        };

        match self {
            Builtin::EqualTo => Ok(datum.loose_eq(arg(0)?)),
            Builtin::NotEqualTo => Ok(!datum.loose_eq(arg(0)?)),
            Builtin::LessThan => compare(datum, arg(0)?).map(|o| o == Ordering::Less),
            Builtin::GreaterThan => compare(datum, arg(0)?).map(|o| o == Ordering::Greater),
            Builtin::LessThanOrEqualTo => {
                compare(datum, arg(0)?).map(|o| o != Ordering::Greater)
            }
            Builtin::GreaterThanOrEqualTo => compare(datum, arg(0)?).map(|o| o != Ordering::Less),
            Builtin::In => contains(arg(0)?, datum),
            Builtin::NotIn => contains(arg(0)?, datum).map(|found| !found),
            Builtin::InRange => in_range(datum, arg(0)?, arg(1)?),
            Builtin::NotInRange => in_range(datum, arg(0)?, arg(1)?).map(|inside| !inside),
            Builtin::EqualToApprox => {
                let a = numeric(datum)?;
                let b = numeric(arg(0)?)?;
                let tolerance = numeric(arg(1)?)?;
                Ok((a - b).abs() <= tolerance)
            }
            Builtin::Truthy => Ok(datum.is_truthy()),
            Builtin::Falsy => Ok(!datum.is_truthy()),
            Builtin::Null => Ok(true),
            Builtin::IsInstance => {
                let classes = type_list(arg(0)?)?;
                Ok(classes.contains(&datum.dtype()))
            }
            Builtin::KeysContain => {
                let map = mapping(datum)?;
                Ok(map.contains_key(arg(0)?))
            }
            Builtin::KeysContainAnyOf => count_keys(datum, arg(0)?).map(|n| n > 0),
            Builtin::KeysContainAllOf => {
                let wanted = list(arg(0)?)?;
                count_keys(datum, arg(0)?).map(|n| n == wanted.len())
            }
            Builtin::KeysContainOneOf => count_keys(datum, arg(0)?).map(|n| n == 1),
            Builtin::KeysContainAtLeastOneOf => count_keys(datum, arg(0)?).map(|n| n >= 1),
            Builtin::KeysContainAtMostOneOf => count_keys(datum, arg(0)?).map(|n| n <= 1),
            Builtin::KeysContainNOf => {
                let n = count_arg(arg(0)?)?;
                count_keys(datum, arg(1)?).map(|found| found == n)
            }
            Builtin::KeysContainAtLeastNOf => {
                let n = count_arg(arg(0)?)?;
                count_keys(datum, arg(1)?).map(|found| found >= n)
            }
            Builtin::KeysContainAtMostNOf => {
                let n = count_arg(arg(0)?)?;
                count_keys(datum, arg(1)?).map(|found| found <= n)
            }
            Builtin::KeysEqualTo => {
                let map = mapping(datum)?;
                let wanted = list(arg(0)?)?;
                Ok(map.keys().all(|k| wanted.contains(k))
                    && wanted.iter().all(|k| map.contains_key(k)))
            }
            Builtin::ItemsContain => {
                let map = mapping(datum)?;
                let items = arg(0)?
                    .as_map()
                    .ok_or_else(|| PredicateError::new("'items' must be a mapping"))?;
                Ok(items
                    .iter()
                    .all(|(k, v)| map.get(k).map_or(false, |dv| dv.loose_eq(v))))
            }
        }
    }
}

fn compare(datum: &Value, other: &Value) -> Result<Ordering, PredicateError> {
    datum
        .loose_cmp(other)
        .ok_or_else(|| PredicateError::new(format!("cannot compare {datum} with {other}")))
}

fn contains(haystack: &Value, needle: &Value) -> Result<bool, PredicateError> {
    match (haystack, needle) {
        (Value::List(items), _) => Ok(items.iter().any(|i| i.loose_eq(needle))),
        (Value::Map(map), _) => Ok(map.contains_key(needle)),
        (Value::String(s), Value::String(sub)) => Ok(s.contains(sub.as_str())),
        _ => Err(PredicateError::new(format!(
            "membership of {needle} in {haystack} is undefined"
        ))),
    }
}

fn in_range(datum: &Value, lower: &Value, upper: &Value) -> Result<bool, PredicateError> {
    Ok(compare(datum, lower)? != Ordering::Less && compare(datum, upper)? != Ordering::Greater)
}

fn numeric(value: &Value) -> Result<f64, PredicateError> {
    value
        .as_f64()
        .ok_or_else(|| PredicateError::new(format!("{value} is not numeric")))
}

fn mapping(value: &Value) -> Result<&crate::types::Map, PredicateError> {
    value
        .as_map()
        .ok_or_else(|| PredicateError::new(format!("{value} is not a mapping")))
}

fn list(value: &Value) -> Result<&Vec<Value>, PredicateError> {
    value
        .as_list()
        .ok_or_else(|| PredicateError::new(format!("{value} is not a list")))
}

fn count_arg(value: &Value) -> Result<usize, PredicateError> {
    value
        .as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| PredicateError::new(format!("{value} is not a non-negative count")))
}

fn count_keys(datum: &Value, keys: &Value) -> Result<usize, PredicateError> {
    let map = mapping(datum)?;
    Ok(list(keys)?.iter().filter(|k| map.contains_key(k)).count())
}

fn type_list(value: &Value) -> Result<Vec<DataType>, PredicateError> {
    let as_type = |v: &Value| match v {
        Value::Type(t) => Ok(*t),
        other => Err(PredicateError::new(format!("{other} is not a type"))),
    };
    match value {
        Value::List(items) => items.iter().map(as_type).collect(),
        single => Ok(vec![as_type(single)?]),
    }
}

/// Signature of a user-supplied predicate
pub type PredicateFn = dyn Fn(&Value, &[Value]) -> Result<Value, PredicateError> + Send + Sync;

/// A named, user-supplied predicate
///
/// Two custom predicates are equal only if they share both name and closure.
#[derive(Clone)]
pub struct CustomPredicate {
    name: String,
    params: Vec<String>,
    func: Arc<PredicateFn>,
}

impl CustomPredicate {
    pub fn new<F>(name: impl Into<String>, params: Vec<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, PredicateError> + Send + Sync + 'static,
    {
        Self {
            name: name.into().to_ascii_lowercase(),
            params,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

impl PartialEq for CustomPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A predicate: built-in or custom
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Builtin(Builtin),
    Custom(CustomPredicate),
}

impl Predicate {
    pub fn name(&self) -> &str {
        match self {
            Predicate::Builtin(b) => b.name(),
            Predicate::Custom(c) => c.name(),
        }
    }

    pub fn param_names(&self) -> Vec<&str> {
        match self {
            Predicate::Builtin(b) => b.params().iter().map(|p| p.name).collect(),
            Predicate::Custom(c) => c.params.iter().map(String::as_str).collect(),
        }
    }

    /// Default value of a parameter, if it has one
    pub fn param_default(&self, idx: usize) -> Option<Value> {
        match self {
            Predicate::Builtin(b) => b.params().get(idx)?.default.map(Value::Float),
            Predicate::Custom(_) => None,
        }
    }

    pub fn scope(&self) -> PredicateScope {
        match self {
            Predicate::Builtin(b) => b.scope(),
            Predicate::Custom(_) => PredicateScope::General,
        }
    }

    /// Evaluate; the result is a raw value that callers must check is a boolean
    pub fn call(&self, datum: &Value, args: &[Value]) -> Result<Value, PredicateError> {
        match self {
            Predicate::Builtin(b) => b.evaluate(datum, args).map(Value::Bool),
            Predicate::Custom(c) => (c.func)(datum, args),
        }
    }
}

impl From<Builtin> for Predicate {
    fn from(b: Builtin) -> Self {
        Predicate::Builtin(b)
    }
}

impl From<CustomPredicate> for Predicate {
    fn from(c: CustomPredicate) -> Self {
        Predicate::Custom(c)
    }
}

/// Name → predicate lookup: the built-in catalog plus registered custom predicates
#[derive(Debug, Clone, Default)]
pub struct PredicateRegistry {
    custom: Vec<CustomPredicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom predicate; built-in names take precedence on lookup
    pub fn register(&mut self, predicate: CustomPredicate) {
        self.custom.retain(|c| c.name != predicate.name);
        self.custom.push(predicate);
    }

    pub fn lookup(&self, name: &str) -> Option<Predicate> {
        if let Some(builtin) = Builtin::from_name(name) {
            return Some(Predicate::Builtin(builtin));
        }
        let name = name.to_ascii_lowercase();
        self.custom
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .map(Predicate::Custom)
    }
}
