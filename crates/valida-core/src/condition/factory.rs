//! Condition factories
//!
//! `value()`, `key()` and `index()` start a condition for the given role;
//! `.length()` / `.dtype()` add a pre-processor. Only legal combinations are
//! reachable: mapping predicates exist on plain value and key factories,
//! and the index factory has no pre-processors.

use super::argument::Argument;
use super::predicate::{Builtin, CustomPredicate, Predicate};
use super::role::{PreProcessor, Role};
use super::{Condition, Leaf};
use crate::error::Result;

/// Factory for plain value or key conditions
#[derive(Debug, Clone, Copy)]
pub struct RoleFactory {
    role: Role,
}

impl RoleFactory {
    /// Test the length of the datum
    pub fn length(self) -> GeneralFactory {
        GeneralFactory {
            role: self.role,
            pre_processor: Some(PreProcessor::Length),
        }
    }

    /// Test the runtime type of the datum
    pub fn dtype(self) -> GeneralFactory {
        GeneralFactory {
            role: self.role,
            pre_processor: Some(PreProcessor::DataType),
        }
    }
}

/// Factory restricted to general predicates (pre-processed or index conditions)
#[derive(Debug, Clone, Copy)]
pub struct GeneralFactory {
    role: Role,
    pre_processor: Option<PreProcessor>,
}

/// Conditions on values
pub fn value() -> RoleFactory {
    RoleFactory { role: Role::Value }
}

/// Conditions on map keys
pub fn key() -> RoleFactory {
    RoleFactory { role: Role::Key }
}

/// Conditions on list indices
pub fn index() -> GeneralFactory {
    GeneralFactory {
        role: Role::Index,
        pre_processor: None,
    }
}

/// Predicates available to every factory
pub trait GeneralPredicates: Sized {
    fn role(&self) -> Role;

    fn pre_processor(&self) -> Option<PreProcessor>;

    fn build(&self, predicate: impl Into<Predicate>, args: Vec<Argument>) -> Condition {
        Condition::Leaf(Leaf::new_unchecked(
            self.role(),
            self.pre_processor(),
            predicate.into(),
            args,
        ))
    }

    fn equal_to(&self, value: impl Into<Argument>) -> Condition {
        self.build(Builtin::EqualTo, vec![value.into()])
    }

    fn eq(&self, value: impl Into<Argument>) -> Condition {
        self.equal_to(value)
    }

    fn not_equal_to(&self, value: impl Into<Argument>) -> Condition {
        self.build(Builtin::NotEqualTo, vec![value.into()])
    }

    fn less_than(&self, value: impl Into<Argument>) -> Condition {
        self.build(Builtin::LessThan, vec![value.into()])
    }

    fn lt(&self, value: impl Into<Argument>) -> Condition {
        self.less_than(value)
    }

    fn greater_than(&self, value: impl Into<Argument>) -> Condition {
        self.build(Builtin::GreaterThan, vec![value.into()])
    }

    fn gt(&self, value: impl Into<Argument>) -> Condition {
        self.greater_than(value)
    }

    fn less_than_or_equal_to(&self, value: impl Into<Argument>) -> Condition {
        self.build(Builtin::LessThanOrEqualTo, vec![value.into()])
    }

    fn lte(&self, value: impl Into<Argument>) -> Condition {
        self.less_than_or_equal_to(value)
    }

    fn greater_than_or_equal_to(&self, value: impl Into<Argument>) -> Condition {
        self.build(Builtin::GreaterThanOrEqualTo, vec![value.into()])
    }

    fn gte(&self, value: impl Into<Argument>) -> Condition {
        self.greater_than_or_equal_to(value)
    }

    fn in_(&self, values: impl Into<Argument>) -> Condition {
        self.build(Builtin::In, vec![values.into()])
    }

    fn not_in(&self, values: impl Into<Argument>) -> Condition {
        self.build(Builtin::NotIn, vec![values.into()])
    }

    /// Inclusive range check
    fn in_range(&self, lower: impl Into<Argument>, upper: impl Into<Argument>) -> Condition {
        self.build(Builtin::InRange, vec![lower.into(), upper.into()])
    }

    fn not_in_range(&self, lower: impl Into<Argument>, upper: impl Into<Argument>) -> Condition {
        self.build(Builtin::NotInRange, vec![lower.into(), upper.into()])
    }

    fn equal_to_approx(
        &self,
        value: impl Into<Argument>,
        tolerance: impl Into<Argument>,
    ) -> Condition {
        self.build(Builtin::EqualToApprox, vec![value.into(), tolerance.into()])
    }

    fn truthy(&self) -> Condition {
        self.build(Builtin::Truthy, vec![])
    }

    fn falsy(&self) -> Condition {
        self.build(Builtin::Falsy, vec![])
    }

    /// Always true
    fn null(&self) -> Condition {
        self.build(Builtin::Null, vec![])
    }

    /// Type tag is one of `classes` (a `DataType` or a list of them)
    fn is_instance(&self, classes: impl Into<Argument>) -> Condition {
        self.build(Builtin::IsInstance, vec![classes.into()])
    }

    /// A registered predicate; `args` must match its declared parameters
    fn custom(&self, predicate: CustomPredicate, args: Vec<Argument>) -> Result<Condition> {
        Leaf::new(self.role(), self.pre_processor(), predicate.into(), args).map(Condition::Leaf)
    }
}

/// Predicates over mapping data
pub trait MapPredicates: GeneralPredicates {
    fn keys_contain(&self, key: impl Into<Argument>) -> Condition {
        self.build(Builtin::KeysContain, vec![key.into()])
    }

    fn keys_contain_any_of(&self, keys: impl Into<Argument>) -> Condition {
        self.build(Builtin::KeysContainAnyOf, vec![keys.into()])
    }

    fn keys_contain_all_of(&self, keys: impl Into<Argument>) -> Condition {
        self.build(Builtin::KeysContainAllOf, vec![keys.into()])
    }

    fn keys_contain_one_of(&self, keys: impl Into<Argument>) -> Condition {
        self.build(Builtin::KeysContainOneOf, vec![keys.into()])
    }

    fn keys_contain_at_least_one_of(&self, keys: impl Into<Argument>) -> Condition {
        self.build(Builtin::KeysContainAtLeastOneOf, vec![keys.into()])
    }

    fn keys_contain_at_most_one_of(&self, keys: impl Into<Argument>) -> Condition {
        self.build(Builtin::KeysContainAtMostOneOf, vec![keys.into()])
    }

    fn keys_contain_n_of(&self, n: impl Into<Argument>, keys: impl Into<Argument>) -> Condition {
        self.build(Builtin::KeysContainNOf, vec![n.into(), keys.into()])
    }

    fn keys_contain_at_least_n_of(
        &self,
        n: impl Into<Argument>,
        keys: impl Into<Argument>,
    ) -> Condition {
        self.build(Builtin::KeysContainAtLeastNOf, vec![n.into(), keys.into()])
    }

    fn keys_contain_at_most_n_of(
        &self,
        n: impl Into<Argument>,
        keys: impl Into<Argument>,
    ) -> Condition {
        self.build(Builtin::KeysContainAtMostNOf, vec![n.into(), keys.into()])
    }

    /// Exact key set match, order-insensitive
    fn keys_equal_to(&self, keys: impl Into<Argument>) -> Condition {
        self.build(Builtin::KeysEqualTo, vec![keys.into()])
    }

    /// Every given item is present with a matching value
    fn items_contain(&self, items: impl Into<Argument>) -> Condition {
        self.build(Builtin::ItemsContain, vec![items.into()])
    }
}

impl GeneralPredicates for RoleFactory {
    fn role(&self) -> Role {
        self.role
    }

    fn pre_processor(&self) -> Option<PreProcessor> {
        None
    }
}

impl MapPredicates for RoleFactory {}

impl GeneralPredicates for GeneralFactory {
    fn role(&self) -> Role {
        self.role
    }

    fn pre_processor(&self) -> Option<PreProcessor> {
        self.pre_processor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{DataType, Value};

    #[test]
    fn test_aliases_build_same_leaf() {
        assert_eq!(value().eq(1), value().equal_to(1));
        assert_eq!(key().gte("a"), key().greater_than_or_equal_to("a"));
        assert_eq!(index().lt(3), index().less_than(3));
    }

    #[test]
    fn test_factory_roles() {
        assert!(value().length().equal_to(1).is_value_like());
        assert!(key().dtype().equal_to(DataType::Str).is_key_like());
        assert!(index().in_range(0, 2).is_index_like());
    }

    #[test]
    fn test_custom_predicate_leaf() {
        let even = CustomPredicate::new("is_even", vec![], |datum: &Value, _: &[Value]| {
            Ok(Value::Bool(datum.as_i64().map_or(false, |i| i % 2 == 0)))
        });
        let c = value().custom(even.clone(), vec![]).unwrap();
        assert_eq!(c, value().custom(even, vec![]).unwrap());
        assert_eq!(c.to_string(), "value.is_even()");
    }

    #[test]
    fn test_custom_predicate_argument_count() {
        let between = CustomPredicate::new(
            "between",
            vec!["low".to_string(), "high".to_string()],
            |_: &Value, _: &[Value]| Ok(Value::Bool(true)),
        );
        assert!(value().custom(between.clone(), vec![1.into(), 2.into()]).is_ok());
        let err = value().custom(between, vec![1.into()]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArguments(_)));

        let even = CustomPredicate::new("is_even", vec![], |_: &Value, _: &[Value]| {
            Ok(Value::Bool(true))
        });
        assert!(value().custom(even, vec![3.into()]).is_err());
    }

    #[test]
    fn test_type_names_become_type_tags() {
        assert_eq!(
            value().dtype().equal_to("str"),
            value().dtype().equal_to(DataType::Str)
        );
        assert_eq!(
            value().is_instance(vec!["int", "MAP"]),
            value().is_instance(vec![DataType::Int, DataType::Dict])
        );
        assert_ne!(value().equal_to("str"), value().equal_to(DataType::Str));
        let unknown = value().dtype().equal_to("thing");
        assert_eq!(
            unknown.leaves()[0].args(),
            &[Argument::Literal(Value::from("thing"))]
        );
    }
}
