//! Algebraic laws of the condition combinators
//!
//! Commutative equality and null absorption over randomly built trees.

use proptest::prelude::*;
use valida_core::prelude::*;
use valida_core::CoreError;

fn arb_leaf() -> impl Strategy<Value = Condition> {
    let arg = -5i64..5;
    prop_oneof![
        arg.clone().prop_map(|n| value().equal_to(n)),
        arg.clone().prop_map(|n| value().greater_than(n)),
        arg.clone().prop_map(|n| value().length().less_than(n)),
        arg.clone().prop_map(|n| key().not_equal_to(n)),
        (arg.clone(), arg).prop_map(|(a, b)| key().in_range(a, b)),
        Just(value().truthy()),
        Just(key().dtype().equal_to(DataType::Str)),
    ]
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    arb_leaf().prop_recursive(3, 12, 2, |inner| {
        (inner.clone(), inner, 0u8..3).prop_map(|(a, b, op)| {
            let combined = match op {
                0 => a.clone().and(b),
                1 => a.clone().or(b),
                _ => a.clone().xor(b),
            };
            combined.unwrap_or(a)
        })
    })
}

proptest! {
    #[test]
    fn and_is_commutative(a in arb_condition(), b in arb_condition()) {
        prop_assert_eq!(a.clone().and(b.clone()).unwrap(), b.and(a).unwrap());
    }

    #[test]
    fn or_is_commutative(a in arb_condition(), b in arb_condition()) {
        prop_assert_eq!(a.clone().or(b.clone()).unwrap(), b.or(a).unwrap());
    }

    #[test]
    fn xor_is_commutative(a in arb_condition(), b in arb_condition()) {
        prop_assert_eq!(a.clone().xor(b.clone()).unwrap(), b.xor(a).unwrap());
    }

    #[test]
    fn null_is_absorbed(c in arb_condition()) {
        prop_assert_eq!(c.clone().and(Condition::Null).unwrap(), c.clone());
        prop_assert_eq!(Condition::Null.and(c.clone()).unwrap(), c.clone());
        prop_assert_eq!(c.clone().or(Condition::Null).unwrap(), c.clone());
        prop_assert_eq!(Condition::Null.or(c.clone()).unwrap(), c.clone());
        prop_assert_eq!(c.clone().xor(Condition::Null).unwrap(), c.clone());
        prop_assert_eq!(Condition::Null.xor(c.clone()).unwrap(), c);
    }

    #[test]
    fn value_trees_recast_to_keys(n in -5i64..5, m in -5i64..5) {
        let tree = value().equal_to(n).or(value().length().greater_than(m)).unwrap();
        let recast = tree.to_key_like().unwrap();
        prop_assert!(recast.is_key_like());
        prop_assert_eq!(recast, key().equal_to(n).or(key().length().greater_than(m)).unwrap());
    }

    #[test]
    fn filtering_never_panics_on_flat_data(
        c in arb_condition(),
        items in prop::collection::vec(-10i64..10, 0..6),
    ) {
        let data = Value::Map(items.iter().enumerate().map(|(i, v)| (format!("k{i}"), *v)).collect());
        let filtered = c.filter(&data).unwrap();
        prop_assert_eq!(filtered.len(), items.len());
        prop_assert_eq!(filtered.failures().iter().filter(|f| f.is_none()).count(), filtered.kept().len());
    }
}

#[test]
fn key_and_index_never_mix() {
    let err = value().equal_to(1).or(key().equal_to(1)).unwrap().and(index().equal_to(0));
    assert!(matches!(err, Err(CoreError::IncompatibleRole(_))));
}
