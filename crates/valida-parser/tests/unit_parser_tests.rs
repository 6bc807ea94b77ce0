//! Unit tests for the spec compiler
//!
//! Covers condition and path specs, escaping, argument binding and the
//! `to_spec` round-trip for conditions and paths built in code.

use valida_core::prelude::*;
use valida_core::{Argument, ContainerKind, CoreError};
use valida_parser::*;

fn condition(yaml: &str) -> Result<Condition> {
    ConditionParser::new().parse(yaml)
}

fn round_trip_condition(c: &Condition) -> Condition {
    ConditionParser::new().parse_value(&c.to_spec()).unwrap()
}

fn round_trip_path(p: &DataPath) -> DataPath {
    PathParser::new().parse_value(&p.to_spec()).unwrap()
}

// =============================================================================
// Condition specs
// =============================================================================

#[test]
fn test_binary_operators_take_lists() {
    let parsed = condition(
        r#"
or:
  - value.eq: 1
  - value.gt: 5
"#,
    )
    .unwrap();
    assert_eq!(parsed, value().equal_to(1).or(value().greater_than(5)).unwrap());

    assert!(matches!(
        condition("and: {value.eq: 1}"),
        Err(ParseError::MalformedSpec(_))
    ));
    assert_eq!(condition("xor: []").unwrap(), Condition::Null);
}

#[test]
fn test_exactly_one_key() {
    let err = condition("{value.eq: 1, value.gt: 0}").unwrap_err();
    assert!(matches!(err, ParseError::MalformedSpec(_)));
}

#[test]
fn test_unknown_segments() {
    for spec in ["valeu.eq: 1", "value.eqq: 1", "value.size.eq: 1"] {
        assert!(
            matches!(condition(spec), Err(ParseError::UnknownSegment { .. })),
            "expected UnknownSegment for {spec}"
        );
    }
    assert!(matches!(condition("value: 1"), Err(ParseError::MalformedSpec(_))));
}

#[test]
fn test_role_errors_surface_at_compile_time() {
    let err = condition(
        r#"
and:
  - key.eq: a
  - index.eq: 0
"#,
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::Core(CoreError::IncompatibleRole(_))));
    assert!(condition("index.len.eq: 1").is_err());
    assert!(condition("value.len.keys_contain: a").is_err());
}

#[test]
fn test_positional_and_keyword_arguments_agree() {
    let positional = condition("value.in_range: [1, 5]").unwrap();
    let keyword = condition("value.in_range: {lower: 1, upper: 5}").unwrap();
    assert_eq!(positional, keyword);
    assert_eq!(positional, value().in_range(1, 5));

    let with_default = condition("value.equal_to_approx: [1.0]").unwrap();
    assert_eq!(with_default, value().equal_to_approx(1.0, 1e-8));
    let keyword_default = condition("value.equal_to_approx: {value: 1.0}").unwrap();
    assert_eq!(keyword_default, with_default);

    assert!(condition("value.in_range: [1]").is_err());
    assert!(condition("value.in_range: [1, 2, 3]").is_err());
    assert!(condition("value.in_range: {lower: 1, top: 2}").is_err());
    assert!(condition("value.truthy: 3").is_err());
}

#[test]
fn test_escaped_path_key_is_literal() {
    let parsed = condition(r#"{value.equal_to: {'\path': [A, B]}}"#).unwrap();
    let expected = value().equal_to(Map::new().with("path", vec!["A", "B"]));
    assert_eq!(parsed, expected);

    let double = condition(r#"{value.equal_to: {'\\path': 1}}"#).unwrap();
    assert_eq!(double, value().equal_to(Map::new().with("\\path", 1)));
}

#[test]
fn test_path_argument() {
    let parsed = condition("value.less_than: {path: [limits, max]}").unwrap();
    let expected = value().less_than(DataPath::new(vec!["limits".into(), "max".into()]));
    assert_eq!(parsed, expected);
    match parsed.leaves()[0].args() {
        [Argument::Path(path)] => assert!(path.is_concrete()),
        other => panic!("Expected a path argument, got {other:?}"),
    }
}

#[test]
fn test_type_names_under_dtype() {
    assert_eq!(
        condition("key.dtype.equal_to: STR").unwrap(),
        key().dtype().equal_to(DataType::Str)
    );
    assert_eq!(
        condition("value.is_instance: [int, float]").unwrap(),
        value().is_instance(vec![DataType::Int, DataType::Float])
    );
    assert_eq!(
        condition("value.dtype.equal_to: thing").unwrap(),
        value().dtype().equal_to("thing")
    );
}

#[test]
fn test_key_set_predicates() {
    assert_eq!(
        condition("value.keys_contain_n_of: {n: 2, keys: [a, b, c]}").unwrap(),
        value().keys_contain_n_of(2, vec!["a", "b", "c"])
    );
    assert_eq!(
        condition("value.keys_contain_at_least_n_of: [1, [a]]").unwrap(),
        value().keys_contain_at_least_n_of(1, vec!["a"])
    );
}

// =============================================================================
// Path specs
// =============================================================================

#[test]
fn test_selector_specs() {
    let parsed = PathParser::new()
        .parse(
            r#"
- type: map_value
  key: A1
- type: list_value
  index: {index.lt: 2}
  value: {value.truthy: null}
"#,
        )
        .unwrap();
    let expected = DataPath::new(vec![
        ContainerValue::map_value().key("A1").build().unwrap().into(),
        ContainerValue::list_value()
            .index(index().less_than(2))
            .value(value().truthy())
            .build()
            .unwrap()
            .into(),
    ]);
    assert_eq!(parsed, expected);
}

#[test]
fn test_selector_shorthand_keys() {
    let shorthand = PathParser::new()
        .parse("[{type: map_value, key.dtype.equal_to: str}]")
        .unwrap();
    let longhand = PathParser::new()
        .parse("[{type: map_value, key: {key.dtype.equal_to: str}}]")
        .unwrap();
    assert_eq!(shorthand, longhand);
    assert!(PathParser::new()
        .parse("[{type: map_value, colour: red}]")
        .is_err());
    assert!(PathParser::new()
        .parse("[{type: map_value, key: {value.eq: 1}}]")
        .is_err());
}

#[test]
fn test_null_selector_slots_are_absent() {
    let bare = PathParser::new().parse("[{type: map_value}]").unwrap();
    for spec in [
        "[{type: map_value, value: null}]",
        "[{type: map_value, key: null, value: null}]",
        "[{type: map_value, index: null}]",
    ] {
        let parsed = PathParser::new().parse(spec).unwrap();
        assert_eq!(parsed, bare, "{spec}");
    }

    let data = Value::Map(Map::new().with("a", 1));
    assert_eq!(
        PathParser::new()
            .parse("[{type: map_value, value: null}]")
            .unwrap()
            .get_data(&data)
            .unwrap()
            .into_vec(),
        vec![Value::Int(1)]
    );
}

#[test]
fn test_selector_requires_type() {
    assert!(matches!(
        PathParser::new().parse("[{key: a}]"),
        Err(ParseError::MissingField { .. })
    ));
    assert!(PathParser::new().parse("[{type: set_value}]").is_err());
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_condition_round_trips() {
    let conditions = vec![
        Condition::Null,
        value().equal_to(1),
        value().length().in_range(1, 3),
        key().dtype().in_(vec![DataType::Str, DataType::Int]),
        index().not_in(vec![0, 2]),
        value().equal_to_approx(0.5, 0.1),
        value().dtype().equal_to("str"),
        value().equal_to("str"),
        key().dtype().not_in(vec!["map", "thing"]),
        value().keys_equal_to(vec!["a", "b"]),
        value().items_contain(Map::new().with("path", 1).with("x", 2)),
        value().greater_than(DataPath::new(vec!["limits".into()])),
        value()
            .truthy()
            .and(value().length().gt(2))
            .unwrap()
            .xor(key().equal_to("k"))
            .unwrap(),
    ];
    for c in conditions {
        assert_eq!(round_trip_condition(&c), c, "round trip failed for {c}");
    }
}

#[test]
fn test_path_round_trips() {
    let selector = ContainerValue::map_value()
        .key(key().in_(vec!["c", "d"]))
        .value(value().dtype().equal_to(DataType::Dict))
        .label("section")
        .build()
        .unwrap();
    let paths = vec![
        DataPath::default(),
        DataPath::new(vec!["a".into(), 0.into()]),
        DataPath::new(vec![selector.into(), "x".into()]).first().unwrap(),
        DataPath::new(vec![ContainerValue::new(ContainerKind::List).into()])
            .length()
            .all()
            .unwrap(),
        "a/1/b".parse::<DataPath>().unwrap(),
    ];
    for p in paths {
        assert_eq!(round_trip_path(&p), p, "round trip failed for {p}");
    }
}

#[test]
fn test_round_trip_through_yaml_text() -> anyhow::Result<()> {
    let c = key().dtype().equal_to(DataType::Str).or(key().equal_to(3))?;
    let text = serde_yaml::to_string(&c.to_spec())?;
    assert_eq!(ConditionParser::new().parse(&text)?, c);
    Ok(())
}
