//! Spec compiler shared by the condition and path parsers
//!
//! Conditions and paths nest inside each other (path-valued predicate
//! arguments, selector conditions), so both are compiled here against one
//! predicate registry.

use crate::error::{ParseError, Result};
use crate::yaml_parser::find_similar;
use valida_core::condition::{
    is_path_key, Argument, BinaryOp, Builtin, Leaf, PreProcessor, Predicate, PredicateRegistry,
    Role,
};
use valida_core::path::{Arity, ContainerKind, ContainerValue, DatumType, PathPart};
use valida_core::{and_of, key, index, value, Condition, DataPath, DataType, GeneralPredicates, Map, Value};

pub(crate) struct Compiler<'r> {
    registry: &'r PredicateRegistry,
}

impl<'r> Compiler<'r> {
    pub(crate) fn new(registry: &'r PredicateRegistry) -> Self {
        Self { registry }
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    pub(crate) fn condition(&self, spec: &Value) -> Result<Condition> {
        let map = match spec {
            Value::Null => return Ok(Condition::Null),
            Value::Map(map) => map,
            other => {
                return Err(ParseError::malformed(format!(
                    "condition spec must be a mapping, got {other}"
                )))
            }
        };
        let (spec_key, arg) = single_entry(map, "condition spec")?;

        if let Some(op) = BinaryOp::from_name(spec_key) {
            let operands = arg.as_list().ok_or_else(|| {
                ParseError::malformed(format!("'{spec_key}' takes a list of condition specs"))
            })?;
            let mut combined = Condition::Null;
            for operand in operands {
                combined = Condition::combine(op, combined, self.condition(operand)?)?;
            }
            return Ok(combined);
        }

        let segments: Vec<&str> = spec_key.split('.').collect();
        if segments.len() < 2 {
            return Err(ParseError::malformed(format!(
                "'{spec_key}' is not of the form <role>[.<pre-processor>].<predicate>"
            )));
        }
        let role = Role::from_name(segments[0]).ok_or_else(|| ParseError::unknown(segments[0], spec_key))?;

        let middle = &segments[1..segments.len() - 1];
        if middle.len() > 1 {
            return Err(ParseError::malformed(format!(
                "'{spec_key}' chains more than one pre-processor"
            )));
        }
        let pre_processor = match middle.first() {
            Some(name) => Some(
                PreProcessor::from_name(name).ok_or_else(|| ParseError::unknown(name, spec_key))?,
            ),
            None => None,
        };

        let predicate_name = segments[segments.len() - 1];
        let predicate = self.registry.lookup(predicate_name).ok_or_else(|| {
            if let Some(similar) = find_similar(&predicate_name.to_ascii_lowercase(), &builtin_names()) {
                log::error!("Unknown predicate '{}'. Did you mean '{}'?", predicate_name, similar);
            }
            ParseError::unknown(predicate_name, spec_key)
        })?;

        let coerce_types = pre_processor == Some(PreProcessor::DataType)
            || predicate == Predicate::Builtin(Builtin::IsInstance);
        let args = self.arguments(&predicate, arg, spec_key, coerce_types)?;

        log::debug!("Compiled condition '{}' with {} argument(s)", spec_key, args.len());
        Ok(Condition::Leaf(Leaf::new(role, pre_processor, predicate, args)?))
    }

    /// Bind a spec value to the predicate's declared parameters
    fn arguments(
        &self,
        predicate: &Predicate,
        spec: &Value,
        spec_key: &str,
        coerce_types: bool,
    ) -> Result<Vec<Argument>> {
        let params = predicate.param_names();
        let mut slots: Vec<Option<Argument>> = vec![None; params.len()];

        match (params.len(), spec) {
            (0, Value::Null) => {}
            (0, Value::List(items)) if items.is_empty() => {}
            (0, Value::Map(map)) if map.is_empty() => {}
            (0, other) => {
                return Err(ParseError::malformed(format!(
                    "'{spec_key}' takes no arguments, got {other}"
                )))
            }
            (1, single) => slots[0] = Some(self.argument(single, coerce_types)?),
            (n, Value::List(items)) => {
                if items.len() > n {
                    return Err(ParseError::malformed(format!(
                        "'{spec_key}' takes at most {n} arguments, got {}",
                        items.len()
                    )));
                }
                for (slot, item) in slots.iter_mut().zip(items) {
                    *slot = Some(self.argument(item, coerce_types)?);
                }
            }
            (_, Value::Map(map)) if !is_path_spec(map) => {
                for (name, item) in map.iter() {
                    let name = name.as_str().unwrap_or_default().to_ascii_lowercase();
                    let idx = params.iter().position(|p| *p == name).ok_or_else(|| {
                        ParseError::malformed(format!(
                            "'{spec_key}' has no parameter '{name}' (expected {})",
                            params.join(", ")
                        ))
                    })?;
                    slots[idx] = Some(self.argument(item, coerce_types)?);
                }
            }
            (_, other) => {
                return Err(ParseError::malformed(format!(
                    "'{spec_key}' takes a list or mapping of arguments ({}), got {other}",
                    params.join(", ")
                )))
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| match slot {
                Some(arg) => Ok(arg),
                None => predicate.param_default(idx).map(Argument::Literal).ok_or_else(|| {
                    ParseError::malformed(format!(
                        "'{spec_key}' is missing argument '{}'",
                        params[idx]
                    ))
                }),
            })
            .collect()
    }

    /// A literal, or a path when the spec is a `{path...: [...]}` mapping
    fn argument(&self, spec: &Value, coerce_types: bool) -> Result<Argument> {
        match spec {
            Value::Map(map) if is_path_spec(map) => Ok(Argument::Path(self.path(spec)?)),
            Value::Map(map) => Ok(Argument::Literal(Value::Map(unescape(map)))),
            other => {
                if coerce_types {
                    warn_unknown_type_names(other);
                }
                Ok(Argument::Literal(other.clone()))
            }
        }
    }

    // =========================================================================
    // Paths
    // =========================================================================

    pub(crate) fn path(&self, spec: &Value) -> Result<DataPath> {
        match spec {
            Value::Null => Ok(DataPath::default()),
            Value::String(s) => Ok(s.parse::<DataPath>()?),
            Value::List(parts) => self.path_parts(parts),
            Value::Map(map) => {
                let (spec_key, parts) = single_entry(map, "path spec")?;
                let mut segments = spec_key.split('.');
                if !segments.next().is_some_and(|s| s.eq_ignore_ascii_case("path")) {
                    return Err(ParseError::malformed(format!(
                        "path spec key must start with 'path', got '{spec_key}'"
                    )));
                }

                let mut path = match parts {
                    Value::List(parts) => self.path_parts(parts)?,
                    Value::String(_) | Value::Null => self.path(parts)?,
                    other => {
                        return Err(ParseError::malformed(format!(
                            "'{spec_key}' takes a list of path parts, got {other}"
                        )))
                    }
                };
                let mut arity = None;
                for segment in segments {
                    if let Some(a) = Arity::from_name(segment) {
                        arity = Some(a);
                    } else if let Some(d) = DatumType::from_name(segment) {
                        path = path.with_datum_type(d);
                    } else {
                        return Err(ParseError::unknown(segment, spec_key));
                    }
                }
                if let Some(arity) = arity {
                    path = path.with_arity(arity)?;
                }
                Ok(path)
            }
            other => Err(ParseError::malformed(format!(
                "path spec must be a list, string or mapping, got {other}"
            ))),
        }
    }

    fn path_parts(&self, parts: &[Value]) -> Result<DataPath> {
        let mut compiled = Vec::with_capacity(parts.len());
        for part in parts {
            compiled.push(match part {
                Value::Map(map) => PathPart::Container(self.selector(map)?),
                Value::List(_) => {
                    return Err(ParseError::malformed(format!(
                        "path part must be a key, index or selector, got {part}"
                    )))
                }
                literal => PathPart::Literal(literal.clone()),
            });
        }
        Ok(DataPath::new(compiled))
    }

    /// `{"type": "map_value", "key": ..., "value": ..., "condition": ..., "label": ...}`
    fn selector(&self, map: &Map) -> Result<ContainerValue> {
        let type_name = map
            .get(&Value::from("type"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| ParseError::MissingField {
                field: "type".to_string(),
            })?;
        let kind = ContainerKind::from_name(type_name)
            .ok_or_else(|| ParseError::unknown(type_name, "type"))?;

        let mut builder = match kind {
            ContainerKind::Map => ContainerValue::map_value(),
            ContainerKind::List => ContainerValue::list_value(),
            ContainerKind::MapOrList => ContainerValue::map_or_list_value(),
        };
        let (mut on_key, mut on_index, mut on_value) = (Vec::new(), Vec::new(), Vec::new());

        for (field, spec) in map.iter() {
            let field = field
                .as_str()
                .ok_or_else(|| ParseError::malformed(format!("selector field {field} is not a string")))?;
            match field.to_ascii_lowercase().as_str() {
                "type" => {}
                "label" => {
                    let label = spec.as_str().ok_or_else(|| {
                        ParseError::malformed(format!("selector label must be a string, got {spec}"))
                    })?;
                    builder = builder.label(label);
                }
                "condition" => builder = builder.condition(self.condition(spec)?),
                "map_condition" => builder = builder.map_condition(self.condition(spec)?),
                "list_condition" => builder = builder.list_condition(self.condition(spec)?),
                "key" => on_key.extend(self.slot(spec, |v| key().equal_to(v))?),
                "index" => on_index.extend(self.slot(spec, |v| index().equal_to(v))?),
                "value" => on_value.extend(self.slot(spec, |v| value().equal_to(v))?),
                shorthand => {
                    let role = shorthand
                        .split('.')
                        .next()
                        .filter(|_| shorthand.contains('.'))
                        .and_then(Role::from_name)
                        .ok_or_else(|| ParseError::unknown(field, kind.name()))?;
                    let condition = self.condition(&Value::Map(Map::new().with(field, spec.clone())))?;
                    match role {
                        Role::Key => on_key.push(condition),
                        Role::Index => on_index.push(condition),
                        Role::Value => on_value.push(condition),
                    }
                }
            }
        }

        if !on_key.is_empty() {
            builder = builder.key(and_of(on_key)?);
        }
        if !on_index.is_empty() {
            builder = builder.index(and_of(on_index)?);
        }
        if !on_value.is_empty() {
            builder = builder.value(and_of(on_value)?);
        }
        Ok(builder.build()?)
    }

    /// A selector slot: absent when null, else a condition spec mapping or a
    /// literal to compare with
    fn slot(
        &self,
        spec: &Value,
        literal: impl Fn(Value) -> Condition,
    ) -> Result<Option<Condition>> {
        match spec {
            Value::Null => Ok(None),
            Value::Map(_) => self.condition(spec).map(Some),
            other => Ok(Some(literal(other.clone()))),
        }
    }
}

fn single_entry<'m>(map: &'m Map, what: &str) -> Result<(&'m str, &'m Value)> {
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some((Value::String(k), v)), None) => Ok((k.as_str(), v)),
        (Some((k, _)), None) => Err(ParseError::malformed(format!(
            "{what} key must be a string, got {k}"
        ))),
        _ => Err(ParseError::malformed(format!(
            "{what} must have exactly one key, found {}",
            map.len()
        ))),
    }
}

fn is_path_spec(map: &Map) -> bool {
    map.keys()
        .any(|k| k.as_str().is_some_and(is_path_key))
}

/// Strip one escape character from path-like keys of a literal mapping
fn unescape(map: &Map) -> Map {
    map.iter()
        .map(|(k, v)| match k {
            Value::String(s)
                if s.starts_with('\\') && is_path_key(s.trim_start_matches('\\')) =>
            {
                (Value::String(s[1..].to_string()), v.clone())
            }
            _ => (k.clone(), v.clone()),
        })
        .collect()
}

/// Type names become type tags when the leaf is built; other strings stay
/// strings and never equal a type tag
fn warn_unknown_type_names(spec: &Value) {
    match spec {
        Value::String(name) if DataType::from_name(name).is_none() => {
            log::warn!("'{}' is not a type name and will never match a type", name);
        }
        Value::List(items) => items.iter().for_each(warn_unknown_type_names),
        _ => {}
    }
}

fn builtin_names() -> Vec<&'static str> {
    Builtin::ALL
        .iter()
        .flat_map(|b| std::iter::once(b.name()).chain(b.aliases().iter().copied()))
        .collect()
}
