//! Condition expression tree
//!
//! A condition is either the neutral `Null` condition, a leaf (predicate plus
//! bound arguments and an optional pre-processor, tagged with a role), or a
//! binary AND/OR/XOR node. Trees are immutable; combining always builds a new
//! node, except that `Null` operands are absorbed and the other operand is
//! returned unchanged.

mod argument;
mod factory;
mod filter;
pub mod predicate;
mod role;

pub use argument::{is_path_key, Argument};
pub use factory::{index, key, value, GeneralFactory, GeneralPredicates, MapPredicates, RoleFactory};
pub use filter::{EvalOptions, FailureReason, FilteredData};
pub use predicate::{Builtin, CustomPredicate, Predicate, PredicateError, PredicateRegistry, PredicateScope};
pub use role::{PreProcessor, Role};

use crate::error::{CoreError, Result};
use crate::types::{Map, Value};
use role::check_role_mix;
use std::fmt;

/// Boolean combinator of a binary node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
}

impl BinaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "and" => Some(BinaryOp::And),
            "or" => Some(BinaryOp::Or),
            "xor" => Some(BinaryOp::Xor),
            _ => None,
        }
    }

    pub fn apply(&self, a: bool, b: bool) -> bool {
        match self {
            BinaryOp::And => a && b,
            BinaryOp::Or => a || b,
            BinaryOp::Xor => a ^ b,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
        }
    }
}

/// A predicate bound to its arguments under a role
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    role: Role,
    pre_processor: Option<PreProcessor>,
    predicate: Predicate,
    args: Vec<Argument>,
}

impl Leaf {
    /// Build a leaf, rejecting role / pre-processor / predicate combinations
    /// that make no sense
    pub fn new(
        role: Role,
        pre_processor: Option<PreProcessor>,
        predicate: Predicate,
        args: Vec<Argument>,
    ) -> Result<Self> {
        role.check(pre_processor, predicate.scope(), predicate.name())?;
        let expected = predicate.param_names().len();
        if args.len() != expected {
            return Err(CoreError::InvalidArguments(format!(
                "'{}' takes {expected} argument(s), got {}",
                predicate.name(),
                args.len()
            )));
        }
        Ok(Self::new_unchecked(role, pre_processor, predicate, args))
    }

    pub(crate) fn new_unchecked(
        role: Role,
        pre_processor: Option<PreProcessor>,
        predicate: Predicate,
        args: Vec<Argument>,
    ) -> Self {
        // Under dtype and is_instance, type names and type tags are one argument
        let args = if pre_processor == Some(PreProcessor::DataType)
            || predicate == Predicate::Builtin(Builtin::IsInstance)
        {
            args.into_iter().map(Argument::with_type_names).collect()
        } else {
            args
        };
        Self {
            role,
            pre_processor,
            predicate,
            args,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn pre_processor(&self) -> Option<PreProcessor> {
        self.pre_processor
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Arguments in declared parameter order
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Label without the role, e.g. `length.equal_to(value=2)`
    pub fn label(&self) -> String {
        let params = self.predicate.param_names();
        let args = self
            .args
            .iter()
            .enumerate()
            .map(|(idx, arg)| match params.get(idx) {
                Some(name) => format!("{name}={arg}"),
                None => arg.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        match self.pre_processor {
            Some(pre) => format!("{}.{}({args})", pre.name(), self.predicate.name()),
            None => format!("{}({args})", self.predicate.name()),
        }
    }

    /// Dotted spec key, e.g. `value.length.equal_to`
    pub fn spec_key(&self) -> String {
        match self.pre_processor {
            Some(pre) => format!("{}.{}.{}", self.role, pre.name(), self.predicate.name()),
            None => format!("{}.{}", self.role, self.predicate.name()),
        }
    }

    fn to_spec(&self) -> Value {
        let params = self.predicate.param_names();
        let arg_spec = match (params.len(), self.args.as_slice()) {
            (0, _) | (_, []) => Value::Null,
            (1, [arg]) => arg.to_spec(),
            _ => Value::Map(
                params
                    .iter()
                    .zip(&self.args)
                    .map(|(name, arg)| (Value::from(*name), arg.to_spec()))
                    .collect(),
            ),
        };
        Value::Map(Map::new().with(self.spec_key(), arg_spec))
    }

    fn with_role(&self, role: Role) -> Result<Self> {
        Leaf::new(role, self.pre_processor, self.predicate.clone(), self.args.clone())
    }
}

/// Binary combination of two conditions
#[derive(Debug, Clone)]
pub struct Binary {
    op: BinaryOp,
    left: Box<Condition>,
    right: Box<Condition>,
}

impl Binary {
    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn left(&self) -> &Condition {
        &self.left
    }

    pub fn right(&self) -> &Condition {
        &self.right
    }
}

impl PartialEq for Binary {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op
            && ((self.left == other.left && self.right == other.right)
                || (self.left == other.right && self.right == other.left))
    }
}

/// A condition expression tree
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// Neutral element: matches everything, absorbed by every combinator
    #[default]
    Null,
    Leaf(Leaf),
    Binary(Binary),
}

impl Condition {
    /// Combine two conditions; `Null` operands are absorbed and key/index
    /// mixes are rejected
    pub fn combine(op: BinaryOp, left: Condition, right: Condition) -> Result<Condition> {
        if left.is_null() {
            return Ok(right);
        }
        if right.is_null() {
            return Ok(left);
        }
        check_role_mix(left.leaves().into_iter().chain(right.leaves()).map(Leaf::role))?;
        Ok(Condition::Binary(Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    pub fn and(self, other: Condition) -> Result<Condition> {
        Condition::combine(BinaryOp::And, self, other)
    }

    pub fn or(self, other: Condition) -> Result<Condition> {
        Condition::combine(BinaryOp::Or, self, other)
    }

    pub fn xor(self, other: Condition) -> Result<Condition> {
        Condition::combine(BinaryOp::Xor, self, other)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Condition::Null)
    }

    /// All leaves, left to right
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        match self {
            Condition::Null => {}
            Condition::Leaf(leaf) => out.push(leaf),
            Condition::Binary(b) => {
                b.left.collect_leaves(out);
                b.right.collect_leaves(out);
            }
        }
    }

    fn all_leaves(&self, role: Role) -> bool {
        self.leaves().iter().all(|leaf| leaf.role == role)
    }

    fn any_leaf(&self, role: Role) -> bool {
        self.leaves().iter().any(|leaf| leaf.role == role)
    }

    pub fn is_key_like(&self) -> bool {
        self.all_leaves(Role::Key)
    }

    pub fn is_index_like(&self) -> bool {
        self.all_leaves(Role::Index)
    }

    pub fn is_value_like(&self) -> bool {
        self.all_leaves(Role::Value)
    }

    pub(crate) fn has_key_leaves(&self) -> bool {
        self.any_leaf(Role::Key)
    }

    pub(crate) fn has_index_leaves(&self) -> bool {
        self.any_leaf(Role::Index)
    }

    /// Recast a value-like tree as a key condition
    pub fn to_key_like(&self) -> Result<Condition> {
        self.recast(Role::Key)
    }

    /// Recast a value-like tree as an index condition; fails if any leaf uses
    /// a pre-processor or a mapping predicate
    pub fn to_index_like(&self) -> Result<Condition> {
        self.recast(Role::Index)
    }

    fn recast(&self, role: Role) -> Result<Condition> {
        if self.all_leaves(role) {
            return Ok(self.clone());
        }
        if !self.is_value_like() {
            return Err(CoreError::IncompatibleRole(format!(
                "only value conditions can be converted to {role} conditions: {self}"
            )));
        }
        self.rebuild(role)
    }

    fn rebuild(&self, role: Role) -> Result<Condition> {
        Ok(match self {
            Condition::Null => Condition::Null,
            Condition::Leaf(leaf) => Condition::Leaf(leaf.with_role(role)?),
            Condition::Binary(b) => Condition::Binary(Binary {
                op: b.op,
                left: Box::new(b.left.rebuild(role)?),
                right: Box::new(b.right.rebuild(role)?),
            }),
        })
    }

    /// Canonical spec form, readable by the spec compiler
    pub fn to_spec(&self) -> Value {
        match self {
            Condition::Null => Value::Null,
            Condition::Leaf(leaf) => leaf.to_spec(),
            Condition::Binary(b) => Value::Map(Map::new().with(
                b.op.name(),
                Value::List(vec![b.left.to_spec(), b.right.to_spec()]),
            )),
        }
    }
}

impl From<Leaf> for Condition {
    fn from(leaf: Leaf) -> Self {
        Condition::Leaf(leaf)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Null => f.write_str("null"),
            Condition::Leaf(leaf) => write!(f, "{}.{}", leaf.role, leaf.label()),
            Condition::Binary(b) => write!(f, "({} {} {})", b.left, b.op.symbol(), b.right),
        }
    }
}

/// AND of any number of conditions; empty input gives `Null`
pub fn and_of(conditions: impl IntoIterator<Item = Condition>) -> Result<Condition> {
    fold(BinaryOp::And, conditions)
}

/// OR of any number of conditions; empty input gives `Null`
pub fn or_of(conditions: impl IntoIterator<Item = Condition>) -> Result<Condition> {
    fold(BinaryOp::Or, conditions)
}

/// XOR of any number of conditions; empty input gives `Null`
pub fn xor_of(conditions: impl IntoIterator<Item = Condition>) -> Result<Condition> {
    fold(BinaryOp::Xor, conditions)
}

fn fold(op: BinaryOp, conditions: impl IntoIterator<Item = Condition>) -> Result<Condition> {
    conditions
        .into_iter()
        .try_fold(Condition::Null, |acc, c| Condition::combine(op, acc, c))
}
