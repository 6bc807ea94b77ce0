//! Filtering and testing
//!
//! Evaluates a condition tree against every entry of a container. Binary
//! nodes evaluate both children in full so that the truth table records
//! every branch; per-entry failures are recorded, not raised, unless the
//! evaluation is strict.

use super::{BinaryOp, Condition, Leaf, Role};
use crate::data::{Data, Entry};
use crate::error::{CoreError, Result};
use crate::types::{Map, Value};
use std::fmt;

/// Evaluation settings
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalOptions<'s> {
    /// Document that path-valued arguments are resolved against
    pub source: Option<&'s Value>,
    /// Propagate per-entry pre-processing, predicate and argument errors
    pub strict: bool,
}

impl<'s> EvalOptions<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: &'s Value) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Why an entry was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    PreProcessingError,
    PredicateFalse,
    PredicateError,
    BinaryOpFalse,
    BinaryOpError,
}

impl FailureReason {
    pub fn name(&self) -> &'static str {
        match self {
            FailureReason::PreProcessingError => "pre-processing error",
            FailureReason::PredicateFalse => "predicate false",
            FailureReason::PredicateError => "predicate error",
            FailureReason::BinaryOpFalse => "binary op false",
            FailureReason::BinaryOpError => "binary op error",
        }
    }

    fn is_error(&self) -> bool {
        matches!(
            self,
            FailureReason::PreProcessingError
                | FailureReason::PredicateError
                | FailureReason::BinaryOpError
        )
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of filtering a container with a condition
#[derive(Debug, Clone)]
pub struct FilteredData<'a> {
    data: Data<'a>,
    result: Vec<bool>,
    failures: Vec<Option<FailureReason>>,
    processed: Vec<Option<Value>>,
    truth_table: Vec<(String, Vec<bool>)>,
}

impl<'a> FilteredData<'a> {
    pub fn data(&self) -> &Data<'a> {
        &self.data
    }

    /// Keep/drop flag per entry
    pub fn result(&self) -> &[bool] {
        &self.result
    }

    pub fn failures(&self) -> &[Option<FailureReason>] {
        &self.failures
    }

    /// Pre-processed datum per entry (leaf conditions only)
    pub fn processed(&self) -> &[Option<Value>] {
        &self.processed
    }

    /// Post-order rows of `(label, per-entry result)`
    pub fn truth_table(&self) -> &[(String, Vec<bool>)] {
        &self.truth_table
    }

    pub fn len(&self) -> usize {
        self.result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }

    pub fn all_passed(&self) -> bool {
        self.result.iter().all(|kept| *kept)
    }

    pub fn kept_entries(&self) -> Vec<Entry<'a>> {
        self.data
            .entries()
            .iter()
            .zip(&self.result)
            .filter(|(_, kept)| **kept)
            .map(|(entry, _)| *entry)
            .collect()
    }

    pub fn kept(&self) -> Vec<&'a Value> {
        self.kept_entries().into_iter().map(|e| e.value).collect()
    }

    /// The kept entries as a container of the same kind
    pub fn to_value(&self) -> Value {
        let kept = self.kept_entries();
        if self.data.is_list() {
            Value::List(kept.into_iter().map(|e| e.value.clone()).collect())
        } else {
            Value::Map(
                kept.into_iter()
                    .map(|e| (e.key.to_value(), e.value.clone()))
                    .collect::<Map>(),
            )
        }
    }
}

struct Outcome {
    result: Vec<bool>,
    failures: Vec<Option<FailureReason>>,
    processed: Vec<Option<Value>>,
}

impl Outcome {
    fn with_capacity(n: usize) -> Self {
        Self {
            result: Vec::with_capacity(n),
            failures: Vec::with_capacity(n),
            processed: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, kept: bool, failure: Option<FailureReason>, processed: Option<Value>) {
        self.result.push(kept);
        self.failures.push(failure);
        self.processed.push(processed);
    }
}

impl Condition {
    /// Filter a list or map with default options
    pub fn filter<'a>(&self, data: &'a Value) -> Result<FilteredData<'a>> {
        self.filter_with(data, EvalOptions::default())
    }

    /// Filter a list or map; value leaves see entry values, key leaves map
    /// keys and index leaves list indices
    pub fn filter_with<'a>(&self, data: &'a Value, options: EvalOptions<'_>) -> Result<FilteredData<'a>> {
        let data = Data::new(data)?;
        if data.is_list() && self.has_key_leaves() {
            return Err(CoreError::IncompatibleRole(format!(
                "key condition {self} cannot filter a list"
            )));
        }
        if data.is_map() && self.has_index_leaves() {
            return Err(CoreError::IncompatibleRole(format!(
                "index condition {self} cannot filter a map"
            )));
        }

        let mut truth_table = Vec::new();
        let outcome = evaluate(self, &data, &options, &mut truth_table)?;
        Ok(FilteredData {
            data,
            result: outcome.result,
            failures: outcome.failures,
            processed: outcome.processed,
            truth_table,
        })
    }

    /// Test a single datum with default options
    pub fn test(&self, datum: &Value) -> Result<bool> {
        self.test_with(datum, EvalOptions::default())
    }

    /// Test a single datum. Key conditions expect a single-entry map whose
    /// key is tested; index conditions cannot test a lone datum.
    pub fn test_with(&self, datum: &Value, options: EvalOptions<'_>) -> Result<bool> {
        if self.has_index_leaves() {
            return Err(CoreError::IncompatibleRole(format!(
                "index condition {self} cannot test a lone datum"
            )));
        }
        if self.has_key_leaves() {
            return match datum {
                Value::Map(map) if map.len() == 1 => {
                    Ok(self.filter_with(datum, options)?.all_passed())
                }
                other => Err(CoreError::NotFilterable(format!(
                    "key condition {self} needs a single-entry map, got {other}"
                ))),
            };
        }
        let wrapped = Value::List(vec![datum.clone()]);
        Ok(self.filter_with(&wrapped, options)?.all_passed())
    }

    /// Whether every entry of a list or map passes
    pub fn test_all(&self, data: &Value) -> Result<bool> {
        Ok(self.filter(data)?.all_passed())
    }
}

fn evaluate(
    condition: &Condition,
    data: &Data<'_>,
    options: &EvalOptions<'_>,
    truth_table: &mut Vec<(String, Vec<bool>)>,
) -> Result<Outcome> {
    match condition {
        Condition::Null => {
            let mut outcome = Outcome::with_capacity(data.len());
            for _ in data.entries() {
                outcome.push(true, None, None);
            }
            Ok(outcome)
        }
        Condition::Leaf(leaf) => {
            let outcome = evaluate_leaf(leaf, data, options)?;
            truth_table.push((leaf.label(), outcome.result.clone()));
            Ok(outcome)
        }
        Condition::Binary(b) => {
            let left = evaluate(b.left(), data, options, truth_table)?;
            let right = evaluate(b.right(), data, options, truth_table)?;
            let outcome = combine(b.op(), &left, &right);
            truth_table.push((b.op().name().to_string(), outcome.result.clone()));
            Ok(outcome)
        }
    }
}

fn combine(op: BinaryOp, left: &Outcome, right: &Outcome) -> Outcome {
    let mut outcome = Outcome::with_capacity(left.result.len());
    for idx in 0..left.result.len() {
        let kept = op.apply(left.result[idx], right.result[idx]);
        let failure = if kept {
            None
        } else if left.failures[idx]
            .iter()
            .chain(&right.failures[idx])
            .any(FailureReason::is_error)
        {
            Some(FailureReason::BinaryOpError)
        } else {
            Some(FailureReason::BinaryOpFalse)
        };
        outcome.push(kept, failure, None);
    }
    outcome
}

fn evaluate_leaf(leaf: &Leaf, data: &Data<'_>, options: &EvalOptions<'_>) -> Result<Outcome> {
    let predicate = leaf.predicate();
    let args = match leaf
        .args()
        .iter()
        .map(|arg| arg.resolve(options.source))
        .collect::<std::result::Result<Vec<_>, _>>()
    {
        Ok(args) => Some(args),
        Err(message) if options.strict => {
            return Err(CoreError::UnresolvedArgument {
                argument: leaf.label(),
                message,
            })
        }
        Err(message) => {
            log::debug!("Unresolved argument for {}: {}", leaf.label(), message);
            None
        }
    };

    let mut outcome = Outcome::with_capacity(data.len());
    for entry in data.entries() {
        let key;
        let subject = match leaf.role() {
            Role::Value => entry.value,
            Role::Key | Role::Index => {
                key = entry.key.to_value();
                &key
            }
        };

        let processed = match leaf.pre_processor() {
            None => subject.clone(),
            Some(pre) => match pre.apply(subject) {
                Ok(v) => v,
                Err(message) if options.strict => {
                    return Err(CoreError::PreProcessingFailure {
                        pre_processor: pre.name().to_string(),
                        message,
                    })
                }
                Err(message) => {
                    log::debug!("{} failed on {}: {}", pre.name(), subject, message);
                    outcome.push(false, Some(FailureReason::PreProcessingError), None);
                    continue;
                }
            },
        };

        let Some(args) = &args else {
            outcome.push(false, Some(FailureReason::PredicateError), Some(processed));
            continue;
        };

        match predicate.call(&processed, args) {
            Ok(Value::Bool(kept)) => {
                let failure = (!kept).then_some(FailureReason::PredicateFalse);
                outcome.push(kept, failure, Some(processed));
            }
            Ok(other) => {
                return Err(CoreError::InvalidPredicateResult {
                    predicate: predicate.name().to_string(),
                    actual: other.to_string(),
                })
            }
            Err(e) if options.strict => {
                return Err(CoreError::PredicateFailure {
                    predicate: predicate.name().to_string(),
                    message: e.0,
                })
            }
            Err(e) => {
                log::debug!("{} failed on {}: {}", predicate.name(), processed, e);
                outcome.push(false, Some(FailureReason::PredicateError), Some(processed));
            }
        }
    }
    Ok(outcome)
}
