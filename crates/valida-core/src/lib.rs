//! Valida Core - condition algebra and path resolution for nested data
//!
//! This crate provides the building blocks of the Valida validation engine:
//! - Runtime value model and the `Data` adapter over nested lists/maps
//! - Predicate registry and the `Condition` expression tree
//! - Role classification (value / key / index conditions)
//! - `DataPath` resolution with provenance, transforms and arity selectors
//! - Error types

pub mod condition;
pub mod data;
pub mod error;
pub mod path;
pub mod types;

pub use condition::{
    and_of, index, key, or_of, value, xor_of, Argument, Condition, EvalOptions, FailureReason,
    FilteredData, GeneralPredicates, MapPredicates, PreProcessor, Role,
};
pub use data::{Data, DataKey, Entry};
pub use error::{CoreError, Result};
pub use path::{Arity, ContainerKind, ContainerValue, DataPath, DatumType, Match, PathPart, Resolved};
pub use types::{DataType, Map, Value};

/// Convenience re-exports for building conditions and paths
pub mod prelude {
    pub use crate::condition::{
        and_of, index, key, or_of, value, xor_of, Condition, GeneralPredicates, MapPredicates,
    };
    pub use crate::data::Data;
    pub use crate::path::{ContainerValue, DataPath, PathPart};
    pub use crate::types::{DataType, Map, Value};
}
