//! Type system for Valida
//!
//! This module contains the runtime value model:
//! - `Value`, the datum type navigated by paths and tested by conditions
//! - `Map`, an insertion-ordered mapping with arbitrary keys
//! - `DataType`, the runtime type tag produced by the `dtype` pre-processor

pub mod value;

pub use value::{DataType, Map, Value};
