//! Per-call configuration.
//!
//! A context is created for each top-level call and duplicated, with
//! property-level overrides, along the traversal. Duplicates share the
//! circular-reference bookkeeping of their call.

// -----------------------------------------------------------------------------
// Modules

mod denormalization;
mod normalization;
mod version;

// -----------------------------------------------------------------------------
// Exports

pub use denormalization::DenormalizationContext;
pub use normalization::{NormalizationContext, ReferenceGuard};
pub use version::version_compare;

// -----------------------------------------------------------------------------
// Helpers

use alloc::string::String;
use alloc::vec::Vec;

use crate::value::Value;

/// Reads an option holding one name or a list of names.
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::List(list) => list.iter().map(Value::cast_string).collect(),
        Value::Map(map) => map.values().map(Value::cast_string).collect(),
        other => alloc::vec![other.cast_string()],
    }
}
