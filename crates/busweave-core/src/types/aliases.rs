//! Type aliases for commonly used engine types.
//!
//! The engine is single-threaded: components and buses are shared through
//! `Rc<RefCell<T>>`, never across threads. State is structured JSON data,
//! and bus adjacency is kept in insertion-ordered sets so fan-out order is
//! stable.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use busweave_core::types::*;
//!
//! let state: StateMap = state_map([("count", serde_json::json!(0))]);
//! let component: Shared<MyComponent> = shared(MyComponent::default());
//! ```

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

// =============================================================================
// SINGLE-THREADED SHARED TYPES (Rc<RefCell<T>>)
// =============================================================================

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// Components live behind this so a registry lookup can hand out a handle
/// without keeping the registry itself borrowed while hooks run.
pub type Shared<T> = Rc<RefCell<T>>;

// =============================================================================
// STATE TYPES
// =============================================================================

/// A component's props or state: a structured object keyed by field name.
pub type StateMap = Map<String, Value>;

/// The fields a commit actually changed, as delivered to hooks and subscribers.
pub type StateDelta = StateMap;

// =============================================================================
// BUS ADJACENCY TYPES
// =============================================================================

/// An ordered, de-duplicated set of component keys.
pub type KeySet = IndexSet<String>;

/// Publisher key to its ordered subscriber keys.
pub type Adjacency = IndexMap<String, KeySet>;

// =============================================================================
// CONSTRUCTOR HELPERS
// =============================================================================

/// Create a new `Shared<T>` from a value.
#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Build a `StateMap` from `(field, value)` pairs.
///
/// # Example
/// ```rust,ignore
/// let state = state_map([("open", json!(false)), ("items", json!([]))]);
/// ```
pub fn state_map<K, I>(fields: I) -> StateMap
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Name of a JSON value's kind, as used in diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
