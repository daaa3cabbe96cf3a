//! Structural diff between a component's current state and a proposed one.
//!
//! Comparison rules, field by field:
//! - present in current, absent in proposed: [`DiffEntry::Removed`]
//! - different kind, different scalar, or different array: [`DiffEntry::Changed`]
//! - both objects with differing content: [`DiffEntry::Nested`]
//! - present only in proposed: [`DiffEntry::Changed`]
//! - equal: omitted
//!
//! Arrays are equal when they have the same length and equal elements in the
//! same order. An explicit `null` in the proposed state is a value, not a
//! removal.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::types::{value_kind, StateDelta, StateMap};

/// One field's entry in a [`StateDiff`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "op", content = "value")]
pub enum DiffEntry {
    /// The field exists in the current state but was omitted from the proposed one.
    Removed,
    /// The field takes this new value.
    Changed(Value),
    /// Both sides are objects; only the listed sub-fields differ.
    Nested(StateDiff),
}

impl DiffEntry {
    /// Whether applying this entry would change anything.
    pub fn is_intentional(&self) -> bool {
        match self {
            DiffEntry::Removed => false,
            DiffEntry::Changed(_) => true,
            DiffEntry::Nested(diff) => diff.is_intentional(),
        }
    }
}

/// Field-level differences between two states, in field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StateDiff {
    entries: IndexMap<String, DiffEntry>,
}

impl StateDiff {
    /// Create an empty diff
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `current` against a proposed state.
    ///
    /// A proposed value that is not an object yields an empty diff.
    pub fn compare(current: &StateMap, proposed: &Value) -> Self {
        match proposed {
            Value::Object(proposed) => Self::between(current, proposed),
            other => {
                tracing::warn!(
                    "Ignoring proposed state of kind {}; expected an object",
                    value_kind(other)
                );
                Self::new()
            }
        }
    }

    /// Compare two objects field by field.
    pub fn between(current: &StateMap, proposed: &StateMap) -> Self {
        let mut entries = IndexMap::new();

        for (field, old) in current {
            match proposed.get(field) {
                None => {
                    entries.insert(field.clone(), DiffEntry::Removed);
                }
                Some(new) => {
                    if let Some(entry) = compare_values(old, new) {
                        entries.insert(field.clone(), entry);
                    }
                }
            }
        }

        for (field, new) in proposed {
            if !current.contains_key(field) {
                entries.insert(field.clone(), DiffEntry::Changed(new.clone()));
            }
        }

        Self { entries }
    }

    /// Number of differing fields, removals included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the two states were identical.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a single field.
    pub fn get(&self, field: &str) -> Option<&DiffEntry> {
        self.entries.get(field)
    }

    /// Iterate over `(field, entry)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DiffEntry)> {
        self.entries.iter()
    }

    /// True when at least one entry carries a real change.
    ///
    /// A diff made only of removals is unintentional: omitting a field is
    /// never treated as a request to erase it.
    pub fn is_intentional(&self) -> bool {
        self.entries.values().any(DiffEntry::is_intentional)
    }

    /// Fields that were omitted from the proposed state.
    pub fn removed_fields(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry, DiffEntry::Removed))
            .map(|(field, _)| field.as_str())
            .collect()
    }

    /// Write every non-removal entry into `target`.
    ///
    /// Nested entries merge into an existing object; removals are skipped,
    /// so state only grows or is overwritten through this path.
    pub fn apply_to(&self, target: &mut StateMap) {
        for (field, entry) in &self.entries {
            match entry {
                DiffEntry::Removed => continue,
                DiffEntry::Changed(value) => {
                    target.insert(field.clone(), value.clone());
                }
                DiffEntry::Nested(diff) => {
                    if !diff.is_intentional() {
                        continue;
                    }
                    match target.get_mut(field) {
                        Some(Value::Object(inner)) => diff.apply_to(inner),
                        _ => {
                            target.insert(field.clone(), Value::Object(diff.to_delta()));
                        }
                    }
                }
            }
        }
    }

    /// The changes this diff carries, with removals dropped.
    pub fn to_delta(&self) -> StateDelta {
        let mut delta = StateDelta::new();
        for (field, entry) in &self.entries {
            match entry {
                DiffEntry::Removed => {}
                DiffEntry::Changed(value) => {
                    delta.insert(field.clone(), value.clone());
                }
                DiffEntry::Nested(diff) => {
                    let inner = diff.to_delta();
                    if !inner.is_empty() {
                        delta.insert(field.clone(), Value::Object(inner));
                    }
                }
            }
        }
        delta
    }
}

/// Compare two present values; `None` when they are equal.
fn compare_values(old: &Value, new: &Value) -> Option<DiffEntry> {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => {
            let nested = StateDiff::between(old, new);
            (!nested.is_empty()).then_some(DiffEntry::Nested(nested))
        }
        (Value::Array(old), Value::Array(new)) => {
            (!arrays_match(old, new)).then(|| DiffEntry::Changed(Value::Array(new.clone())))
        }
        _ if value_kind(old) != value_kind(new) => Some(DiffEntry::Changed(new.clone())),
        _ => (!scalars_match(old, new)).then(|| DiffEntry::Changed(new.clone())),
    }
}

fn arrays_match(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_match(x, y))
}

fn values_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(a), Value::Array(b)) => arrays_match(a, b),
        (Value::Object(a), Value::Object(b)) => StateDiff::between(a, b).is_empty(),
        _ => value_kind(a) == value_kind(b) && scalars_match(a, b),
    }
}

// 1 and 1.0 compare equal. Two integers compare exactly, so values past
// 2^53 that only differ in the low bits still count as a change.
fn scalars_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
            x.as_f64() == y.as_f64()
        }
        _ => a == b,
    }
}
