//! Per-component holder of props and state.
//!
//! `ComponentState` owns the dirty-check policy: a commit is accepted only
//! when its diff contains at least one intentional change, and even then
//! omitted fields are left untouched.

use serde_json::Value;

use crate::constants::{FIELD_COMPONENT_NAME, FIELD_EVENT_BUS, FIELD_KEY};
use crate::state::diff::StateDiff;
use crate::types::{StateDelta, StateMap};

/// Result of comparing a proposed state with the current one.
#[derive(Debug, Clone, PartialEq)]
pub struct StateComparison {
    /// Field-level differences, removals included.
    pub diff: StateDiff,
    /// True when the diff holds at least one intentional change.
    pub state_changed: bool,
}

/// Props and diffable state of a single component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentState {
    props: StateMap,
    state: StateMap,
}

impl Default for ComponentState {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentState {
    /// Create an empty holder with the reserved fields in place.
    pub fn new() -> Self {
        let mut state = StateMap::new();
        state.insert(FIELD_KEY.to_string(), Value::String(String::new()));
        state.insert(
            FIELD_COMPONENT_NAME.to_string(),
            Value::String(String::new()),
        );
        state.insert(FIELD_EVENT_BUS.to_string(), Value::Array(Vec::new()));
        Self {
            props: StateMap::new(),
            state,
        }
    }

    /// The full current state.
    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// A single state field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    /// The full props object.
    pub fn props(&self) -> &StateMap {
        &self.props
    }

    /// A single prop.
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// The component key, empty until one is assigned.
    pub fn key(&self) -> &str {
        self.state
            .get(FIELD_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The developer-chosen component name.
    pub fn component_name(&self) -> &str {
        self.state
            .get(FIELD_COMPONENT_NAME)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Ids of the buses this component publishes on, in registration order.
    pub fn event_buses(&self) -> Vec<String> {
        self.state
            .get(FIELD_EVENT_BUS)
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Merge props, overwriting any existing keys.
    pub fn commit_props(&mut self, props: StateMap) {
        for (name, value) in props {
            self.props.insert(name, value);
        }
    }

    /// Diff a proposed state against the current one and classify it.
    pub fn has_state_changed(&self, proposed: &Value) -> StateComparison {
        let diff = StateDiff::compare(&self.state, proposed);
        let state_changed = !diff.is_empty() && diff.is_intentional();
        StateComparison {
            diff,
            state_changed,
        }
    }

    /// The first engine-owned field that `proposed` would rewrite.
    ///
    /// Echoing a reserved field back with its current value is allowed, so
    /// a caller can commit a modified copy of the full state.
    pub fn reserved_conflict(&self, proposed: &Value) -> Option<&'static str> {
        let proposed = proposed.as_object()?;
        [FIELD_KEY, FIELD_COMPONENT_NAME, FIELD_EVENT_BUS]
            .into_iter()
            .find(|field| match proposed.get(*field) {
                Some(value) => self.state.get(*field) != Some(value),
                None => false,
            })
    }

    /// Apply a proposed state if it carries an intentional change.
    ///
    /// Returns the applied delta, or `None` when the proposal was identical,
    /// malformed, or consisted solely of omitted fields.
    pub fn commit(&mut self, proposed: &Value) -> Option<StateDelta> {
        let comparison = self.has_state_changed(proposed);
        if !comparison.state_changed {
            if !comparison.diff.is_empty() {
                tracing::trace!(
                    "Ignoring unintentional change to '{}': only removals {:?}",
                    self.key(),
                    comparison.diff.removed_fields()
                );
            }
            return None;
        }

        comparison.diff.apply_to(&mut self.state);
        Some(comparison.diff.to_delta())
    }
}
