//! The view a callback gets of its own component.

use busweave_core::{NotifyReport, Result, StateDelta, StateMap};
use serde_json::{json, Value};

use crate::component::LifecyclePhase;
use crate::engine::Engine;
use crate::hooks::MethodKind;
use crate::lifecycle::{CommitOptions, CommitOutcome};

/// What a subscriber is told when a publisher changes.
#[derive(Debug, Clone, Copy)]
pub struct Notification<'a> {
    /// Key of the component whose state changed.
    pub publisher: &'a str,
    /// The fields that changed, with their new values.
    pub delta: &'a StateDelta,
    /// The bus that carried the notification.
    pub bus_id: &'a str,
}

impl Notification<'_> {
    /// `{publisher, delta, busId}`, the argument a dispatch method receives.
    pub fn to_value(&self) -> Value {
        json!({
            "publisher": self.publisher,
            "delta": self.delta,
            "busId": self.bus_id,
        })
    }
}

/// A component key bound to the engine that owns it.
///
/// Every hook, method, listener and notification handler receives one of
/// these instead of a reference to the component itself. Reads take a
/// short borrow and return owned data; nothing is borrowed while the
/// caller holds the handle.
#[derive(Clone)]
pub struct ComponentHandle<'a> {
    engine: &'a Engine,
    key: String,
}

impl<'a> ComponentHandle<'a> {
    pub(crate) fn new(engine: &'a Engine, key: &str) -> Self {
        Self {
            engine,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The owning engine.
    pub fn engine(&self) -> &'a Engine {
        self.engine
    }

    /// Snapshot of the current state; empty if the component was removed.
    pub fn state(&self) -> StateMap {
        self.engine.state(&self.key).unwrap_or_default()
    }

    /// A single state field.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.engine.field(&self.key, name)
    }

    /// Snapshot of the current props.
    pub fn props(&self) -> StateMap {
        self.engine.props(&self.key).unwrap_or_default()
    }

    /// A single prop.
    pub fn prop(&self, name: &str) -> Option<Value> {
        self.props().get(name).cloned()
    }

    pub fn phase(&self) -> Option<LifecyclePhase> {
        self.engine.phase(&self.key)
    }

    /// Commit with rendering and notification enabled.
    pub fn commit(&self, proposed: Value) -> Result<CommitOutcome> {
        self.engine.commit(&self.key, &proposed)
    }

    /// Commit with explicit render/notify flags.
    pub fn commit_with(&self, proposed: Value, options: CommitOptions) -> Result<CommitOutcome> {
        self.engine.commit_state(&self.key, &proposed, options)
    }

    /// Merge props.
    pub fn commit_props(&self, props: StateMap) -> Result<()> {
        self.engine.commit_props(&self.key, props)
    }

    /// Push `delta` to this component's subscribers on every bus.
    pub fn notify_buses(&self, delta: &StateDelta) -> Result<NotifyReport> {
        Ok(self.engine.notify_buses(&self.key, delta)?)
    }

    /// Call a named method on this component.
    pub fn call(&self, kind: MethodKind, name: &str, args: Value) -> Result<Option<Value>> {
        self.engine.call(&self.key, kind, name, args)
    }
}

impl std::fmt::Debug for ComponentHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
