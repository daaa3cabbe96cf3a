//! Lifecycle hooks and named method tables.
//!
//! The eight lifecycle hooks are a fixed [`Hook`] enum mapped to optional
//! callback slots. Anything else a component wants to expose by name
//! lives in a typed side-table: custom hooks in [`HookTable`], and
//! getter/commit/dispatch methods in [`MethodTable`]. Merging a table
//! replaces any entry of the same name outright.

use busweave_core::StateMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::handle::{ComponentHandle, Notification};

/// Callback for a lifecycle or custom hook; receives state or a delta.
pub type HookFn = Rc<dyn Fn(&ComponentHandle<'_>, &StateMap)>;

/// Callback for a named getter, commit or dispatch method.
pub type MethodFn = Rc<dyn Fn(&ComponentHandle<'_>, Value) -> Value>;

/// Callback invoked when a publisher this component listens to changes.
pub type NotifyHandler = Rc<dyn Fn(&ComponentHandle<'_>, &Notification<'_>)>;

/// Callback invoked when an attached DOM-side listener fires.
pub type ListenerFn = Rc<dyn Fn(&ComponentHandle<'_>, &Value)>;

/// Lifecycle hooks, in the order they first fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Before the component is stored; receives the initial state.
    BeforeCreate,
    /// After the component is stored and wired; receives its state.
    AfterCreate,
    /// First mount step.
    BeforeMount,
    /// Second mount step.
    OnMount,
    /// Last mount step, before the mount notification.
    AfterMount,
    /// First update step; receives the delta.
    BeforeUpdate,
    /// Second update step.
    OnUpdate,
    /// Last update step, before subscribers are notified.
    AfterUpdate,
}

impl Hook {
    /// Every hook.
    pub const ALL: [Hook; 8] = [
        Hook::BeforeCreate,
        Hook::AfterCreate,
        Hook::BeforeMount,
        Hook::OnMount,
        Hook::AfterMount,
        Hook::BeforeUpdate,
        Hook::OnUpdate,
        Hook::AfterUpdate,
    ];

    /// The hook's configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Hook::BeforeCreate => "beforeCreate",
            Hook::AfterCreate => "afterCreate",
            Hook::BeforeMount => "beforeMount",
            Hook::OnMount => "onMount",
            Hook::AfterMount => "afterMount",
            Hook::BeforeUpdate => "beforeUpdate",
            Hook::OnUpdate => "onUpdate",
            Hook::AfterUpdate => "afterUpdate",
        }
    }

    /// Parse a configuration name.
    pub fn from_name(name: &str) -> Option<Hook> {
        Hook::ALL.into_iter().find(|hook| hook.name() == name)
    }

    /// Short description used in hook traces.
    pub fn describe(&self) -> &'static str {
        match self {
            Hook::BeforeCreate => "Component will be created",
            Hook::AfterCreate => "Component was created",
            Hook::BeforeMount => "Component will mount",
            Hook::OnMount => "Component mounting",
            Hook::AfterMount => "Component has mounted",
            Hook::BeforeUpdate => "Component will update",
            Hook::OnUpdate => "Component updating",
            Hook::AfterUpdate => "Component updated",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which named method table a call goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Read-only accessors.
    Get,
    /// State mutations.
    Commit,
    /// Actions.
    Dispatch,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Get => write!(f, "getter"),
            MethodKind::Commit => write!(f, "commit"),
            MethodKind::Dispatch => write!(f, "dispatch"),
        }
    }
}

/// Lifecycle hook slots plus custom hooks.
#[derive(Clone, Default)]
pub struct HookTable {
    lifecycle: HashMap<Hook, HookFn>,
    custom: HashMap<String, HookFn>,
}

impl HookTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill a lifecycle slot, replacing what was there.
    pub fn set(&mut self, hook: Hook, callback: HookFn) {
        self.lifecycle.insert(hook, callback);
    }

    /// Fill a slot by name; unknown names become custom hooks.
    pub fn set_named(&mut self, name: &str, callback: HookFn) {
        match Hook::from_name(name) {
            Some(hook) => self.set(hook, callback),
            None => {
                self.custom.insert(name.to_string(), callback);
            }
        }
    }

    /// The callback in a lifecycle slot.
    pub fn get(&self, hook: Hook) -> Option<HookFn> {
        self.lifecycle.get(&hook).cloned()
    }

    /// A custom hook by name.
    pub fn custom(&self, name: &str) -> Option<HookFn> {
        self.custom.get(name).cloned()
    }

    /// Names of every custom hook.
    pub fn custom_names(&self) -> Vec<&str> {
        self.custom.keys().map(String::as_str).collect()
    }

    /// Copy every entry of `other` over this table.
    pub fn merge(&mut self, other: &HookTable) {
        for (hook, callback) in &other.lifecycle {
            self.lifecycle.insert(*hook, callback.clone());
        }
        for (name, callback) in &other.custom {
            self.custom.insert(name.clone(), callback.clone());
        }
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lifecycle: Vec<&str> = Hook::ALL
            .iter()
            .filter(|hook| self.lifecycle.contains_key(hook))
            .map(Hook::name)
            .collect();
        f.debug_struct("HookTable")
            .field("lifecycle", &lifecycle)
            .field("custom", &self.custom_names())
            .finish()
    }
}

/// Named getter, commit and dispatch methods.
#[derive(Clone, Default)]
pub struct MethodTable {
    get: HashMap<String, MethodFn>,
    commit: HashMap<String, MethodFn>,
    dispatch: HashMap<String, MethodFn>,
}

impl MethodTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: MethodKind) -> &HashMap<String, MethodFn> {
        match kind {
            MethodKind::Get => &self.get,
            MethodKind::Commit => &self.commit,
            MethodKind::Dispatch => &self.dispatch,
        }
    }

    fn table_mut(&mut self, kind: MethodKind) -> &mut HashMap<String, MethodFn> {
        match kind {
            MethodKind::Get => &mut self.get,
            MethodKind::Commit => &mut self.commit,
            MethodKind::Dispatch => &mut self.dispatch,
        }
    }

    /// Define or replace a method.
    pub fn set(&mut self, kind: MethodKind, name: &str, method: MethodFn) {
        self.table_mut(kind).insert(name.to_string(), method);
    }

    /// Look up a method.
    pub fn get(&self, kind: MethodKind, name: &str) -> Option<MethodFn> {
        self.table(kind).get(name).cloned()
    }

    /// Names defined for one kind.
    pub fn names(&self, kind: MethodKind) -> Vec<&str> {
        self.table(kind).keys().map(String::as_str).collect()
    }

    /// Copy every entry of `other` over this table.
    pub fn merge(&mut self, other: &MethodTable) {
        for kind in [MethodKind::Get, MethodKind::Commit, MethodKind::Dispatch] {
            for (name, method) in other.table(kind) {
                self.table_mut(kind).insert(name.clone(), method.clone());
            }
        }
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("get", &self.names(MethodKind::Get))
            .field("commit", &self.names(MethodKind::Commit))
            .field("dispatch", &self.names(MethodKind::Dispatch))
            .finish()
    }
}
