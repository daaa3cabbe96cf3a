//! A single component instance.

use busweave_core::{ComponentState, StateMap};
use serde_json::Value;
use std::fmt;

use crate::collaborators::NodeHandle;
use crate::config::ListenerConfig;
use crate::hooks::{HookTable, MethodTable, NotifyHandler};

/// Where a component is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecyclePhase {
    /// Constructed but not yet configured.
    #[default]
    Uninitialized,
    /// Configured, stored and wired.
    Created,
    /// Mount hooks are running.
    Mounting,
    /// Mounted and idle.
    Mounted,
    /// Update hooks are running.
    Updating,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::Uninitialized => "uninitialized",
            LifecyclePhase::Created => "created",
            LifecyclePhase::Mounting => "mounting",
            LifecyclePhase::Mounted => "mounted",
            LifecyclePhase::Updating => "updating",
        };
        f.write_str(name)
    }
}

/// Initial configuration applied by [`Component::register_instance`].
pub(crate) struct InstanceParts {
    pub props: StateMap,
    pub state: StateMap,
    pub hooks: HookTable,
    pub methods: MethodTable,
    pub on_notification: Option<NotifyHandler>,
    pub listeners: Vec<ListenerConfig>,
    pub template: Option<String>,
    pub reference: Option<String>,
    pub debug: bool,
}

/// Props, state and behaviour of one component.
///
/// Components are owned by the [`ComponentRegistry`](crate::ComponentRegistry)
/// and driven through the [`Engine`](crate::Engine); callbacks see them
/// only through a [`ComponentHandle`](crate::ComponentHandle).
pub struct Component {
    pub(crate) store: ComponentState,
    pub(crate) hooks: HookTable,
    pub(crate) methods: MethodTable,
    pub(crate) on_notification: Option<NotifyHandler>,
    pub(crate) listeners: Vec<ListenerConfig>,
    pub(crate) template: Option<String>,
    pub(crate) reference: Option<String>,
    pub(crate) node: Option<NodeHandle>,
    pub(crate) phase: LifecyclePhase,
    pub(crate) first_render: bool,
    pub(crate) debug: bool,
}

impl Default for Component {
    fn default() -> Self {
        Self::new()
    }
}

impl Component {
    /// An unconfigured component with the reserved fields in place.
    pub fn new() -> Self {
        Self {
            store: ComponentState::new(),
            hooks: HookTable::new(),
            methods: MethodTable::new(),
            on_notification: None,
            listeners: Vec::new(),
            template: None,
            reference: None,
            node: None,
            phase: LifecyclePhase::Uninitialized,
            first_render: true,
            debug: false,
        }
    }

    /// Apply the initial configuration: merge overrides, set props and
    /// commit the initial state without rendering.
    pub(crate) fn register_instance(&mut self, parts: InstanceParts) {
        self.hooks.merge(&parts.hooks);
        self.methods.merge(&parts.methods);
        if parts.on_notification.is_some() {
            self.on_notification = parts.on_notification;
        }
        self.listeners.extend(parts.listeners);
        self.template = parts.template.or(self.template.take());
        self.reference = parts.reference.or(self.reference.take());
        self.debug = parts.debug;

        self.store.commit_props(parts.props);
        self.store.commit(&Value::Object(parts.state));
        self.phase = LifecyclePhase::Created;
    }

    pub fn key(&self) -> &str {
        self.store.key()
    }

    pub fn component_name(&self) -> &str {
        self.store.component_name()
    }

    pub fn state(&self) -> &StateMap {
        self.store.state()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.store.field(name)
    }

    pub fn props(&self) -> &StateMap {
        self.store.props()
    }

    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.store.prop(name)
    }

    /// Buses this component publishes on.
    pub fn event_buses(&self) -> Vec<String> {
        self.store.event_buses()
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// True until the component has mounted.
    pub fn is_first_render(&self) -> bool {
        self.first_render
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// The rendered node, once one has been created.
    pub fn node(&self) -> Option<&NodeHandle> {
        self.node.as_ref()
    }

    pub fn listeners(&self) -> &[ListenerConfig] {
        &self.listeners
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("key", &self.key())
            .field("phase", &self.phase)
            .field("state", self.state())
            .field("hooks", &self.hooks)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
