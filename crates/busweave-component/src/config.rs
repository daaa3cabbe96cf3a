//! Component configuration.
//!
//! [`ComponentConfig`] is what a caller hands to
//! [`Engine::instantiate`](crate::Engine::instantiate): a name, initial
//! props and state, bus membership, an optional explicit subscription
//! plan, and the callbacks that override the component's defaults.
//!
//! ```rust,ignore
//! let config = ComponentConfig::new("cart_total")
//!     .with_state(state_map([("total", json!(0))]))
//!     .on_bus("cart")
//!     .hook(Hook::AfterUpdate, |handle, delta| {
//!         tracing::info!("{} changed: {:?}", handle.key(), delta);
//!     });
//! ```

use busweave_core::constants::{FIELD_COMPONENT_NAME, FIELD_EVENT_BUS, FIELD_KEY};
use busweave_core::{value_kind, StateError, StateMap};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::handle::{ComponentHandle, Notification};
use crate::hooks::{Hook, HookTable, ListenerFn, MethodKind, MethodTable, NotifyHandler};

/// Explicit subscriptions: bus id → publisher keys to listen to.
pub type SubscriptionPlan = IndexMap<String, Vec<String>>;

/// Where a listener is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// The component's own node.
    Node,
    /// A descendant matched by a CSS selector.
    Css(String),
}

impl Selector {
    /// `""` and `"self"` mean the component's own node.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "self" => Selector::Node,
            other => Selector::Css(other.to_string()),
        }
    }
}

/// A declared event listener.
#[derive(Clone)]
pub struct ListenerConfig {
    /// Name used to dispatch the listener.
    pub name: String,
    /// Host event name, such as `"click"`.
    pub event: String,
    pub selector: Selector,
    pub callback: ListenerFn,
}

impl ListenerConfig {
    pub fn new<F>(name: &str, event: &str, selector: Selector, callback: F) -> Self
    where
        F: Fn(&ComponentHandle<'_>, &Value) + 'static,
    {
        Self {
            name: name.to_string(),
            event: event.to_string(),
            selector,
            callback: Rc::new(callback),
        }
    }
}

impl fmt::Debug for ListenerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerConfig")
            .field("name", &self.name)
            .field("event", &self.event)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Everything needed to create a component.
#[derive(Clone, Default)]
pub struct ComponentConfig {
    pub(crate) key: Option<String>,
    pub(crate) props: StateMap,
    pub(crate) state: StateMap,
    pub(crate) event_bus: Vec<String>,
    pub(crate) subscriptions: Option<SubscriptionPlan>,
    pub(crate) hooks: HookTable,
    pub(crate) methods: MethodTable,
    pub(crate) on_notification: Option<NotifyHandler>,
    pub(crate) listeners: Vec<ListenerConfig>,
    pub(crate) template: Option<String>,
    pub(crate) reference: Option<String>,
    pub(crate) debug: bool,
}

impl ComponentConfig {
    /// A config for a component called `component_name`.
    pub fn new(component_name: &str) -> Self {
        let mut config = Self::default();
        config.state.insert(
            FIELD_COMPONENT_NAME.to_string(),
            Value::String(component_name.to_string()),
        );
        config
    }

    /// Parse the JSON configuration surface.
    ///
    /// Accepts `key`, `componentName` (top level or inside `state`),
    /// `props`, `state`, `eventBus`, `subscriptions`, `template`, `ref`
    /// and `debug`. Callbacks cannot be expressed in JSON and are added
    /// with the builder methods afterwards.
    pub fn from_json(value: Value) -> Result<Self, StateError> {
        let Value::Object(mut root) = value else {
            return Err(StateError::NotAnObject {
                kind: value_kind(&value).to_string(),
            });
        };

        let mut config = Self::default();

        if let Some(state) = root.remove("state") {
            config.state = expect_object(state)?;
        }
        if let Some(props) = root.remove("props") {
            config.props = expect_object(props)?;
        }
        if let Some(name) = root.remove(FIELD_COMPONENT_NAME) {
            config.state.insert(FIELD_COMPONENT_NAME.to_string(), name);
        }
        if let Some(name) = config.state.get(FIELD_COMPONENT_NAME) {
            if !name.is_string() {
                return Err(reserved(FIELD_COMPONENT_NAME, "a string"));
            }
        }

        config.key = match root.remove(FIELD_KEY) {
            Some(Value::String(key)) => Some(key),
            Some(Value::Null) | None => None,
            Some(_) => return Err(reserved(FIELD_KEY, "a string")),
        };

        if let Some(buses) = root.remove(FIELD_EVENT_BUS) {
            config.event_bus = string_list(buses, FIELD_EVENT_BUS)?;
        }
        if let Some(buses) = config.state.remove(FIELD_EVENT_BUS) {
            for id in string_list(buses, FIELD_EVENT_BUS)? {
                config.push_bus(id);
            }
        }

        if let Some(plan) = root.remove("subscriptions") {
            let mut subscriptions = SubscriptionPlan::new();
            for (bus, publishers) in expect_object(plan)? {
                subscriptions.insert(bus, string_list(publishers, "subscriptions")?);
            }
            config.subscriptions = Some(subscriptions);
        }

        config.template = optional_string(root.remove("template"), "template")?;
        config.reference = optional_string(root.remove("ref"), "ref")?;
        config.debug = root
            .remove("debug")
            .and_then(|debug| debug.as_bool())
            .unwrap_or(false);

        Ok(config)
    }

    /// The configured component name, if any.
    pub fn component_name(&self) -> Option<&str> {
        self.state
            .get(FIELD_COMPONENT_NAME)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Requested key; a collision is resolved by generating a new one.
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Merge fields into the initial state.
    ///
    /// An `eventBus` list is taken as buses to publish on, like [`on_bus`].
    ///
    /// [`on_bus`]: ComponentConfig::on_bus
    pub fn with_state(mut self, state: StateMap) -> Self {
        for (field, value) in state {
            if field != FIELD_EVENT_BUS {
                self.state.insert(field, value);
                continue;
            }
            match string_list(value, FIELD_EVENT_BUS) {
                Ok(ids) => ids.into_iter().for_each(|id| self.push_bus(id)),
                Err(e) => tracing::warn!("Ignoring initial state field: {}", e),
            }
        }
        self
    }

    /// Merge initial props.
    pub fn with_props(mut self, props: StateMap) -> Self {
        for (name, value) in props {
            self.props.insert(name, value);
        }
        self
    }

    /// Publish on a bus. Repeats are ignored.
    pub fn on_bus(mut self, bus_id: &str) -> Self {
        self.push_bus(bus_id.to_string());
        self
    }

    /// Listen to `publishers` on `bus_id`, replacing automatic subscription.
    pub fn subscribe(mut self, bus_id: &str, publishers: &[&str]) -> Self {
        let plan = self.subscriptions.get_or_insert_with(SubscriptionPlan::new);
        let entry = plan.entry(bus_id.to_string()).or_default();
        for publisher in publishers {
            if !entry.iter().any(|known| known == publisher) {
                entry.push(publisher.to_string());
            }
        }
        self
    }

    /// Fill a lifecycle hook slot.
    pub fn hook<F>(mut self, hook: Hook, callback: F) -> Self
    where
        F: Fn(&ComponentHandle<'_>, &StateMap) + 'static,
    {
        self.hooks.set(hook, Rc::new(callback));
        self
    }

    /// Fill a hook by name; names that are not lifecycle hooks become
    /// custom hooks.
    pub fn hook_named<F>(mut self, name: &str, callback: F) -> Self
    where
        F: Fn(&ComponentHandle<'_>, &StateMap) + 'static,
    {
        self.hooks.set_named(name, Rc::new(callback));
        self
    }

    /// Define a getter, commit or dispatch method.
    pub fn method<F>(mut self, kind: MethodKind, name: &str, method: F) -> Self
    where
        F: Fn(&ComponentHandle<'_>, Value) -> Value + 'static,
    {
        self.methods.set(kind, name, Rc::new(method));
        self
    }

    /// Handle notifications from publishers this component listens to.
    ///
    /// Without a handler, a `dispatch` method named `update` receives
    /// `{publisher, delta, busId}` instead.
    pub fn on_notification<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ComponentHandle<'_>, &Notification<'_>) + 'static,
    {
        self.on_notification = Some(Rc::new(handler));
        self
    }

    /// Declare an event listener, attached when the component is registered.
    pub fn listener(mut self, listener: ListenerConfig) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn with_template(mut self, template: &str) -> Self {
        self.template = Some(template.to_string());
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    /// Trace every hook invocation of this component at debug level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Declared buses, in order.
    pub fn event_bus(&self) -> &[String] {
        &self.event_bus
    }

    pub fn subscriptions(&self) -> Option<&SubscriptionPlan> {
        self.subscriptions.as_ref()
    }

    fn push_bus(&mut self, bus_id: String) {
        if !self.event_bus.contains(&bus_id) {
            self.event_bus.push(bus_id);
        }
    }
}

impl fmt::Debug for ComponentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentConfig")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("props", &self.props)
            .field("event_bus", &self.event_bus)
            .field("subscriptions", &self.subscriptions)
            .field("hooks", &self.hooks)
            .field("methods", &self.methods)
            .field("listeners", &self.listeners)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

fn reserved(field: &str, expected: &str) -> StateError {
    StateError::ReservedFieldType {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}

fn expect_object(value: Value) -> Result<StateMap, StateError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StateError::NotAnObject {
            kind: value_kind(&other).to_string(),
        }),
    }
}

fn string_list(value: Value, field: &str) -> Result<Vec<String>, StateError> {
    let Value::Array(items) = value else {
        return Err(reserved(field, "an array of strings"));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(reserved(field, "an array of strings")),
        })
        .collect()
}

fn optional_string(value: Option<Value>, field: &str) -> Result<Option<String>, StateError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(reserved(field, "a string")),
    }
}
