//! The engine context.
//!
//! An [`Engine`] owns one bus registry and one component registry, so
//! several independent engines can live side by side. It is confined to
//! a single thread: components are `Rc<RefCell<_>>` and every operation
//! runs to completion synchronously.
//!
//! Borrows of either registry, and of any component, are taken briefly
//! and released before a user callback runs. Callbacks are therefore free
//! to commit state, register buses or create components re-entrantly.

use busweave_core::constants::NOTIFICATION_METHOD;
use busweave_core::{
    BusError, BusRegistry, BusUpdate, ComponentDirectory, ComponentError, Result, Shared,
    StateMap,
};
use busweave_settings::EngineSettings;
use serde_json::Value;
use std::cell::{Cell, Ref, RefCell};

use crate::collaborators::{ListenerBinder, NodeHandle, TemplateRenderer};
use crate::component::{Component, LifecyclePhase};
use crate::handle::{ComponentHandle, Notification};
use crate::hooks::MethodKind;
use crate::registry::ComponentRegistry;

/// Owner of the bus and component registries.
pub struct Engine {
    pub(crate) settings: EngineSettings,
    pub(crate) buses: RefCell<BusRegistry>,
    pub(crate) components: RefCell<ComponentRegistry>,
    depth: Cell<usize>,
    renderer: Option<Box<dyn TemplateRenderer>>,
    binder: Option<Box<dyn ListenerBinder>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl Engine {
    /// Create an engine and register the configured default bus.
    pub fn new(settings: EngineSettings) -> Self {
        let engine = Self {
            components: RefCell::new(ComponentRegistry::new(&settings.keys)),
            buses: RefCell::new(BusRegistry::new()),
            depth: Cell::new(0),
            renderer: None,
            binder: None,
            settings,
        };

        if let Some(id) = engine.settings.default_bus.clone() {
            if let Err(e) = engine.register_bus(&id, StateMap::new()) {
                tracing::error!("Failed to register default bus '{}': {}", id, e);
            }
        }

        engine
    }

    /// Use `renderer` to turn templates into nodes.
    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Use `binder` to attach declared listeners.
    pub fn with_listener_binder(mut self, binder: impl ListenerBinder + 'static) -> Self {
        self.binder = Some(Box::new(binder));
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The bus registry. Do not hold the borrow across engine calls.
    pub fn buses(&self) -> Ref<'_, BusRegistry> {
        self.buses.borrow()
    }

    /// The component registry. Do not hold the borrow across engine calls.
    pub fn components(&self) -> Ref<'_, ComponentRegistry> {
        self.components.borrow()
    }

    pub fn component(&self, key: &str) -> Option<Shared<Component>> {
        self.components.borrow().get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.components.borrow().contains(key)
    }

    pub(crate) fn require(&self, key: &str) -> std::result::Result<Shared<Component>, ComponentError> {
        self.component(key).ok_or_else(|| ComponentError::NotFound {
            key: key.to_string(),
        })
    }

    /// A handle for calling into a component the way its callbacks do.
    pub fn handle(&self, key: &str) -> Option<ComponentHandle<'_>> {
        self.contains(key).then(|| ComponentHandle::new(self, key))
    }

    /// Snapshot of a component's state.
    pub fn state(&self, key: &str) -> Option<StateMap> {
        self.component(key).map(|c| c.borrow().state().clone())
    }

    pub fn field(&self, key: &str, name: &str) -> Option<Value> {
        self.component(key)
            .and_then(|c| c.borrow().field(name).cloned())
    }

    /// Snapshot of a component's props.
    pub fn props(&self, key: &str) -> Option<StateMap> {
        self.component(key).map(|c| c.borrow().props().clone())
    }

    pub fn phase(&self, key: &str) -> Option<LifecyclePhase> {
        self.component(key).map(|c| c.borrow().phase())
    }

    pub fn reference(&self, key: &str) -> Option<String> {
        self.component(key)
            .and_then(|c| c.borrow().reference().map(str::to_string))
    }

    /// Merge props into a component, overwriting existing names.
    pub fn commit_props(&self, key: &str, props: StateMap) -> Result<()> {
        self.require(key)?.borrow_mut().store.commit_props(props);
        Ok(())
    }

    /// Keys of every component called `component_name`, in creation order.
    pub fn components_by_name(&self, component_name: &str) -> Vec<String> {
        self.components.borrow().keys_by_name(component_name)
    }

    /// The first component called `component_name`.
    pub fn component_by_name(&self, component_name: &str) -> Option<String> {
        self.components_by_name(component_name).into_iter().next()
    }

    /// Subscribers of `publisher` on `bus_id`, in delivery order.
    pub fn subscribers(&self, bus_id: &str, publisher: &str) -> Option<Vec<String>> {
        self.buses
            .borrow()
            .get(bus_id)
            .and_then(|bus| bus.subscribers(publisher))
            .map(|set| set.iter().cloned().collect())
    }

    /// Invoke a named getter, commit or dispatch method.
    ///
    /// An unknown name is logged and yields `Ok(None)`.
    pub fn call(&self, key: &str, kind: MethodKind, name: &str, args: Value) -> Result<Option<Value>> {
        let method = self.require(key)?.borrow().methods.get(kind, name);
        match method {
            Some(method) => Ok(Some(method(&ComponentHandle::new(self, key), args))),
            None => {
                tracing::error!("Component '{}': {} method '{}' is not defined", key, kind, name);
                Ok(None)
            }
        }
    }

    /// Invoke a custom hook. Returns `false` when it is not defined.
    pub fn run_custom_hook(&self, key: &str, name: &str, payload: &StateMap) -> Result<bool> {
        let hook = self.require(key)?.borrow().hooks.custom(name);
        match hook {
            Some(hook) => {
                hook(&ComponentHandle::new(self, key), payload);
                Ok(true)
            }
            None => {
                tracing::error!("Component '{}': hook '{}' is not defined", key, name);
                Ok(false)
            }
        }
    }

    /// Ask the renderer for a node for this component and store it.
    pub fn create_node(&self, key: &str) -> Result<NodeHandle> {
        let component = self.require(key)?;
        let template = component
            .borrow()
            .template
            .clone()
            .ok_or_else(|| ComponentError::MissingTemplate {
                key: key.to_string(),
            })?;
        let renderer = self
            .renderer
            .as_deref()
            .ok_or_else(|| ComponentError::Collaborator {
                reason: "no template renderer configured".to_string(),
            })?;

        let node = renderer.render(&template, key)?;
        tracing::debug!("Component '{}': created node {}", key, node.id());
        component.borrow_mut().node = Some(node.clone());
        Ok(node)
    }

    /// The stored node, if one was created.
    pub fn node(&self, key: &str) -> Option<NodeHandle> {
        self.component(key).and_then(|c| c.borrow().node.clone())
    }

    /// Run a declared listener's callback with `event`.
    ///
    /// Returns `false` when the component has no listener of that name.
    pub fn dispatch_event(&self, key: &str, listener: &str, event: &Value) -> Result<bool> {
        let callback = self
            .require(key)?
            .borrow()
            .listeners
            .iter()
            .find(|l| l.name == listener)
            .map(|l| l.callback.clone());

        match callback {
            Some(callback) => {
                callback(&ComponentHandle::new(self, key), event);
                Ok(true)
            }
            None => {
                tracing::error!("Component '{}': listener '{}' is not defined", key, listener);
                Ok(false)
            }
        }
    }

    pub(crate) fn binder(&self) -> Option<&dyn ListenerBinder> {
        self.binder.as_deref()
    }

    /// Enter one level of notification fan-out.
    pub(crate) fn enter_fan_out(&self, publisher: &str) -> std::result::Result<DepthGuard<'_>, BusError> {
        let depth = self.depth.get() + 1;
        let limit = self.settings.max_notify_depth;
        if depth > limit {
            tracing::warn!(
                "Notification from '{}' dropped at depth {} (limit {})",
                publisher,
                depth,
                limit
            );
            return Err(BusError::DepthExceeded {
                publisher: publisher.to_string(),
                depth,
                limit,
            });
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    /// Current fan-out nesting.
    pub fn notify_depth(&self) -> usize {
        self.depth.get()
    }
}

/// Restores the fan-out depth when a notification level unwinds.
pub(crate) struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl ComponentDirectory for Engine {
    type Handle = Shared<Component>;

    fn lookup(&self, key: &str) -> Option<Self::Handle> {
        self.component(key)
    }

    fn keys(&self) -> Vec<String> {
        self.components.borrow().keys()
    }

    fn deliver(&self, update: BusUpdate<'_>) -> std::result::Result<(), BusError> {
        let (handler, dispatch) = {
            let component = self.component(update.subscriber).ok_or_else(|| {
                BusError::SubscriberNotFound {
                    bus: update.bus_id.to_string(),
                    subscriber: update.subscriber.to_string(),
                }
            })?;
            let component = component.borrow();
            (
                component.on_notification.clone(),
                component.methods.get(MethodKind::Dispatch, NOTIFICATION_METHOD),
            )
        };

        let notification = Notification {
            publisher: update.publisher,
            delta: update.delta,
            bus_id: update.bus_id,
        };
        let handle = ComponentHandle::new(self, update.subscriber);
        match (handler, dispatch) {
            (Some(handler), _) => handler(&handle, &notification),
            (None, Some(dispatch)) => {
                dispatch(&handle, notification.to_value());
            }
            (None, None) => tracing::trace!(
                "Component '{}' has no notification handler",
                update.subscriber
            ),
        }
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("buses", &self.buses.borrow().ids())
            .field("components", &self.components.borrow().keys())
            .field("depth", &self.depth.get())
            .finish_non_exhaustive()
    }
}
