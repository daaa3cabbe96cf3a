//! Component creation and bus wiring.

use busweave_core::constants::{FIELD_EVENT_BUS, FIELD_EVENT_LISTENERS_EXIST, FIELD_KEY};
use busweave_core::{state_map, BusError, ComponentError, Result, Shared, StateMap};
use serde_json::Value;

use crate::component::{Component, InstanceParts};
use crate::config::{ComponentConfig, SubscriptionPlan};
use crate::engine::Engine;
use crate::handle::ComponentHandle;
use crate::hooks::Hook;
use crate::lifecycle::CommitOptions;

/// Result of wiring a subscription plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionReport {
    /// New edges added, counting each direction.
    pub added: usize,
    /// Edges the bus refused.
    pub rejected: Vec<BusError>,
}

impl Engine {
    /// Register a bus under a unique id.
    pub fn register_bus(&self, id: &str, initial_state: StateMap) -> Result<()> {
        self.buses.borrow_mut().register(id, initial_state)?;
        Ok(())
    }

    /// Delete a bus and drop its id from every component's `eventBus`.
    pub fn delete_bus(&self, id: &str) -> Result<()> {
        self.buses.borrow_mut().delete(id)?;

        let members: Vec<(String, Vec<String>)> = self
            .components
            .borrow()
            .iter()
            .filter_map(|(key, component)| {
                let buses = component.borrow().event_buses();
                buses
                    .iter()
                    .any(|bus| bus == id)
                    .then(|| (key.clone(), buses))
            })
            .collect();

        for (key, buses) in members {
            let remaining: Vec<Value> = buses
                .into_iter()
                .filter(|bus| bus != id)
                .map(Value::String)
                .collect();
            self.apply_commit(&key, &event_bus_patch(remaining), CommitOptions::silent())?;
        }

        Ok(())
    }

    /// Create, store and wire a component. Returns its key.
    ///
    /// Every bus named in `eventBus` or `subscriptions` must already exist;
    /// otherwise nothing is stored. Without an explicit subscription plan
    /// the component subscribes to every other publisher on its buses.
    pub fn instantiate(&self, config: ComponentConfig) -> Result<String> {
        let Some(component_name) = config.component_name().map(str::to_string) else {
            tracing::error!("Component not registered: componentName not specified");
            return Err(ComponentError::MissingComponentName.into());
        };

        let planned_buses = config
            .subscriptions
            .iter()
            .flat_map(|plan| plan.keys());
        for bus_id in config.event_bus.iter().chain(planned_buses) {
            if !self.buses.borrow().contains(bus_id) {
                tracing::error!(
                    "Component '{}' not registered: bus '{}' not found",
                    component_name,
                    bus_id
                );
                return Err(BusError::NotFound { id: bus_id.clone() }.into());
            }
        }

        let ComponentConfig {
            key,
            props,
            mut state,
            event_bus,
            subscriptions,
            hooks,
            methods,
            on_notification,
            listeners,
            template,
            reference,
            debug,
        } = config;

        let candidate = key.or_else(|| {
            state
                .get(FIELD_KEY)
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        let key = self
            .components
            .borrow_mut()
            .generate_unique_key(candidate.as_deref(), &component_name)?;

        state.insert(FIELD_KEY.to_string(), Value::String(key.clone()));

        if let Some(before_create) = hooks.get(Hook::BeforeCreate) {
            before_create(&ComponentHandle::new(self, &key), &state);
        }

        let mut component = Component::new();
        component.register_instance(InstanceParts {
            props,
            state,
            hooks,
            methods,
            on_notification,
            listeners,
            template,
            reference,
            debug,
        });
        let component = self.components.borrow_mut().insert(key.clone(), component);
        tracing::debug!("Created component '{}'", key);

        for bus_id in &event_bus {
            self.attach_to_bus(&key, bus_id)?;
        }

        match subscriptions {
            Some(plan) => {
                self.wire_subscriptions(&key, &plan)?;
            }
            None => {
                for bus_id in &event_bus {
                    self.subscribe_to_all(&key, bus_id)?;
                }
            }
        }

        let state = component.borrow().state().clone();
        self.run_hook(&key, &component, Hook::AfterCreate, &state);
        Ok(key)
    }

    /// Instantiate, mount and bind listeners.
    pub fn register(&self, config: ComponentConfig) -> Result<String> {
        let key = self.instantiate(config)?;
        self.mount(&key)?;
        self.bind_listeners(&key)?;
        Ok(key)
    }

    /// Remove a component. Bus edges naming it stay; fan-out skips them.
    pub fn remove_component(&self, key: &str) -> Option<Shared<Component>> {
        let removed = self.components.borrow_mut().remove(key);
        if removed.is_some() {
            tracing::debug!("Removed component '{}'", key);
        }
        removed
    }

    /// Register `key` as a publisher on `bus_id` and record the bus in its
    /// `eventBus` list.
    pub fn attach_to_bus(&self, key: &str, bus_id: &str) -> Result<()> {
        let component = self.require(key)?;
        self.buses
            .borrow_mut()
            .require_mut(bus_id)?
            .register_publisher(key);

        let mut buses = component.borrow().event_buses();
        if !buses.iter().any(|bus| bus == bus_id) {
            buses.push(bus_id.to_string());
            let ids = buses.into_iter().map(Value::String).collect();
            self.apply_commit(key, &event_bus_patch(ids), CommitOptions::silent())?;
        }
        Ok(())
    }

    /// Wire `subscriber` to the publishers named in `plan`, in both
    /// directions.
    ///
    /// The subscriber is attached to every bus in the plan first. Edges the
    /// bus refuses, such as a publisher that was never registered on it,
    /// are logged and collected in the report.
    pub fn wire_subscriptions(
        &self,
        subscriber: &str,
        plan: &SubscriptionPlan,
    ) -> Result<SubscriptionReport> {
        for bus_id in plan.keys() {
            let attached = self
                .buses
                .borrow()
                .get(bus_id)
                .map(|bus| bus.is_publisher(subscriber))
                .ok_or_else(|| BusError::NotFound { id: bus_id.clone() })?;
            if !attached {
                self.attach_to_bus(subscriber, bus_id)?;
            }
        }

        let mut report = SubscriptionReport::default();
        for (bus_id, publishers) in plan {
            let mut buses = self.buses.borrow_mut();
            let bus = buses.require_mut(bus_id)?;
            for publisher in publishers {
                if publisher == subscriber {
                    tracing::debug!("Bus '{}': '{}' cannot subscribe to itself", bus_id, subscriber);
                    continue;
                }
                for (from, to) in [(publisher.as_str(), subscriber), (subscriber, publisher.as_str())] {
                    match bus.add_subscribers(from, to) {
                        Ok(true) => report.added += 1,
                        Ok(false) => {}
                        Err(e) => {
                            tracing::warn!("{}; subscription not added", e);
                            report.rejected.push(e);
                        }
                    }
                }
            }
        }
        Ok(report)
    }

    /// Subscribe `key` to every other publisher on `bus_id`.
    pub fn subscribe_to_all(&self, key: &str, bus_id: &str) -> Result<SubscriptionReport> {
        let others: Vec<String> = self
            .buses
            .borrow()
            .get(bus_id)
            .ok_or_else(|| BusError::NotFound {
                id: bus_id.to_string(),
            })?
            .publisher_keys()
            .into_iter()
            .filter(|publisher| publisher != key)
            .collect();

        let mut plan = SubscriptionPlan::new();
        plan.insert(bus_id.to_string(), others);
        self.wire_subscriptions(key, &plan)
    }

    /// Attach the component's declared listeners to its node.
    ///
    /// The node is created through the renderer when there is none yet.
    /// Attach failures are logged and skipped. Returns how many listeners
    /// were attached.
    pub fn bind_listeners(&self, key: &str) -> Result<usize> {
        let listeners = self.require(key)?.borrow().listeners.clone();
        if listeners.is_empty() {
            return Ok(0);
        }

        let Some(binder) = self.binder() else {
            tracing::warn!(
                "Component '{}' declares listeners but no listener binder is configured",
                key
            );
            return Ok(0);
        };

        let node = match self.node(key) {
            Some(node) => node,
            None => match self.create_node(key) {
                Ok(node) => node,
                Err(e) => {
                    tracing::error!("Component '{}': listeners not attached: {}", key, e);
                    return Ok(0);
                }
            },
        };

        let mut attached = 0;
        for listener in &listeners {
            match binder.attach(&node, key, listener) {
                Ok(()) => attached += 1,
                Err(e) => tracing::error!(
                    "Component '{}': not a valid event listener '{}': {}",
                    key,
                    listener.event,
                    e
                ),
            }
        }

        let patch = Value::Object(state_map([(FIELD_EVENT_LISTENERS_EXIST, Value::Bool(true))]));
        self.commit_state(key, &patch, CommitOptions::silent())?;
        Ok(attached)
    }
}

fn event_bus_patch(ids: Vec<Value>) -> Value {
    Value::Object(state_map([(FIELD_EVENT_BUS, Value::Array(ids))]))
}
