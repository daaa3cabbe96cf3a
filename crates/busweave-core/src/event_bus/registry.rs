//! Table of named notification buses.

use indexmap::IndexMap;

use super::bus::NotificationBus;
use crate::error::BusError;
use crate::types::StateMap;

/// Owns every [`NotificationBus`], keyed by id.
#[derive(Debug, Default)]
pub struct BusRegistry {
    buses: IndexMap<String, NotificationBus>,
}

impl BusRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a bus under `id`.
    ///
    /// Fails when `id` is empty or any stored bus already carries it; the
    /// registry is left unchanged in both cases.
    pub fn register(
        &mut self,
        id: &str,
        initial_state: StateMap,
    ) -> Result<&mut NotificationBus, BusError> {
        if id.is_empty() {
            tracing::error!("Failed to register new bus; id not provided");
            return Err(BusError::MissingId);
        }

        if self.buses.values().any(|bus| bus.id() == id) {
            tracing::error!("Failed to register new bus; id '{}' already exists", id);
            return Err(BusError::DuplicateId { id: id.to_string() });
        }

        tracing::debug!("Registered bus '{}'", id);
        let entry = self
            .buses
            .entry(id.to_string())
            .or_insert_with(|| NotificationBus::new(id, initial_state));
        Ok(entry)
    }

    /// Look up a bus.
    pub fn get(&self, id: &str) -> Option<&NotificationBus> {
        self.buses.get(id)
    }

    /// Look up a bus for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut NotificationBus> {
        self.buses.get_mut(id)
    }

    /// Look up a bus, failing with [`BusError::NotFound`].
    pub fn require_mut(&mut self, id: &str) -> Result<&mut NotificationBus, BusError> {
        self.buses
            .get_mut(id)
            .ok_or_else(|| BusError::NotFound { id: id.to_string() })
    }

    /// Every bus, keyed by id, in registration order.
    pub fn get_all(&self) -> &IndexMap<String, NotificationBus> {
        &self.buses
    }

    /// Registered bus ids.
    pub fn ids(&self) -> Vec<String> {
        self.buses.keys().cloned().collect()
    }

    /// Whether a bus is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.buses.contains_key(id)
    }

    /// Number of registered buses.
    pub fn len(&self) -> usize {
        self.buses.len()
    }

    /// True when no bus is registered.
    pub fn is_empty(&self) -> bool {
        self.buses.is_empty()
    }

    /// Release a bus's adjacency data and detach it from the registry.
    ///
    /// Callers holding components are responsible for dropping the id from
    /// each component's `eventBus` list.
    pub fn delete(&mut self, id: &str) -> Result<NotificationBus, BusError> {
        let mut bus = self
            .buses
            .shift_remove(id)
            .ok_or_else(|| BusError::NotFound { id: id.to_string() })?;
        bus.clear();
        tracing::debug!("Deleted bus '{}'", id);
        Ok(bus)
    }
}
