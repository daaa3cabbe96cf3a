//! Component storage and key generation.

use busweave_core::constants::KEY_PREFIX;
use busweave_core::{shared, ComponentError, Shared};
use busweave_settings::KeySettings;
use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::component::Component;

/// Produces component keys of the form `component_{name}_{suffix}`.
///
/// The RNG is seeded from [`KeySettings::seed`] when one is set, so the
/// same sequence of requests yields the same keys. Candidates are first
/// drawn from `0..suffix_space`; once `retry_limit` of those collide the
/// generator widens to 64-bit hex suffixes for another `retry_limit`
/// tries before giving up.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    rng: ChaCha8Rng,
    suffix_space: u32,
    retry_limit: u32,
}

impl KeyGenerator {
    pub fn new(settings: &KeySettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng,
            suffix_space: settings.suffix_space.max(1),
            retry_limit: settings.retry_limit.max(1),
        }
    }

    /// Return `candidate` if it is free, otherwise a generated free key.
    pub fn unique_key<F>(
        &mut self,
        candidate: Option<&str>,
        component_name: &str,
        is_taken: F,
    ) -> Result<String, ComponentError>
    where
        F: Fn(&str) -> bool,
    {
        if let Some(candidate) = candidate.filter(|c| !c.is_empty()) {
            if !is_taken(candidate) {
                return Ok(candidate.to_string());
            }
            tracing::debug!("Key '{}' is taken, generating a new one", candidate);
        }

        let mut attempts = 0;
        for _ in 0..self.retry_limit {
            attempts += 1;
            let key = self.narrow_key(component_name);
            if !is_taken(&key) {
                return Ok(key);
            }
        }

        tracing::warn!(
            "Key space for '{}' is crowded after {} attempts, widening suffix",
            component_name,
            attempts
        );
        for _ in 0..self.retry_limit {
            attempts += 1;
            let key = self.wide_key(component_name);
            if !is_taken(&key) {
                return Ok(key);
            }
        }

        Err(ComponentError::KeySpaceExhausted {
            component_name: component_name.to_string(),
            attempts,
        })
    }

    fn narrow_key(&mut self, component_name: &str) -> String {
        let suffix = self.rng.gen_range(0..self.suffix_space);
        format!("{}_{}_{}", KEY_PREFIX, component_name, suffix)
    }

    fn wide_key(&mut self, component_name: &str) -> String {
        let suffix: u64 = self.rng.gen();
        format!("{}_{}_{:016x}", KEY_PREFIX, component_name, suffix)
    }
}

/// Table of live components keyed by their unique key.
pub struct ComponentRegistry {
    components: IndexMap<String, Shared<Component>>,
    keys: KeyGenerator,
}

impl ComponentRegistry {
    pub fn new(settings: &KeySettings) -> Self {
        Self {
            components: IndexMap::new(),
            keys: KeyGenerator::new(settings),
        }
    }

    /// A key not used by any stored component.
    pub fn generate_unique_key(
        &mut self,
        candidate: Option<&str>,
        component_name: &str,
    ) -> Result<String, ComponentError> {
        let components = &self.components;
        self.keys
            .unique_key(candidate, component_name, |key| components.contains_key(key))
    }

    /// Store a component, returning the shared handle.
    pub fn insert(&mut self, key: String, component: Component) -> Shared<Component> {
        let component = shared(component);
        self.components.insert(key, component.clone());
        component
    }

    pub fn get(&self, key: &str) -> Option<Shared<Component>> {
        self.components.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.components.contains_key(key)
    }

    /// Keys in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.components.keys().cloned().collect()
    }

    /// Keys of every component called `component_name`, in registration order.
    pub fn keys_by_name(&self, component_name: &str) -> Vec<String> {
        self.components
            .iter()
            .filter(|(_, component)| component.borrow().component_name() == component_name)
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Shared<Component>)> {
        self.components.iter()
    }

    /// Drop a component, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Shared<Component>> {
        self.components.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
