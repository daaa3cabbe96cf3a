//! Notification bus implementation.
//!
//! A bus owns a publisher → subscriber adjacency map. It never holds
//! components: subscriber keys are resolved through a [`ComponentDirectory`]
//! at delivery time, so bus and component lifetimes stay independent.

use serde::Serialize;
use serde_json::Value;

use crate::constants::FIELD_BUS_ID;
use crate::error::BusError;
use crate::types::{Adjacency, KeySet, StateDelta, StateMap};

/// A single delivery from a bus to one subscriber.
#[derive(Debug, Clone, Copy)]
pub struct BusUpdate<'a> {
    /// The bus delivering the notification.
    pub bus_id: &'a str,
    /// The component whose state changed.
    pub publisher: &'a str,
    /// The component being told about it.
    pub subscriber: &'a str,
    /// What changed.
    pub delta: &'a StateDelta,
}

/// Resolves component keys on behalf of a bus.
///
/// Implemented by the component registry owner; a bus only ever sees keys.
pub trait ComponentDirectory {
    /// Handle type returned by lookups.
    type Handle;

    /// Resolve a key to a live component.
    fn lookup(&self, key: &str) -> Option<Self::Handle>;

    /// Keys of every registered component, in registration order.
    fn keys(&self) -> Vec<String>;

    /// Invoke the subscriber's update handler.
    ///
    /// Returns [`BusError::SubscriberNotFound`] when the key does not resolve.
    fn deliver(&self, update: BusUpdate<'_>) -> Result<(), BusError>;
}

/// Outcome of one notification fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotifyReport {
    /// Subscribers whose handler was invoked, in delivery order.
    pub delivered: Vec<String>,
    /// Subscribers that could not be resolved and were skipped.
    pub skipped: Vec<String>,
}

impl NotifyReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: NotifyReport) {
        self.delivered.extend(other.delivered);
        self.skipped.extend(other.skipped);
    }

    /// True when nothing was delivered or skipped.
    pub fn is_empty(&self) -> bool {
        self.delivered.is_empty() && self.skipped.is_empty()
    }
}

/// A snapshot of one publisher's subscribers, detached from the bus.
///
/// Delivering a notice does not borrow the bus, so handlers are free to
/// add subscriptions or register buses while fan-out is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    bus_id: String,
    publisher: String,
    subscribers: Vec<String>,
}

impl Notice {
    /// The bus this notice was taken from.
    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    /// The publisher being announced.
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Subscribers in the order they were added.
    pub fn subscribers(&self) -> &[String] {
        &self.subscribers
    }

    /// Deliver `delta` to every subscriber in order.
    ///
    /// A subscriber that does not resolve is logged and skipped; the rest
    /// of the fan-out continues.
    pub fn deliver<D>(&self, directory: &D, delta: &StateDelta) -> NotifyReport
    where
        D: ComponentDirectory + ?Sized,
    {
        tracing::debug!(
            "Bus '{}': dispatching notification from '{}' to {:?}",
            self.bus_id,
            self.publisher,
            self.subscribers
        );

        let mut report = NotifyReport::default();
        for subscriber in &self.subscribers {
            let update = BusUpdate {
                bus_id: &self.bus_id,
                publisher: &self.publisher,
                subscriber,
                delta,
            };
            match directory.deliver(update) {
                Ok(()) => report.delivered.push(subscriber.clone()),
                Err(err) => {
                    tracing::warn!("{}; skipping", err);
                    report.skipped.push(subscriber.clone());
                }
            }
        }
        report
    }
}

/// A named hub routing change notifications from publishers to subscribers.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    id: String,
    props: StateMap,
    state: StateMap,
    publishers: Adjacency,
}

impl NotificationBus {
    /// Create a bus with the given id and initial state.
    ///
    /// The id is written into the state under `id`.
    pub fn new(id: impl Into<String>, initial_state: StateMap) -> Self {
        let id = id.into();
        let mut state = initial_state;
        state.insert(FIELD_BUS_ID.to_string(), Value::String(id.clone()));
        Self {
            id,
            props: StateMap::new(),
            state,
            publishers: Adjacency::new(),
        }
    }

    /// Attach props to the bus.
    pub fn with_props(mut self, props: StateMap) -> Self {
        self.props = props;
        self
    }

    /// The bus id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The bus's own state (carries at least `id`).
    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// The bus's props.
    pub fn props(&self) -> &StateMap {
        &self.props
    }

    /// Ensure `key` has a subscriber list. Idempotent.
    pub fn register_publisher(&mut self, key: &str) {
        if !self.publishers.contains_key(key) {
            self.publishers.insert(key.to_string(), KeySet::new());
            tracing::debug!("Bus '{}': registered publisher '{}'", self.id, key);
        }
    }

    /// Whether `key` has a publisher slot on this bus.
    pub fn is_publisher(&self, key: &str) -> bool {
        self.publishers.contains_key(key)
    }

    /// Add `subscriber` to `publisher`'s list.
    ///
    /// Returns `Ok(true)` if the edge is new, `Ok(false)` if it already
    /// existed. Fails when `publisher` was never registered on this bus.
    pub fn add_subscribers(&mut self, publisher: &str, subscriber: &str) -> Result<bool, BusError> {
        let Some(subscribers) = self.publishers.get_mut(publisher) else {
            return Err(BusError::PublisherNotRegistered {
                bus: self.id.clone(),
                publisher: publisher.to_string(),
            });
        };

        let added = subscribers.insert(subscriber.to_string());
        if added {
            tracing::debug!(
                "Bus '{}': '{}' now listens to '{}'",
                self.id,
                subscriber,
                publisher
            );
        }
        Ok(added)
    }

    /// Subscribers of one publisher, in insertion order.
    pub fn subscribers(&self, publisher: &str) -> Option<&KeySet> {
        self.publishers.get(publisher)
    }

    /// Whether the edge `publisher → subscriber` exists.
    pub fn has_edge(&self, publisher: &str, subscriber: &str) -> bool {
        self.publishers
            .get(publisher)
            .is_some_and(|subs| subs.contains(subscriber))
    }

    /// The full adjacency map.
    pub fn publishers(&self) -> &Adjacency {
        &self.publishers
    }

    /// Publisher keys, in registration order.
    pub fn publisher_keys(&self) -> Vec<String> {
        self.publishers.keys().cloned().collect()
    }

    /// Snapshot `publisher`'s subscribers for delivery.
    ///
    /// A publisher without a slot yields an empty notice.
    pub fn notice(&self, publisher: &str) -> Notice {
        let subscribers = self
            .publishers
            .get(publisher)
            .map(|subs| subs.iter().cloned().collect())
            .unwrap_or_default();
        Notice {
            bus_id: self.id.clone(),
            publisher: publisher.to_string(),
            subscribers,
        }
    }

    /// Notify every subscriber of `publisher` with `delta`.
    pub fn notify<D>(&self, directory: &D, publisher: &str, delta: &StateDelta) -> NotifyReport
    where
        D: ComponentDirectory + ?Sized,
    {
        self.notice(publisher).deliver(directory, delta)
    }

    /// Resolve a component through the directory.
    pub fn component<D>(&self, directory: &D, key: &str) -> Option<D::Handle>
    where
        D: ComponentDirectory + ?Sized,
    {
        directory.lookup(key)
    }

    /// Keys of every component visible through the directory.
    pub fn all_components<D>(&self, directory: &D) -> Vec<String>
    where
        D: ComponentDirectory + ?Sized,
    {
        directory.keys()
    }

    /// Drop all adjacency data.
    pub fn clear(&mut self) {
        self.publishers.clear();
    }
}
