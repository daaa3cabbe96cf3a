//! Error handling for Busweave
//!
//! Provides error types for every layer of the engine:
//! - Bus errors (registration, subscription order, fan-out)
//! - State errors (malformed commits, reserved fields)
//! - Component errors (configuration, lookup, lifecycle, collaborators)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Notification bus error type
///
/// Covers bus registration, subscription wiring, and notification fan-out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// A bus was registered without an id
    #[error("Failed to register bus: id not provided")]
    MissingId,

    /// A bus with the same id is already registered
    #[error("Failed to register bus: id '{id}' already exists")]
    DuplicateId {
        /// The colliding bus id.
        id: String,
    },

    /// No bus is registered under the requested id
    #[error("Bus '{id}' not found")]
    NotFound {
        /// The bus id that did not resolve.
        id: String,
    },

    /// A subscription named a publisher that has no slot on the bus
    #[error("Bus '{bus}': publisher '{publisher}' is not registered")]
    PublisherNotRegistered {
        /// The bus the subscription was attempted on.
        bus: String,
        /// The publisher key without a slot.
        publisher: String,
    },

    /// A subscriber key did not resolve to a live component
    #[error("Bus '{bus}': subscriber '{subscriber}' not found")]
    SubscriberNotFound {
        /// The bus delivering the notification.
        bus: String,
        /// The subscriber key that did not resolve.
        subscriber: String,
    },

    /// Nested fan-out went deeper than the configured limit
    #[error("Notification from '{publisher}' dropped: depth {depth} exceeds limit {limit}")]
    DepthExceeded {
        /// The publisher whose notification was dropped.
        publisher: String,
        /// The depth that was reached.
        depth: usize,
        /// The configured limit.
        limit: usize,
    },
}

/// Component state error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A proposed state was not a structured object
    #[error("State must be an object, got {kind}")]
    NotAnObject {
        /// The JSON kind that was supplied instead.
        kind: String,
    },

    /// A reserved field holds a value of the wrong type
    #[error("Reserved field '{field}' must be {expected}")]
    ReservedFieldType {
        /// The reserved field name.
        field: String,
        /// A description of the expected type.
        expected: String,
    },

    /// A commit tried to rewrite a field the engine owns
    #[error("Reserved field '{field}' is managed by the engine and cannot be committed")]
    ReservedField {
        /// The reserved field name.
        field: String,
    },
}

/// Component error type
///
/// Represents configuration errors, lookup misses and lifecycle
/// violations raised while creating, wiring or driving components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The configuration did not name the component
    #[error("Component not registered: componentName not specified")]
    MissingComponentName,

    /// No component is registered under the key
    #[error("Component '{key}' not found")]
    NotFound {
        /// The key that did not resolve.
        key: String,
    },

    /// Key generation gave up without finding a free key
    #[error("Could not generate a unique key for '{component_name}' after {attempts} attempts")]
    KeySpaceExhausted {
        /// The component name used as the key prefix.
        component_name: String,
        /// The number of candidates tried.
        attempts: u32,
    },

    /// A lifecycle transition was requested from the wrong phase
    #[error("Component '{key}' cannot {transition} while {phase}")]
    InvalidTransition {
        /// The component key.
        key: String,
        /// The transition that was requested.
        transition: String,
        /// The phase the component was in.
        phase: String,
    },

    /// The component has no template to render
    #[error("Component '{key}' has no template")]
    MissingTemplate {
        /// The component key.
        key: String,
    },

    /// An external collaborator (renderer, listener binder) failed
    #[error("Collaborator error: {reason}")]
    Collaborator {
        /// The reason reported by the collaborator.
        reason: String,
    },
}

/// Main error type for Busweave
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Bus error
    #[error(transparent)]
    Bus(#[from] BusError),

    /// State error
    #[error(transparent)]
    State(#[from] StateError),

    /// Component error
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a bus error
    pub fn is_bus_error(&self) -> bool {
        matches!(self, Error::Bus(_))
    }

    /// Check if this is a component error
    pub fn is_component_error(&self) -> bool {
        matches!(self, Error::Component(_))
    }

    /// Check if this error is a lookup miss (bus, subscriber or component)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Bus(BusError::NotFound { .. })
                | Error::Bus(BusError::SubscriberNotFound { .. })
                | Error::Component(ComponentError::NotFound { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
