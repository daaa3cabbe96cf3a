//! # Busweave Core
//!
//! Core types for Busweave.
//! Provides the notification bus and its registry, the structural state
//! diff, and the error taxonomy shared by every crate.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod state;
pub mod types;

pub use error::{BusError, ComponentError, Error, Result, StateError};

pub use event_bus::{
    BusRegistry, BusUpdate, ComponentDirectory, Notice, NotificationBus, NotifyReport,
};

pub use state::{ComponentState, DiffEntry, StateComparison, StateDiff};

pub use types::{
    shared, state_map, value_kind, Adjacency, KeySet, Shared, StateDelta, StateMap,
};
