//! # Event Bus Module
//!
//! Named notification buses and the registry that owns them.
//!
//! ## Overview
//!
//! Each bus keeps a publisher → subscriber adjacency map of component keys:
//! - A component must be registered as a publisher before anyone can
//!   subscribe to it on that bus
//! - Subscriber lists are de-duplicated and keep insertion order
//! - Fan-out resolves keys through a [`ComponentDirectory`] and skips
//!   keys that no longer resolve
//!
//! ## Usage
//!
//! ```rust,ignore
//! use busweave_core::event_bus::BusRegistry;
//!
//! let mut buses = BusRegistry::new();
//! let bus = buses.register("cart", Default::default())?;
//! bus.register_publisher("cart_total");
//! bus.register_publisher("line_item_1");
//! bus.add_subscribers("line_item_1", "cart_total")?;
//!
//! let report = bus.notify(&directory, "line_item_1", &delta);
//! ```

mod bus;
mod registry;

pub use bus::*;
pub use registry::*;
