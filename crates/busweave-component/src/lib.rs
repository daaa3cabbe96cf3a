//! Busweave Component Crate
//!
//! The component model on top of `busweave-core`:
//! - Lifecycle hooks and named method tables
//! - Component configuration and instances
//! - The registry and key generation
//! - The [`Engine`] context tying buses and components together
//! - Seams to the template renderer and listener binder
//!
//! ```rust,ignore
//! use busweave_component::{ComponentConfig, Engine};
//!
//! let engine = Engine::default();
//! engine.register_bus("cart", Default::default())?;
//! let line = engine.register(ComponentConfig::new("line_item").on_bus("cart"))?;
//! let total = engine.register(
//!     ComponentConfig::new("cart_total")
//!         .on_bus("cart")
//!         .on_notification(|handle, note| {
//!             tracing::info!("{} saw {:?} from {}", handle.key(), note.delta, note.publisher);
//!         }),
//! )?;
//! engine.commit(&line, &json!({"quantity": 2}))?;
//! ```

pub mod collaborators;
pub mod component;
pub mod config;
pub mod engine;
pub mod handle;
pub mod hooks;
pub mod lifecycle;
pub mod registry;
pub mod wiring;

pub use collaborators::{ListenerBinder, NodeHandle, TemplateRenderer};
pub use component::{Component, LifecyclePhase};
pub use config::{ComponentConfig, ListenerConfig, Selector, SubscriptionPlan};
pub use engine::Engine;
pub use handle::{ComponentHandle, Notification};
pub use hooks::{Hook, HookFn, HookTable, ListenerFn, MethodFn, MethodKind, MethodTable, NotifyHandler};
pub use lifecycle::{CommitOptions, CommitOutcome};
pub use registry::{ComponentRegistry, KeyGenerator};
pub use wiring::SubscriptionReport;
