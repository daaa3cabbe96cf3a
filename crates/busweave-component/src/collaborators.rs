//! Seams to the presentation layer.
//!
//! The engine never touches a document directly. Turning a template into
//! a node and attaching event listeners to it are delegated to the two
//! traits here, supplied by whoever embeds the engine.

use busweave_core::ComponentError;
use uuid::Uuid;

use crate::config::ListenerConfig;

/// Opaque reference to a rendered node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    id: Uuid,
    component_key: String,
}

impl NodeHandle {
    /// A fresh handle for a node rendered for `component_key`.
    pub fn new(component_key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            component_key: component_key.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The component the node belongs to.
    pub fn component_key(&self) -> &str {
        &self.component_key
    }
}

/// Renders a component template into a node.
pub trait TemplateRenderer {
    /// Produce a node for `template`, tagged with the component key.
    fn render(&self, template: &str, component_key: &str) -> Result<NodeHandle, ComponentError>;
}

/// Attaches declared event listeners to a rendered node.
pub trait ListenerBinder {
    /// Attach one listener. The binder arranges for the host to call
    /// [`Engine::dispatch_event`](crate::Engine::dispatch_event) with the
    /// listener's name when the event fires.
    fn attach(
        &self,
        node: &NodeHandle,
        component_key: &str,
        listener: &ListenerConfig,
    ) -> Result<(), ComponentError>;
}
