use busweave_component::{
    ComponentConfig, ComponentHandle, Engine, ListenerBinder, ListenerConfig, NodeHandle,
    Selector, TemplateRenderer,
};
use busweave_core::{ComponentError, Error};
use busweave_settings::EngineSettings;
use serde_json::{json, Value};

use crate::support::{entries, log, Log};

struct FakeRenderer {
    rendered: Log,
}

impl TemplateRenderer for FakeRenderer {
    fn render(&self, template: &str, component_key: &str) -> Result<NodeHandle, ComponentError> {
        self.rendered.borrow_mut().push(template.to_string());
        Ok(NodeHandle::new(component_key))
    }
}

/// Binds listeners on the component's own node and rejects selectors.
struct FakeBinder {
    attached: Log,
}

impl ListenerBinder for FakeBinder {
    fn attach(
        &self,
        node: &NodeHandle,
        component_key: &str,
        listener: &ListenerConfig,
    ) -> Result<(), ComponentError> {
        assert_eq!(node.component_key(), component_key);
        match &listener.selector {
            Selector::Node => {
                self.attached
                    .borrow_mut()
                    .push(format!("{}:{}", listener.name, listener.event));
                Ok(())
            }
            Selector::Css(selector) => Err(ComponentError::Collaborator {
                reason: format!("no element matches '{selector}'"),
            }),
        }
    }
}

fn click_counter(handle: &ComponentHandle<'_>, _event: &Value) {
    let clicks = handle.field("clicks").and_then(|v| v.as_u64()).unwrap_or(0);
    handle.commit(json!({"clicks": clicks + 1})).unwrap();
}

fn button() -> ComponentConfig {
    ComponentConfig::new("button")
        .with_template("#button-template")
        .listener(ListenerConfig::new("press", "click", Selector::Node, click_counter))
        .listener(ListenerConfig::new(
            "hover",
            "mouseover",
            Selector::parse(".icon"),
            |_, _| {},
        ))
}

#[test]
fn test_register_binds_listeners() {
    let rendered = log();
    let attached = log();
    let engine = Engine::new(EngineSettings::seeded(1))
        .with_renderer(FakeRenderer {
            rendered: rendered.clone(),
        })
        .with_listener_binder(FakeBinder {
            attached: attached.clone(),
        });

    let key = engine.register(button()).unwrap();

    assert_eq!(entries(&rendered), vec!["#button-template"]);
    assert_eq!(entries(&attached), vec!["press:click"]);
    assert_eq!(engine.field(&key, "eventListenersExist"), Some(json!(true)));
    assert_eq!(engine.node(&key).unwrap().component_key(), key);

    assert!(engine.dispatch_event(&key, "press", &json!({"x": 1})).unwrap());
    assert!(engine.dispatch_event(&key, "press", &json!({"x": 2})).unwrap());
    assert_eq!(engine.field(&key, "clicks"), Some(json!(2)));

    assert!(!engine.dispatch_event(&key, "scroll", &Value::Null).unwrap());
}

#[test]
fn test_existing_node_is_reused() {
    let rendered = log();
    let engine = Engine::default()
        .with_renderer(FakeRenderer {
            rendered: rendered.clone(),
        })
        .with_listener_binder(FakeBinder { attached: log() });

    let key = engine.instantiate(button()).unwrap();
    engine.create_node(&key).unwrap();
    assert_eq!(engine.bind_listeners(&key).unwrap(), 1);
    assert_eq!(entries(&rendered).len(), 1);
}

#[test]
fn test_no_binder_leaves_listeners_unbound() {
    let engine = Engine::default();
    let key = engine.register(button()).unwrap();
    assert_eq!(engine.field(&key, "eventListenersExist"), None);
    assert!(engine.node(&key).is_none());
}

#[test]
fn test_create_node_errors() {
    let engine = Engine::default();
    let bare = engine.instantiate(ComponentConfig::new("bare")).unwrap();
    assert!(matches!(
        engine.create_node(&bare),
        Err(Error::Component(ComponentError::MissingTemplate { .. }))
    ));

    let templated = engine.instantiate(button()).unwrap();
    assert!(matches!(
        engine.create_node(&templated),
        Err(Error::Component(ComponentError::Collaborator { .. }))
    ));
}
