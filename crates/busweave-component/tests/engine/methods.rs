use busweave_component::{ComponentConfig, Engine, MethodKind};
use busweave_core::{state_map, StateMap};
use serde_json::{json, Value};

use crate::support::{entries, log, mark};

fn counter(engine: &Engine) -> String {
    engine
        .instantiate(
            ComponentConfig::new("counter")
                .with_state(state_map([("count", json!(0))]))
                .method(MethodKind::Get, "count", |handle, _| {
                    handle.field("count").unwrap_or(Value::Null)
                })
                .method(MethodKind::Commit, "add", |handle, args| {
                    let current = handle.field("count").and_then(|v| v.as_i64()).unwrap_or(0);
                    let step = args.as_i64().unwrap_or(1);
                    handle.commit(json!({"count": current + step})).unwrap();
                    json!(current + step)
                })
                .method(MethodKind::Dispatch, "reset", |handle, _| {
                    let current = handle.field("count").and_then(|v| v.as_i64()).unwrap_or(0);
                    handle
                        .call(MethodKind::Commit, "add", json!(-current))
                        .unwrap()
                        .unwrap_or(Value::Null)
                }),
        )
        .unwrap()
}

#[test]
fn test_named_methods() {
    let engine = Engine::default();
    let key = counter(&engine);

    assert_eq!(
        engine.call(&key, MethodKind::Commit, "add", json!(5)).unwrap(),
        Some(json!(5))
    );
    assert_eq!(
        engine.call(&key, MethodKind::Get, "count", Value::Null).unwrap(),
        Some(json!(5))
    );
    assert_eq!(
        engine.call(&key, MethodKind::Dispatch, "reset", Value::Null).unwrap(),
        Some(json!(0))
    );
    assert_eq!(engine.field(&key, "count"), Some(json!(0)));
}

#[test]
fn test_unknown_method_is_a_no_op() {
    let engine = Engine::default();
    let key = counter(&engine);

    assert_eq!(engine.call(&key, MethodKind::Get, "missing", Value::Null).unwrap(), None);
    // names are per kind
    assert_eq!(engine.call(&key, MethodKind::Dispatch, "count", Value::Null).unwrap(), None);
    assert_eq!(engine.field(&key, "count"), Some(json!(0)));
}

#[test]
fn test_custom_hooks() {
    let engine = Engine::default();
    let calls = log();
    let key = engine
        .instantiate(
            ComponentConfig::new("widget")
                .hook_named("onResize", mark(&calls, "onResize"))
                .hook_named("afterMount", mark(&calls, "afterMount")),
        )
        .unwrap();

    assert!(engine.run_custom_hook(&key, "onResize", &StateMap::new()).unwrap());
    assert!(!engine.run_custom_hook(&key, "onScroll", &StateMap::new()).unwrap());
    engine.mount(&key).unwrap();

    assert_eq!(entries(&calls), vec!["onResize", "afterMount"]);
}

#[test]
fn test_props_and_reference() {
    let engine = Engine::default();
    let key = engine
        .instantiate(
            ComponentConfig::new("badge")
                .with_props(state_map([("color", json!("red"))]))
                .with_reference("badge"),
        )
        .unwrap();

    engine
        .commit_props(&key, state_map([("color", json!("blue")), ("size", json!(2))]))
        .unwrap();
    let handle = engine.handle(&key).unwrap();
    assert_eq!(handle.prop("color"), Some(json!("blue")));
    assert_eq!(handle.props().len(), 2);
    assert_eq!(engine.reference(&key).as_deref(), Some("badge"));
}
