use busweave_component::{CommitOutcome, ComponentConfig, Engine, Hook, LifecyclePhase};
use busweave_core::state_map;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

use crate::support::{engine_with_bus, entries, log, mark, recorder};

fn traced(name: &str, log: &crate::support::Log) -> ComponentConfig {
    let mut config = ComponentConfig::new(name);
    for hook in Hook::ALL {
        config = config.hook(hook, mark(log, hook.name()));
    }
    config
}

#[test]
fn test_hook_order_across_lifecycle() {
    let engine = Engine::default();
    let calls = log();

    let key = engine.instantiate(traced("counter", &calls)).unwrap();
    assert_eq!(entries(&calls), vec!["beforeCreate", "afterCreate"]);

    calls.borrow_mut().clear();
    assert!(engine.mount(&key).unwrap());
    assert_eq!(entries(&calls), vec!["beforeMount", "onMount", "afterMount"]);

    calls.borrow_mut().clear();
    engine.commit(&key, &json!({"count": 1})).unwrap();
    assert_eq!(entries(&calls), vec!["beforeUpdate", "onUpdate", "afterUpdate"]);
}

#[test]
fn test_phases() {
    let engine = Engine::default();
    let seen = Rc::new(Cell::new(None));
    let seen_in_hook = seen.clone();

    let key = engine
        .instantiate(
            ComponentConfig::new("counter").hook(Hook::OnUpdate, move |handle, _| {
                seen_in_hook.set(handle.phase());
            }),
        )
        .unwrap();
    assert_eq!(engine.phase(&key), Some(LifecyclePhase::Created));
    assert!(engine.component(&key).unwrap().borrow().is_first_render());

    engine.mount(&key).unwrap();
    assert_eq!(engine.phase(&key), Some(LifecyclePhase::Mounted));
    assert!(!engine.component(&key).unwrap().borrow().is_first_render());

    engine.commit(&key, &json!({"count": 1})).unwrap();
    assert_eq!(seen.get(), Some(LifecyclePhase::Updating));
    assert_eq!(engine.phase(&key), Some(LifecyclePhase::Mounted));
}

#[test]
fn test_mount_runs_once() {
    let engine = engine_with_bus("cart");
    let notes = log();
    let mounts = log();

    engine
        .instantiate(
            ComponentConfig::new("total")
                .on_bus("cart")
                .on_notification(recorder(&notes)),
        )
        .unwrap();
    let line = engine
        .instantiate(
            ComponentConfig::new("line")
                .on_bus("cart")
                .hook(Hook::AfterMount, mark(&mounts, "afterMount")),
        )
        .unwrap();

    assert!(engine.mount(&line).unwrap());
    assert!(!engine.mount(&line).unwrap());

    assert_eq!(entries(&mounts).len(), 1);
    assert_eq!(entries(&notes).len(), 1);
}

#[test]
fn test_mount_from_mount_hook_is_skipped() {
    let engine = Engine::default();
    let nested = Rc::new(Cell::new(None));
    let nested_in_hook = nested.clone();

    let key = engine
        .instantiate(
            ComponentConfig::new("widget").hook(Hook::OnMount, move |handle, _| {
                nested_in_hook.set(Some(handle.engine().mount(handle.key()).unwrap()));
            }),
        )
        .unwrap();

    assert!(engine.mount(&key).unwrap());
    assert_eq!(nested.get(), Some(false));
}

#[test]
fn test_mount_unknown_component() {
    let engine = Engine::default();
    assert!(engine.mount("ghost").unwrap_err().is_not_found());
}

#[test]
fn test_unintentional_change_is_ignored() {
    let engine = engine_with_bus("cart");
    let notes = log();
    let updates = log();

    engine
        .instantiate(
            ComponentConfig::new("total")
                .on_bus("cart")
                .on_notification(recorder(&notes)),
        )
        .unwrap();
    let line = engine
        .instantiate(
            ComponentConfig::new("line")
                .on_bus("cart")
                .with_state(state_map([("qty", json!(1)), ("sku", json!("A1"))]))
                .hook(Hook::BeforeUpdate, mark(&updates, "beforeUpdate")),
        )
        .unwrap();
    let before = engine.state(&line).unwrap();

    assert_eq!(engine.commit(&line, &json!({})).unwrap(), CommitOutcome::Unchanged);
    assert_eq!(
        engine.commit(&line, &json!({"qty": 1})).unwrap(),
        CommitOutcome::Unchanged
    );
    assert_eq!(
        engine.commit(&line, &json!("not an object")).unwrap(),
        CommitOutcome::Unchanged
    );

    assert_eq!(engine.state(&line).unwrap(), before);
    assert!(entries(&updates).is_empty());
    assert!(entries(&notes).is_empty());
}

#[test]
fn test_omitted_fields_survive_commit() {
    let engine = Engine::default();
    let key = engine
        .instantiate(
            ComponentConfig::new("line")
                .with_state(state_map([("qty", json!(1)), ("sku", json!("A1"))])),
        )
        .unwrap();

    engine.commit(&key, &json!({"qty": 3})).unwrap();
    assert_eq!(engine.field(&key, "qty"), Some(json!(3)));
    assert_eq!(engine.field(&key, "sku"), Some(json!("A1")));
}

#[test]
fn test_explicit_null_is_a_change() {
    let engine = Engine::default();
    let key = engine
        .instantiate(ComponentConfig::new("line").with_state(state_map([("note", json!("x"))])))
        .unwrap();

    let outcome = engine.commit(&key, &json!({"note": null})).unwrap();
    assert!(outcome.is_applied());
    assert_eq!(engine.field(&key, "note"), Some(json!(null)));
}

#[test]
fn test_update_hooks_receive_delta() {
    let engine = Engine::default();
    let seen = log();
    let seen_in_hook = seen.clone();

    let key = engine
        .instantiate(
            ComponentConfig::new("line")
                .with_state(state_map([("qty", json!(1)), ("sku", json!("A1"))]))
                .hook(Hook::AfterUpdate, move |_, delta| {
                    let mut fields: Vec<String> = delta.keys().cloned().collect();
                    fields.sort();
                    seen_in_hook.borrow_mut().extend(fields);
                }),
        )
        .unwrap();

    engine
        .commit(&key, &json!({"qty": 2, "sku": "A1", "price": 4}))
        .unwrap();
    assert_eq!(entries(&seen), vec!["price", "qty"]);
}

#[test]
fn test_engine_owned_fields_survive_caller_commits() {
    let engine = engine_with_bus("cart");
    let notes = log();
    let line = engine
        .register(ComponentConfig::new("line").on_bus("cart"))
        .unwrap();
    engine
        .register(
            ComponentConfig::new("total")
                .with_key("total")
                .subscribe("cart", &[line.as_str()])
                .on_notification(recorder(&notes)),
        )
        .unwrap();

    let handle = engine.handle(&line).unwrap();
    assert!(handle.commit(json!({"eventBus": ["cart", "cart", "ghost"]})).is_err());
    assert!(handle.commit(json!({"key": "someone_else"})).is_err());
    assert!(handle.commit(json!({"componentName": "renamed"})).is_err());
    assert_eq!(engine.field(&line, "eventBus"), Some(json!(["cart"])));
    assert_eq!(engine.field(&line, "key"), Some(json!(line.clone())));

    // echoing the full state back is still a normal commit
    let mut state = engine.state(&line).unwrap();
    state.insert("qty".to_string(), json!(1));
    let outcome = engine.commit(&line, &json!(state)).unwrap();
    assert_eq!(outcome.delta(), Some(&state_map([("qty", json!(1))])));
    assert_eq!(entries(&notes), vec![format!("total<-{line}@cart")]);
}
