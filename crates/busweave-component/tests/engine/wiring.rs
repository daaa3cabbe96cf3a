use busweave_component::{ComponentConfig, Engine, SubscriptionPlan};
use busweave_core::constants::DEFAULT_BUS_ID;
use busweave_core::{state_map, BusError, ComponentError, Error, StateMap};
use serde_json::json;

use crate::support::engine_with_bus;

#[test]
fn test_subscription_is_symmetric() {
    let engine = engine_with_bus("busX");
    let publisher = engine
        .instantiate(ComponentConfig::new("p").on_bus("busX"))
        .unwrap();
    let subscriber = engine.instantiate(ComponentConfig::new("s")).unwrap();

    let mut plan = SubscriptionPlan::new();
    plan.insert("busX".to_string(), vec![publisher.clone()]);
    let report = engine.wire_subscriptions(&subscriber, &plan).unwrap();

    assert_eq!(report.added, 2);
    assert!(report.rejected.is_empty());
    let buses = engine.buses();
    let bus = buses.get("busX").unwrap();
    assert!(bus.has_edge(&publisher, &subscriber));
    assert!(bus.has_edge(&subscriber, &publisher));
}

#[test]
fn test_wiring_attaches_subscriber_to_bus() {
    let engine = engine_with_bus("busX");
    let publisher = engine
        .instantiate(ComponentConfig::new("p").on_bus("busX"))
        .unwrap();
    let subscriber = engine
        .instantiate(ComponentConfig::new("s").subscribe("busX", &[publisher.as_str()]))
        .unwrap();

    assert!(engine.buses().get("busX").unwrap().is_publisher(&subscriber));
    assert_eq!(engine.field(&subscriber, "eventBus"), Some(json!(["busX"])));
}

#[test]
fn test_initial_state_event_bus_attaches() {
    let engine = engine_with_bus("busX");
    let key = engine
        .instantiate(
            ComponentConfig::new("p")
                .with_state(state_map([("eventBus", json!(["busX"])), ("qty", json!(0))])),
        )
        .unwrap();

    assert!(engine.buses().get("busX").unwrap().is_publisher(&key));
    assert_eq!(engine.field(&key, "eventBus"), Some(json!(["busX"])));
    assert_eq!(engine.field(&key, "qty"), Some(json!(0)));
}

#[test]
fn test_auto_subscribes_to_every_other_publisher() {
    let engine = engine_with_bus("cart");
    let a = engine.instantiate(ComponentConfig::new("a").on_bus("cart")).unwrap();
    let b = engine.instantiate(ComponentConfig::new("b").on_bus("cart")).unwrap();
    let c = engine.instantiate(ComponentConfig::new("c").on_bus("cart")).unwrap();

    assert_eq!(engine.subscribers("cart", &a).unwrap(), vec![b.clone(), c.clone()]);
    assert_eq!(engine.subscribers("cart", &b).unwrap(), vec![a.clone(), c.clone()]);
    assert_eq!(engine.subscribers("cart", &c).unwrap(), vec![a, b]);
}

#[test]
fn test_explicit_plan_disables_auto_subscription() {
    let engine = engine_with_bus("cart");
    let a = engine.instantiate(ComponentConfig::new("a").on_bus("cart")).unwrap();
    let b = engine.instantiate(ComponentConfig::new("b").on_bus("cart")).unwrap();
    let c = engine
        .instantiate(
            ComponentConfig::new("c")
                .on_bus("cart")
                .subscribe("cart", &[a.as_str()]),
        )
        .unwrap();

    let buses = engine.buses();
    let bus = buses.get("cart").unwrap();
    assert!(bus.has_edge(&a, &c));
    assert!(!bus.has_edge(&b, &c));
    assert!(!bus.has_edge(&c, &b));
}

#[test]
fn test_undeclared_bus_stores_nothing() {
    let engine = Engine::default();
    let err = engine
        .instantiate(ComponentConfig::new("cart").on_bus("nowhere"))
        .unwrap_err();
    assert!(matches!(err, Error::Bus(BusError::NotFound { ref id }) if id == "nowhere"));
    assert!(engine.components().is_empty());

    let err = engine
        .instantiate(ComponentConfig::new("cart").subscribe("nowhere", &["x"]))
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(engine.components().is_empty());
}

#[test]
fn test_missing_component_name() {
    let engine = Engine::default();
    let err = engine.instantiate(ComponentConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::Component(ComponentError::MissingComponentName)
    ));
}

#[test]
fn test_duplicate_bus_keeps_first() {
    let engine = Engine::default();
    engine
        .register_bus("cart", StateMap::from_iter([("owner".to_string(), json!("first"))]))
        .unwrap();
    let err = engine
        .register_bus("cart", StateMap::from_iter([("owner".to_string(), json!("second"))]))
        .unwrap_err();

    assert!(matches!(err, Error::Bus(BusError::DuplicateId { .. })));
    assert_eq!(engine.buses().len(), 2);
    assert_eq!(engine.buses().get("cart").unwrap().state()["owner"], json!("first"));
}

#[test]
fn test_delete_bus_detaches_components() {
    let engine = engine_with_bus("cart");
    let key = engine
        .instantiate(ComponentConfig::new("line").on_bus(DEFAULT_BUS_ID).on_bus("cart"))
        .unwrap();

    engine.delete_bus("cart").unwrap();
    assert!(!engine.buses().contains("cart"));
    assert_eq!(engine.field(&key, "eventBus"), Some(json!([DEFAULT_BUS_ID])));

    // notifying after deletion only reaches the remaining bus
    let outcome = engine.commit(&key, &json!({"qty": 1})).unwrap();
    assert!(outcome.report().unwrap().is_empty());

    assert!(engine.delete_bus("cart").unwrap_err().is_not_found());
}

#[test]
fn test_lookup_by_name() {
    let engine = Engine::default();
    let first = engine.instantiate(ComponentConfig::new("row")).unwrap();
    engine.instantiate(ComponentConfig::new("header")).unwrap();
    let second = engine.instantiate(ComponentConfig::new("row")).unwrap();

    assert_eq!(engine.components_by_name("row"), vec![first.clone(), second]);
    assert_eq!(engine.component_by_name("row"), Some(first));
    assert_eq!(engine.component_by_name("footer"), None);
}
