use busweave_component::{CommitOutcome, ComponentConfig, Engine, MethodKind};
use busweave_core::{state_map, BusError, StateMap};
use busweave_settings::EngineSettings;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::support::{engine_with_bus, entries, log, recorder, Log};

/// A publisher on `orders` with three subscribers wired in order.
fn fan_out(engine: &Engine, notes: &Log) -> (String, Vec<String>) {
    let publisher = engine
        .instantiate(ComponentConfig::new("order").on_bus("orders"))
        .unwrap();
    let subscribers = ["s1", "s2", "s3"]
        .into_iter()
        .map(|name| {
            engine
                .instantiate(
                    ComponentConfig::new(name)
                        .with_key(name)
                        .subscribe("orders", &[publisher.as_str()])
                        .on_notification(recorder(notes)),
                )
                .unwrap()
        })
        .collect();
    (publisher, subscribers)
}

#[test]
fn test_fan_out_order() {
    let engine = engine_with_bus("orders");
    let notes = log();
    let (publisher, subscribers) = fan_out(&engine, &notes);
    assert_eq!(
        engine.subscribers("orders", &publisher).unwrap(),
        subscribers
    );

    engine.commit(&publisher, &json!({"total": 5})).unwrap();
    assert_eq!(
        entries(&notes),
        vec![
            format!("s1<-{publisher}@orders"),
            format!("s2<-{publisher}@orders"),
            format!("s3<-{publisher}@orders"),
        ]
    );
}

#[test]
fn test_dispatch_update_receives_notifications() {
    let engine = engine_with_bus("orders");
    let publisher = engine
        .instantiate(ComponentConfig::new("order").on_bus("orders"))
        .unwrap();
    let seen: Rc<RefCell<Vec<Value>>> = Rc::default();
    let sink = seen.clone();
    let subscriber = engine
        .instantiate(
            ComponentConfig::new("total")
                .subscribe("orders", &[publisher.as_str()])
                .method(MethodKind::Dispatch, "update", move |_, args| {
                    sink.borrow_mut().push(args);
                    Value::Null
                }),
        )
        .unwrap();

    let outcome = engine.commit(&publisher, &json!({"total": 5})).unwrap();

    assert_eq!(outcome.report().unwrap().delivered, vec![subscriber]);
    assert_eq!(
        *seen.borrow(),
        vec![json!({
            "publisher": publisher,
            "delta": {"total": 5},
            "busId": "orders",
        })]
    );
}

#[test]
fn test_notification_handler_takes_precedence_over_dispatch() {
    let engine = engine_with_bus("orders");
    let notes = log();
    let publisher = engine
        .instantiate(ComponentConfig::new("order").on_bus("orders"))
        .unwrap();
    let dispatched = Rc::new(Cell::new(0));
    let counter = dispatched.clone();
    engine
        .instantiate(
            ComponentConfig::new("total")
                .with_key("total")
                .subscribe("orders", &[publisher.as_str()])
                .on_notification(recorder(&notes))
                .method(MethodKind::Dispatch, "update", move |_, _| {
                    counter.set(counter.get() + 1);
                    Value::Null
                }),
        )
        .unwrap();

    engine.commit(&publisher, &json!({"total": 5})).unwrap();

    assert_eq!(entries(&notes), vec![format!("total<-{publisher}@orders")]);
    assert_eq!(dispatched.get(), 0);
}

#[test]
fn test_missing_subscriber_is_skipped() {
    let engine = engine_with_bus("orders");
    let notes = log();
    let (publisher, _) = fan_out(&engine, &notes);

    assert!(engine.remove_component("s2").is_some());
    let outcome = engine.commit(&publisher, &json!({"total": 5})).unwrap();

    assert_eq!(
        entries(&notes),
        vec![
            format!("s1<-{publisher}@orders"),
            format!("s3<-{publisher}@orders"),
        ]
    );
    let report = outcome.report().unwrap();
    assert_eq!(report.delivered, vec!["s1", "s3"]);
    assert_eq!(report.skipped, vec!["s2"]);
}

#[test]
fn test_subscriber_receives_effective_delta() {
    let engine = engine_with_bus("orders");
    let received: Rc<Cell<Option<usize>>> = Rc::new(Cell::new(None));
    let deltas: crate::support::Log = log();

    let publisher = engine
        .instantiate(
            ComponentConfig::new("order")
                .on_bus("orders")
                .with_state(state_map([("a", json!(1))])),
        )
        .unwrap();
    let sink = deltas.clone();
    let count = received.clone();
    engine
        .instantiate(ComponentConfig::new("sink").on_bus("orders").on_notification(
            move |_, note| {
                count.set(Some(count.get().unwrap_or(0) + 1));
                sink.borrow_mut()
                    .push(Value::Object(note.delta.clone()).to_string());
            },
        ))
        .unwrap();

    engine
        .commit(&publisher, &json!({"a": 1, "b": 2}))
        .unwrap();
    assert_eq!(received.get(), Some(1));
    assert_eq!(entries(&deltas), vec![r#"{"b":2}"#]);
}

#[test]
fn test_manual_notify() {
    let engine = engine_with_bus("orders");
    let notes = log();
    let (publisher, _) = fan_out(&engine, &notes);

    let report = engine
        .handle(&publisher)
        .unwrap()
        .notify_buses(&state_map([("ping", json!(true))]))
        .unwrap();
    assert_eq!(report.delivered.len(), 3);
    assert_eq!(entries(&notes).len(), 3);
}

#[test]
fn test_subscriber_without_handler_still_counts_as_delivered() {
    let engine = engine_with_bus("orders");
    let publisher = engine
        .instantiate(ComponentConfig::new("order").on_bus("orders"))
        .unwrap();
    let quiet = engine
        .instantiate(ComponentConfig::new("quiet").on_bus("orders"))
        .unwrap();

    let outcome = engine.commit(&publisher, &json!({"total": 1})).unwrap();
    assert_eq!(outcome.report().unwrap().delivered, vec![quiet]);
}

#[test]
fn test_notification_cycle_is_bounded() {
    let settings = EngineSettings {
        max_notify_depth: 8,
        ..EngineSettings::seeded(5)
    };
    let engine = Engine::new(settings);
    engine.register_bus("ring", StateMap::new()).unwrap();

    let calls = Rc::new(Cell::new(0usize));
    let dropped = Rc::new(Cell::new(0usize));
    let ping_pong = |name: &str| {
        let calls = calls.clone();
        let dropped = dropped.clone();
        ComponentConfig::new(name)
            .on_bus("ring")
            .on_notification(move |handle, note| {
                calls.set(calls.get() + 1);
                let hops = note.delta.get("hops").and_then(Value::as_u64).unwrap_or(0);
                let outcome = handle.commit(json!({"hops": hops + 1})).unwrap();
                if let CommitOutcome::Applied {
                    notified: Some(Err(BusError::DepthExceeded { .. })),
                    ..
                } = outcome
                {
                    dropped.set(dropped.get() + 1);
                }
            })
    };

    let a = engine.instantiate(ping_pong("a")).unwrap();
    engine.instantiate(ping_pong("b")).unwrap();

    let outcome = engine.commit(&a, &json!({"hops": 0})).unwrap();
    assert!(outcome.report().is_some());
    assert_eq!(calls.get(), 8);
    assert_eq!(dropped.get(), 1);
    assert_eq!(engine.notify_depth(), 0);
}
