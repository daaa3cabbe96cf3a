//! Shared fixtures for the engine tests.

use busweave_component::{ComponentHandle, Engine, Notification};
use busweave_core::{shared, Shared, StateMap};
use busweave_settings::EngineSettings;

pub type Log = Shared<Vec<String>>;

pub fn log() -> Log {
    shared(Vec::new())
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// A seeded engine with `bus` registered next to the default bus.
pub fn engine_with_bus(bus: &str) -> Engine {
    let engine = Engine::new(EngineSettings::seeded(42));
    engine.register_bus(bus, StateMap::new()).unwrap();
    engine
}

/// Notification handler recording `subscriber<-publisher@bus`.
pub fn recorder(log: &Log) -> impl Fn(&ComponentHandle<'_>, &Notification<'_>) + 'static {
    let log = log.clone();
    move |handle: &ComponentHandle<'_>, note: &Notification<'_>| {
        log.borrow_mut()
            .push(format!("{}<-{}@{}", handle.key(), note.publisher, note.bus_id));
    }
}

/// Hook recording its own name.
pub fn mark(log: &Log, name: &str) -> impl Fn(&ComponentHandle<'_>, &StateMap) + 'static {
    let log = log.clone();
    let name = name.to_string();
    move |_: &ComponentHandle<'_>, _: &StateMap| log.borrow_mut().push(name.clone())
}
