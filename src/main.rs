//! Busweave demo: a shopping cart whose total listens to its line items.
//!
//! Usage: `busweave [settings.json|settings.toml]`

use busweave::{init_logging, CommitOutcome, ComponentConfig, Engine, EngineSettings, Hook};
use busweave_core::{state_map, StateMap};
use serde_json::{json, Value};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let settings = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => EngineSettings::load_from_file(&path)?,
        None => EngineSettings::default(),
    };
    init_logging(&settings.logging)?;

    tracing::info!(
        "Busweave {} (built {})",
        busweave::VERSION,
        busweave::BUILD_DATE
    );

    let engine = Engine::new(settings);
    engine.register_bus("cart", StateMap::new())?;

    let total = engine.register(
        ComponentConfig::new("cart_total")
            .on_bus("cart")
            .with_state(state_map([("total", json!(0))]))
            .on_notification(|handle, note| {
                let Some(subtotal) = note.delta.get("subtotal").and_then(Value::as_f64) else {
                    return;
                };
                let current = handle.field("total").and_then(|v| v.as_f64()).unwrap_or(0.0);
                if let Err(e) = handle.commit(json!({"total": current + subtotal})) {
                    tracing::error!("Could not update total: {}", e);
                }
            })
            .hook(Hook::AfterUpdate, |handle, delta| {
                tracing::info!("{} updated: {:?}", handle.key(), delta);
            }),
    )?;

    let mut lines = Vec::new();
    for (sku, price) in [("A1", 2.5), ("B7", 4.0)] {
        let key = engine.register(
            ComponentConfig::new("line_item")
                .on_bus("cart")
                .with_state(state_map([("sku", json!(sku)), ("price", json!(price))])),
        )?;
        lines.push((key, price));
    }

    for (key, price) in &lines {
        let outcome = engine.commit(key, &json!({"quantity": 2, "subtotal": price * 2.0}))?;
        if let CommitOutcome::Applied { notified: Some(Ok(report)), .. } = outcome {
            tracing::info!("{} notified {:?}", key, report.delivered);
        }
    }

    tracing::info!(
        "Cart total: {}",
        engine.field(&total, "total").unwrap_or(serde_json::Value::Null)
    );
    Ok(())
}
