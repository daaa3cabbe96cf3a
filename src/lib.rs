//! # Busweave
//!
//! A reactive component engine. Components hold state, publish on named
//! event buses, and tell their subscribers what changed:
//! - Structural diff-and-commit state with an unintentional-change guard
//! - Named buses with ordered, de-duplicated publisher → subscriber edges
//! - A fixed create → mount → update lifecycle with hook slots
//! - Bounded, re-entrant notification fan-out
//!
//! ## Architecture
//!
//! Busweave is organized as a workspace with multiple crates:
//!
//! 1. **busweave-core** - Errors, type aliases, buses, component state and diff
//! 2. **busweave-settings** - Engine settings, file loading and validation
//! 3. **busweave-component** - Hooks, configuration, lifecycle, registry, engine
//! 4. **busweave** - This crate: re-exports, logging setup and a demo binary

pub use busweave_core::{
    constants, BusError, BusRegistry, ComponentError, ComponentState, DiffEntry, Error,
    NotificationBus, NotifyReport, Result, StateDelta, StateDiff, StateError, StateMap,
};

pub use busweave_settings::{
    ConfigError, EngineSettings, KeySettings, LogFormat, LoggingSettings, SettingsError,
};

pub use busweave_component::{
    CommitOptions, CommitOutcome, Component, ComponentConfig, ComponentHandle, Engine, Hook,
    LifecyclePhase, ListenerBinder, ListenerConfig, MethodKind, NodeHandle, Notification,
    Selector, SubscriptionPlan, SubscriptionReport, TemplateRenderer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging from settings
///
/// Sets up structured logging with:
/// - `RUST_LOG` environment variable support, falling back to the
///   configured level
/// - Pretty console output or one JSON object per event
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("").add_directive(settings.level.parse()?),
    };

    match settings.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .pretty();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .json();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
