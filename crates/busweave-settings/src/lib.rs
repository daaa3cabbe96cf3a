//! Busweave Settings Crate
//!
//! Handles engine configuration: file loading and saving, defaults, and
//! validation.

pub mod config;
pub mod error;

pub use config::{EngineSettings, KeySettings, LogFormat, LoggingSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
