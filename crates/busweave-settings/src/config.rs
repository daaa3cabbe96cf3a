//! Engine settings.
//!
//! Settings are organized into sections:
//! - Engine behaviour (default bus, notification depth bound, debug tracing)
//! - Key generation (seed, suffix space, retry limit)
//! - Logging (level, output format)
//!
//! Every field has a default, so a settings file only needs to name what
//! it overrides. Files are JSON or TOML, chosen by extension.

use busweave_core::constants::{
    DEFAULT_BUS_ID, DEFAULT_KEY_RETRY_LIMIT, DEFAULT_KEY_SUFFIX_SPACE, DEFAULT_MAX_NOTIFY_DEPTH,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level directive, overridden by `RUST_LOG`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Component key generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    /// Seed for the key RNG; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Generated keys use a random suffix in `0..suffix_space`
    pub suffix_space: u32,
    /// Candidates tried in each key space before giving up
    pub retry_limit: u32,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            seed: None,
            suffix_space: DEFAULT_KEY_SUFFIX_SPACE,
            retry_limit: DEFAULT_KEY_RETRY_LIMIT,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Bus registered when an engine starts
    pub default_bus: Option<String>,
    /// Maximum nesting of notification fan-out
    pub max_notify_depth: usize,
    /// Trace every hook invocation on every component
    pub debug: bool,
    /// Key generation
    pub keys: KeySettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_bus: Some(DEFAULT_BUS_ID.to_string()),
            max_notify_depth: DEFAULT_MAX_NOTIFY_DEPTH,
            debug: false,
            keys: KeySettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings with a fixed key seed, for reproducible key generation.
    pub fn seeded(seed: u64) -> Self {
        let mut settings = Self::default();
        settings.keys.seed = Some(seed);
        settings
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let settings: Self = match Self::format_of(path)? {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Self::format_of(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        if let Some(bus) = &self.default_bus {
            if bus.trim().is_empty() {
                return Err(SettingsError::InvalidSetting {
                    key: "default_bus".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        if self.max_notify_depth == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "max_notify_depth".to_string(),
                value: self.max_notify_depth.to_string(),
            }
            .into());
        }

        if self.keys.suffix_space == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "keys.suffix_space".to_string(),
                value: self.keys.suffix_space.to_string(),
            }
            .into());
        }

        if self.keys.retry_limit == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "keys.retry_limit".to_string(),
                value: self.keys.retry_limit.to_string(),
            }
            .into());
        }

        if self.logging.level.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "logging.level".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    fn format_of(path: &Path) -> SettingsResult<FileFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(FileFormat::Json),
            Some("toml") => Ok(FileFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("none").to_string()).into()),
        }
    }
}

enum FileFormat {
    Json,
    Toml,
}
