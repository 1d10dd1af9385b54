//! Engine configuration
//!
//! Loaded from a JSON file, then overridden by `SOUNDSLOT_*` environment
//! variables. Every field has a default, so an empty object is a valid file.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SoundError};

pub const ENV_BACKEND: &str = "SOUNDSLOT_BACKEND";
pub const ENV_CAPACITY: &str = "SOUNDSLOT_CAPACITY";
pub const ENV_LOG: &str = "SOUNDSLOT_LOG";

/// Upper bound for `initialCapacity`; the registry grows past it on demand
pub const MAX_INITIAL_CAPACITY: usize = 1 << 16;

/// Which backend the host layer should construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Timing only, no output device
    #[default]
    Headless,
    /// Default output device through rodio (requires the `rodio` feature)
    Rodio,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Headless => write!(f, "headless"),
            BackendKind::Rodio => write!(f, "rodio"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = SoundError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "headless" => Ok(BackendKind::Headless),
            "rodio" => Ok(BackendKind::Rodio),
            other => Err(SoundError::Config {
                reason: format!("unknown backend '{}' (expected headless or rodio)", other),
            }),
        }
    }
}

/// Registry and host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub backend: BackendKind,
    /// Slots reserved up front
    pub initial_capacity: usize,
    /// `env_logger` filter used by the CLI
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            initial_capacity: 16,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SoundError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    /// Apply `SOUNDSLOT_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment, in production)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(backend) = lookup(ENV_BACKEND) {
            self.backend = backend.parse()?;
        }
        if let Some(capacity) = lookup(ENV_CAPACITY) {
            self.initial_capacity = capacity.trim().parse().map_err(|_| SoundError::Config {
                reason: format!(
                    "{} must be a non-negative integer, got '{}'",
                    ENV_CAPACITY, capacity
                ),
            })?;
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.log_level = level;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(SoundError::Config {
                reason: format!(
                    "initial capacity {} exceeds the maximum of {}",
                    self.initial_capacity, MAX_INITIAL_CAPACITY
                ),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.backend, BackendKind::Headless);
        assert_eq!(config.initial_capacity, 16);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"backend": "rodio"}"#).unwrap();
        assert_eq!(config.backend, BackendKind::Rodio);
        assert_eq!(config.initial_capacity, 16);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("soundslot.json");
        std::fs::write(&path, r#"{"initialCapacity": 4, "logLevel": "debug"}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.initial_capacity, 4);
        assert_eq!(config.log_level, "debug");

        let missing = EngineConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert_eq!(missing.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::default()
            .with_overrides(lookup(&[(ENV_BACKEND, "Rodio"), (ENV_CAPACITY, " 32 ")]))
            .unwrap();
        assert_eq!(config.backend, BackendKind::Rodio);
        assert_eq!(config.initial_capacity, 32);
    }

    #[test]
    fn test_bad_overrides() {
        let err = EngineConfig::default()
            .with_overrides(lookup(&[(ENV_BACKEND, "alsa")]))
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");

        let err = EngineConfig::default()
            .with_overrides(lookup(&[(ENV_CAPACITY, "-1")]))
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_capacity_bound() {
        let at_limit = MAX_INITIAL_CAPACITY.to_string();
        let config = EngineConfig::default()
            .with_overrides(lookup(&[(ENV_CAPACITY, at_limit.as_str())]))
            .unwrap();
        assert_eq!(config.initial_capacity, MAX_INITIAL_CAPACITY);

        let err = EngineConfig::default()
            .with_overrides(lookup(&[(ENV_CAPACITY, "1000000000000")]))
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");

        let err = EngineConfig::from_json(r#"{"initialCapacity": 1000000000000}"#).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
