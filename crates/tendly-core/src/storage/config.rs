//! TOML-based application configuration.
//!
//! Stores:
//! - Focus and break interval lengths
//! - Garden display bounds and growth amounts
//! - Reward rates
//! - Attestation settings
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Timer configuration. Durations in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break")]
    pub long_break_minutes: u32,
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
}

/// Where new plants land, and how much they grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GardenConfig {
    #[serde(default = "default_min_x")]
    pub min_x: f64,
    #[serde(default = "default_max_x")]
    pub max_x: f64,
    #[serde(default = "default_min_y")]
    pub min_y: f64,
    #[serde(default = "default_max_y")]
    pub max_y: f64,
    #[serde(default = "default_initial_growth")]
    pub initial_growth: u8,
    /// Growth added to every plant per finished focus session.
    #[serde(default = "default_focus_growth")]
    pub focus_growth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "default_compost_per_minute")]
    pub compost_per_focus_minute: u64,
    #[serde(default = "default_rare_seed_cost")]
    pub rare_seed_cost: u64,
    #[serde(default = "default_compost_per_level")]
    pub compost_per_level: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Hex-encoded key for the local attestor. Generated when absent.
    #[serde(default)]
    pub secret: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub garden: GardenConfig,
    #[serde(default)]
    pub rewards: RewardConfig,
    #[serde(default)]
    pub attestation: AttestationConfig,
    /// Bootstrap an empty store with the sample garden.
    #[serde(default)]
    pub seed_sample_data: bool,
}

// Default functions
fn default_focus_minutes() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_sessions_before_long_break() -> u32 {
    4
}
fn default_min_x() -> f64 {
    50.0
}
fn default_max_x() -> f64 {
    250.0
}
fn default_min_y() -> f64 {
    150.0
}
fn default_max_y() -> f64 {
    350.0
}
fn default_initial_growth() -> u8 {
    25
}
fn default_focus_growth() -> u32 {
    10
}
fn default_compost_per_minute() -> u64 {
    2
}
fn default_rare_seed_cost() -> u64 {
    100
}
fn default_compost_per_level() -> u64 {
    100
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break(),
            long_break_minutes: default_long_break(),
            sessions_before_long_break: default_sessions_before_long_break(),
            auto_start_breaks: false,
        }
    }
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            min_x: default_min_x(),
            max_x: default_max_x(),
            min_y: default_min_y(),
            max_y: default_max_y(),
            initial_growth: default_initial_growth(),
            focus_growth: default_focus_growth(),
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            compost_per_focus_minute: default_compost_per_minute(),
            rare_seed_cost: default_rare_seed_cost(),
            compost_per_level: default_compost_per_level(),
        }
    }
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            garden: GardenConfig::default(),
            rewards: RewardConfig::default(),
            attestation: AttestationConfig::default(),
            seed_sample_data: false,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(n) => {
                if n.is_f64() {
                    value
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                } else {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                    serde_json::Value::Number(n.into())
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            // Optional strings (e.g. attestation.secret) start out as null.
            serde_json::Value::Null | serde_json::Value::String(_) => {
                serde_json::Value::String(value.into())
            }
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only. The new
    /// value must keep the config valid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };
        if self.timer.focus_minutes == 0 {
            return invalid("timer.focus_minutes", "must be at least 1");
        }
        if self.timer.short_break_minutes == 0 {
            return invalid("timer.short_break_minutes", "must be at least 1");
        }
        if self.timer.long_break_minutes == 0 {
            return invalid("timer.long_break_minutes", "must be at least 1");
        }
        if self.timer.sessions_before_long_break == 0 {
            return invalid("timer.sessions_before_long_break", "must be at least 1");
        }
        if !(self.garden.min_x.is_finite() && self.garden.max_x.is_finite())
            || self.garden.min_x > self.garden.max_x
        {
            return invalid("garden.min_x", "must be finite and not exceed garden.max_x");
        }
        if !(self.garden.min_y.is_finite() && self.garden.max_y.is_finite())
            || self.garden.min_y > self.garden.max_y
        {
            return invalid("garden.min_y", "must be finite and not exceed garden.max_y");
        }
        if self.garden.initial_growth > crate::garden::MAX_GROWTH {
            return invalid("garden.initial_growth", "must be at most 100");
        }
        if self.garden.focus_growth > u32::from(crate::garden::MAX_GROWTH) {
            return invalid("garden.focus_growth", "must be at most 100");
        }
        if self.rewards.compost_per_level == 0 {
            return invalid("rewards.compost_per_level", "must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.timer.focus_minutes, 25);
        assert_eq!(cfg.timer.short_break_minutes, 5);
        assert_eq!(cfg.timer.long_break_minutes, 15);
        assert_eq!(cfg.timer.sessions_before_long_break, 4);
        assert_eq!(cfg.garden.initial_growth, 25);
        assert_eq!(cfg.garden.focus_growth, 10);
        assert_eq!(cfg.rewards.compost_per_focus_minute, 2);
        assert!(cfg.attestation.enabled);
        assert!(!cfg.seed_sample_data);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("[timer]\nfocus_minutes = 50\n").unwrap();
        assert_eq!(cfg.timer.focus_minutes, 50);
        assert_eq!(cfg.timer.short_break_minutes, 5);
        assert_eq!(cfg.garden, GardenConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("attestation.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("garden.min_x").as_deref(), Some("50.0"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("timer.focus_minutes", "50").unwrap();
        cfg.set("timer.auto_start_breaks", "true").unwrap();
        cfg.set("garden.max_x", "300.5").unwrap();
        cfg.set("attestation.secret", "abcd").unwrap();
        cfg.set("seed_sample_data", "true").unwrap();
        assert_eq!(cfg.timer.focus_minutes, 50);
        assert!(cfg.timer.auto_start_breaks);
        assert_eq!(cfg.garden.max_x, 300.5);
        assert_eq!(cfg.attestation.secret.as_deref(), Some("abcd"));
        assert!(cfg.seed_sample_data);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("attestation.enabled", "not_a_bool").is_err());
        assert!(cfg.set("timer.focus_minutes", "-3").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_values_that_break_validation() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.focus_minutes", "0").is_err());
        assert!(cfg.set("garden.min_x", "1000").is_err());
        assert!(cfg.set("garden.initial_growth", "101").is_err());
        assert!(cfg.set("garden.focus_growth", "4294967295").is_err());
        assert!(cfg.set("garden.focus_growth", "101").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
