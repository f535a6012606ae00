//! Engine configuration.
//!
//! Values come from, in increasing precedence: [`EngineConfig::default`], a
//! JSON file, and `ENGINE_*` environment variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use engine_input::InputError;

/// Target ticks per second.
pub const TICK_RATE_ENV: &str = "ENGINE_TICK_RATE";
/// Ticks to run before stopping; 0 runs until interrupted.
pub const MAX_TICKS_ENV: &str = "ENGINE_MAX_TICKS";
/// Largest delta, in seconds, a single tick may advance.
pub const MAX_DELTA_ENV: &str = "ENGINE_MAX_DELTA";

/// Slowest accepted tick rate: one tick per hour.
pub const MIN_TICK_RATE: f64 = 1.0 / 3600.0;
/// Fastest accepted tick rate: one tick per microsecond.
pub const MAX_TICK_RATE: f64 = 1_000_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("environment variable {var}={value:?} is not valid")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid input binding: {0}")]
    Binding(#[from] InputError),
}

/// Host-loop and input configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Upper clamp for a tick's delta, in seconds.
    pub max_delta: f32,
    /// Action name to DOM key codes / mouse button names.
    pub bindings: BTreeMap<String, Vec<String>>,
}

const DEFAULT_BINDINGS: &[(&str, &[&str])] = &[
    ("move_left", &["KeyA", "ArrowLeft"]),
    ("move_right", &["KeyD", "ArrowRight"]),
    ("move_forward", &["KeyW", "ArrowUp"]),
    ("move_back", &["KeyS", "ArrowDown"]),
    ("jump", &["Space"]),
];

impl Default for EngineConfig {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .map(|(action, codes)| {
                (
                    (*action).to_string(),
                    codes.iter().map(|c| (*c).to_string()).collect(),
                )
            })
            .collect();

        Self {
            tick_rate: 60.0,
            max_ticks: 0,
            max_delta: 0.25,
            bindings,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `ENGINE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for unparsable values, or
    /// [`ConfigError::Invalid`] if the result fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None, |var| std::env::var(var).ok())
    }

    /// Defaults, overridden by the JSON file at `path` when given, then by
    /// whatever `lookup` returns for the `ENGINE_*` variables.
    ///
    /// # Errors
    ///
    /// As [`from_json_file`](Self::from_json_file) and
    /// [`with_env`](Self::with_env).
    pub fn load(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        base.with_env(lookup)
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] or [`ConfigError::Invalid`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    ///
    /// # Errors
    ///
    /// As [`from_env`](Self::from_env).
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        fn parse<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var, value })
        }

        if let Some(v) = lookup(TICK_RATE_ENV) {
            self.tick_rate = parse(TICK_RATE_ENV, v)?;
        }
        if let Some(v) = lookup(MAX_TICKS_ENV) {
            self.max_ticks = parse(MAX_TICKS_ENV, v)?;
        }
        if let Some(v) = lookup(MAX_DELTA_ENV) {
            self.max_delta = parse(MAX_DELTA_ENV, v)?;
        }
        self.validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    #[must_use]
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TICK_RATE..=MAX_TICK_RATE).contains(&self.tick_rate) {
            return Err(ConfigError::Invalid(format!(
                "tick_rate must be within [{MIN_TICK_RATE}, {MAX_TICK_RATE}], got {}",
                self.tick_rate
            )));
        }
        if !(self.max_delta.is_finite() && self.max_delta >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_delta must be non-negative, got {}",
                self.max_delta
            )));
        }
        Ok(())
    }

    /// Nominal duration of one tick, in seconds. Between 1 µs and one hour
    /// for a validated config.
    #[must_use]
    pub fn tick_interval(&self) -> f64 {
        1.0 / self.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_rate, 60.0);
        assert_eq!(config.max_ticks, 0);
        assert_eq!(config.bindings["jump"], vec!["Space".to_string()]);
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::default()
            .with_env(env(&[(TICK_RATE_ENV, "30"), (MAX_TICKS_ENV, " 100 ")]))
            .unwrap();
        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.max_ticks, 100);
        assert_eq!(config.max_delta, 0.25);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = EngineConfig::default()
            .with_env(env(&[(MAX_TICKS_ENV, "lots")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { var: MAX_TICKS_ENV, .. }
        ));

        let err = EngineConfig::default()
            .with_env(env(&[(TICK_RATE_ENV, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_json_partial_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "tick_rate": 120.0 }"#).unwrap();
        assert_eq!(config.tick_rate, 120.0);
        assert_eq!(config.max_delta, 0.25);
        assert!(config.bindings.contains_key("move_left"));
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "max_delta": -1.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_file("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_tick_rate_bounds() {
        for rate in [1e300, 1e-300, f64::NAN, f64::INFINITY, -60.0] {
            let config = EngineConfig::default().with_tick_rate(rate);
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "tick_rate {rate} accepted"
            );
        }
        assert!(matches!(
            EngineConfig::default().with_env(env(&[(TICK_RATE_ENV, "1e300")])),
            Err(ConfigError::Invalid(_))
        ));

        for rate in [MIN_TICK_RATE, MAX_TICK_RATE] {
            let config = EngineConfig::default().with_tick_rate(rate);
            assert!(config.validate().is_ok());
            assert!(std::time::Duration::from_secs_f64(config.tick_interval()) > std::time::Duration::ZERO);
        }
    }

    #[test]
    fn test_load_layers_env_over_json_file() {
        let path = std::env::temp_dir().join(format!("engine_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "tick_rate": 120.0, "max_ticks": 7 }"#).unwrap();

        let config = EngineConfig::load(Some(path.as_path()), env(&[(MAX_TICKS_ENV, "3")]));
        std::fs::remove_file(&path).unwrap();
        let config = config.unwrap();
        assert_eq!(config.tick_rate, 120.0);
        assert_eq!(config.max_ticks, 3);
        assert_eq!(config.max_delta, 0.25);

        let config = EngineConfig::load(None, env(&[(TICK_RATE_ENV, "30")])).unwrap();
        assert_eq!(config.tick_rate, 30.0);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_tick_rate(10.0)
            .with_max_ticks(3)
            .with_max_delta(0.5);
        assert_eq!(config.tick_interval(), 0.1);
        assert_eq!(config.max_ticks, 3);
        assert_eq!(config.max_delta, 0.5);
    }
}
