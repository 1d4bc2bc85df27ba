//! Engine configuration: TOML file with environment overrides.

use crate::market::PriceGenerator;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings for the heartbeat and persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Heartbeat period in milliseconds
    pub tick_interval_ms: u64,
    /// Evaluate cycle phases every N ticks
    pub cycle_every: u64,
    /// Persist a snapshot every N ticks
    pub persist_every: u64,
    /// Lookback (in samples) for derived market momentum
    pub momentum_period: usize,
    /// Fixed seed for reproducible runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Snapshot file; defaults to `~/.tickertape/market.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Price process constants
    pub prices: PriceGenerator,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            cycle_every: 10,
            persist_every: 5,
            momentum_period: 10,
            seed: None,
            state_file: None,
            log_filter: "info".to_string(),
            prices: PriceGenerator::default(),
        }
    }
}

impl EngineConfig {
    /// Default config path: `~/.tickertape/config.toml`.
    /// Can be overridden with the `TICKERTAPE_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("TICKERTAPE_CONFIG") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".tickertape/config.toml"))
            .unwrap_or_else(|| PathBuf::from("tickertape.toml"))
    }

    /// Load from the default path and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path(&Self::default_path())?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TICKERTAPE_TICK_MS`, `TICKERTAPE_SEED` and `TICKERTAPE_STATE_FILE`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("TICKERTAPE_TICK_MS") {
            self.tick_interval_ms = value.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("TICKERTAPE_TICK_MS is not a number: {}", value))
            })?;
        }
        if let Some(value) = lookup("TICKERTAPE_SEED") {
            self.seed = Some(value.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("TICKERTAPE_SEED is not a number: {}", value))
            })?);
        }
        if let Some(value) = lookup("TICKERTAPE_STATE_FILE") {
            if !value.trim().is_empty() {
                self.state_file = Some(PathBuf::from(value));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let zero = [
            ("tick_interval_ms", self.tick_interval_ms == 0),
            ("cycle_every", self.cycle_every == 0),
            ("persist_every", self.persist_every == 0),
            ("momentum_period", self.momentum_period == 0),
        ];
        if let Some((name, _)) = zero.iter().find(|(_, is_zero)| *is_zero) {
            return Err(Error::InvalidConfig(format!("{} must be greater than zero", name)));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Configured snapshot path, or the store default.
    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(crate::snapshot::SnapshotStore::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.cycle_every, 10);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml(
            r#"
            tick_interval_ms = 250
            seed = 42

            [prices]
            stock_noise_scale = 0.05
            crypto_noise_scale = 0.1
            sentiment_bias_scale = 0.001
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.cycle_every, 10);
        assert_eq!(config.prices.stock_noise_scale, 0.05);
    }

    #[test]
    fn test_invalid_toml() {
        let result = EngineConfig::from_toml("tick_interval_ms = \"fast\"");
        assert!(matches!(result, Err(Error::Toml(_))));
    }

    #[test]
    fn test_zero_rejected() {
        let result = EngineConfig::from_toml("cycle_every = 0");
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file_defaults() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::load_from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "persist_every = 30\nlog_filter = \"debug\"\n").unwrap();

        let config = EngineConfig::load_from_path(&path).unwrap();
        assert_eq!(config.persist_every, 30);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TICKERTAPE_TICK_MS", "500"),
            ("TICKERTAPE_SEED", "7"),
            ("TICKERTAPE_STATE_FILE", "/tmp/market.json"),
        ]
        .into_iter()
        .collect();

        let mut config = EngineConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.state_path(), PathBuf::from("/tmp/market.json"));
    }

    #[test]
    fn test_bad_override() {
        let mut config = EngineConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "TICKERTAPE_SEED").then(|| "lucky".to_string())
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
