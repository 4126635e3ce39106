use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::retry::RetryPolicy;

/// Rejected `[retry]` values.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("retry.multiplier must be a finite, non-negative number (got {0})")]
    InvalidMultiplier(f64),
}

/// Retry policy parameters (`[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Minimum backoff before the first retry, in milliseconds.
    pub min_delay_ms: u64,
    /// Exponential growth factor per retry (1.0 = jitter only).
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay_ms: 50,
            multiplier: 1.5,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy, ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(ConfigError::InvalidMultiplier(self.multiplier));
        }
        Ok(RetryPolicy::new(
            self.max_retries,
            self.min_delay_ms,
            self.multiplier,
        ))
    }
}

/// Global configuration loaded from `~/.config/txretry/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxRetryConfig {
    #[serde(default)]
    pub retry: RetryConfig,
}

impl TxRetryConfig {
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("txretry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TxRetryConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TxRetryConfig::default();
        let toml = default_cfg.to_toml_string()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<TxRetryConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: TxRetryConfig = toml::from_str(&data)?;
    cfg.retry.to_policy()?;
    Ok(cfg)
}
