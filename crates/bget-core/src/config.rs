use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per block (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/bget/config.toml`.
///
/// CLI flags override individual fields per run; the file holds the
/// defaults a host wants for every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BgetConfig {
    /// Block size in bytes for range planning.
    pub block_size: u64,
    /// Fetch workers per file.
    pub block_workers: usize,
    /// Concurrently downloading files in the multi-file modes.
    pub file_workers: usize,
    /// Per-attempt fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Optional retry policy; built-in defaults when missing.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for BgetConfig {
    fn default() -> Self {
        Self {
            block_size: 100 * 1024,
            block_workers: 10,
            file_workers: 10,
            fetch_timeout_secs: 60,
            retry: None,
        }
    }
}

impl BgetConfig {
    /// Retry policy from the `[retry]` table, or the built-in defaults.
    pub fn retry_policy(&self) -> RetryPolicy {
        match &self.retry {
            Some(cfg) => RetryPolicy::from_config(cfg),
            None => RetryPolicy::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BgetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
