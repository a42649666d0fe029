use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Source currency shown when a session starts.
    #[serde(default = "default_source")]
    pub source: String,
    /// Target currency shown when a session starts.
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Hours before cached rates are considered stale; 0 keeps them forever.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,
    pub data_path: Option<String>,
}

fn default_source() -> String {
    "usd".to_string()
}

fn default_target() -> String {
    "inr".to_string()
}

fn default_cache_ttl_hours() -> u64 {
    24
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: default_source(),
            target: default_target(),
            provider: ProviderConfig::default(),
            cache_ttl_hours: default_cache_ttl_hours(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location; a missing file yields
    /// the built-in defaults so the app works without any setup.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "fxc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "fxc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// TTL applied to cached rate entries; `None` disables expiry.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_hours > 0).then(|| Duration::from_secs(self.cache_ttl_hours * 3600))
    }
}
