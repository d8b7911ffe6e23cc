/*
[INPUT]:  Optional YAML configuration file + SPECWISE__* environment overrides
[OUTPUT]: Parsed synchronizer configuration
[POS]:    Configuration layer - API location, timeouts, polling cadence
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use specwise_client::{ClientConfig, DEFAULT_BASE_URL};

pub const ENV_PREFIX: &str = "SPECWISE";

/// Top-level configuration for the task synchronizer
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Remote API connection settings
    pub api: ApiConfig,
    /// Status polling settings
    pub poll: PollConfig,
    /// Where downloaded XML exports are written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 5000 }
    }
}

impl SyncConfig {
    /// Platform config location, e.g. `~/.config/specwise/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("specwise").join("config.yaml"))
    }

    /// Load configuration from an explicit file, the default location if it
    /// exists, or built-in defaults; environment overrides apply on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fallback = Self::default_path();
        let path = path.or(fallback.as_deref().filter(|p| p.exists()));
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    /// Load configuration from a YAML file (must exist)
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow!("config file not found: {}", path.display()));
        }
        Self::load_with_env_prefix(Some(path), ENV_PREFIX)
    }

    fn load_with_env_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("read configuration sources")?
            .try_deserialize()
            .context("parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.api.base_url
            ));
        }
        if self.poll.interval_ms == 0 {
            return Err(anyhow!("poll.interval_ms must be greater than zero"));
        }
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    /// Configured directory, else the platform download directory, else `.`
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize config to YAML")
    }
}
