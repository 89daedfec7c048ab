//! Directory configuration loading
//!
//! Loads configuration from `~/.config/volunteer-directory/config.toml`
//! (or the `VOLUNTEER_DIRECTORY_CONFIG` env var). Every key is optional:
//!
//! ```toml
//! api_base_url = "http://localhost:5000/api"
//! timeout_ms = 5000
//! cache_dir = "/var/lib/volunteers"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{DirectoryError, Result};
use crate::store::{FileRecordStore, StoreError};

/// Root configuration for the directory client
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Base URL of the directory API (without the `/volunteers` suffix)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Request timeout; a timed-out call counts as a remote failure
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory for the local cache (defaults to the XDG data dir)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_ms: default_timeout_ms(),
            cache_dir: None,
        }
    }
}

impl DirectoryConfig {
    /// Environment variable for config path override
    pub const ENV_CONFIG_PATH: &'static str = "VOLUNTEER_DIRECTORY_CONFIG";

    /// Default config filename
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "config.toml";

    /// Load configuration from file
    ///
    /// Resolution order:
    /// 1. `VOLUNTEER_DIRECTORY_CONFIG` environment variable
    /// 2. `~/.config/volunteer-directory/config.toml`
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path();

        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                "Directory config not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DirectoryError::config_with_source(
                format!("failed to read config at {}", path.display()),
                e,
            )
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: DirectoryConfig = toml::from_str(contents)
            .map_err(|e| DirectoryError::config_with_source("failed to parse config", e))?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(DirectoryError::config("api_base_url must not be empty"));
        }
        if self.timeout_ms == 0 {
            return Err(DirectoryError::config("timeout_ms must be greater than 0"));
        }
        Ok(())
    }

    /// Resolve the configuration file path
    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("volunteer-directory")
            .join(Self::DEFAULT_CONFIG_FILENAME)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Open the file cache at `cache_dir`, or the XDG default.
    pub fn open_cache(&self) -> std::result::Result<FileRecordStore, StoreError> {
        match &self.cache_dir {
            Some(dir) => FileRecordStore::with_base_dir(dir.clone()),
            None => FileRecordStore::new(),
        }
    }
}
