use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::datasource::lambda_api::default_endpoint;

/// Directory name used under the data and config directories
const APP_DIR: &str = "lambda-layer-releases";

// =============================================================================
// Defaults
// =============================================================================

/// Default cache TTL in minutes
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 15;

/// Default Lambda API request timeout in milliseconds (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub cache: CacheConfig,
    pub lambda: LambdaConfig,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Persist results in the SQLite cache
    pub enabled: bool,
    /// Lifetime of cached results in minutes
    pub ttl_minutes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }
}

/// Lambda API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LambdaConfig {
    pub region: String,
    /// Overrides the regional endpoint
    pub endpoint: Option<String>,
    /// Page size requested from the API
    pub max_items: Option<u32>,
    pub timeout_ms: u64,
}

impl Default for LambdaConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            max_items: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl LambdaConfig {
    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(&self.region))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Reads a JSON configuration file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` if given, else the default config file when it exists,
    /// then applies environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(config.with_env(
            std::env::var("AWS_REGION").ok(),
            std::env::var("AWS_ENDPOINT_URL_LAMBDA")
                .or_else(|_| std::env::var("AWS_ENDPOINT_URL"))
                .ok(),
        ))
    }

    fn with_env(mut self, region: Option<String>, endpoint: Option<String>) -> Self {
        if let Some(region) = region.filter(|r| !r.is_empty()) {
            self.lambda.region = region;
        }
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            self.lambda.endpoint = Some(endpoint);
        }
        self
    }
}

/// Returns the path to the data directory.
/// Uses $XDG_DATA_HOME/lambda-layer-releases if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/lambda-layer-releases,
/// or ./lambda-layer-releases if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the cache database file.
pub fn db_path() -> PathBuf {
    data_dir().join("cache.db")
}

/// Returns the directory holding log files.
pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Returns the path to the default configuration file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join(APP_DIR)
}
