//! Configuration schema for swcache
//!
//! Configuration is stored at `~/.config/swcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Web app served by the worker
    pub app: AppConfig,

    /// Cache storage settings
    pub storage: StorageConfig,

    /// Network client settings
    pub network: NetworkConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Web app and cache identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Worker scope URL; relative paths resolve against it
    pub scope: String,

    /// Product prefix of every cache name
    pub product: String,

    /// Path of the version descriptor
    pub version_path: String,

    /// Version used when the descriptor cannot be fetched or parsed.
    /// Must match the deployed descriptor.
    pub fallback_version: String,

    /// Version used when the descriptor has no `version` field
    pub missing_version: String,

    /// Assets precached on install
    pub assets: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scope: "http://localhost:8080/".to_string(),
            product: "weight-converter".to_string(),
            version_path: "./version.json".to_string(),
            fallback_version: "0.72".to_string(),
            missing_version: "0.3".to_string(),
            assets: vec![
                "./index.html".to_string(),
                "./manifest.json".to_string(),
                "./version.json".to_string(),
                "./peter.jpeg".to_string(),
            ],
        }
    }
}

/// Cache storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage root (defaults to the platform cache directory)
    pub cache_dir: Option<PathBuf>,
}

/// Network client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Whole-request timeout in seconds (0 = none)
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("swcache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
