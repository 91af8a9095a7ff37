//! Error types for swcache
//!
//! All modules use `SwcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for swcache operations
pub type SwcacheResult<T> = Result<T, SwcacheError>;

/// All errors that can occur in swcache
#[derive(Error, Debug)]
pub enum SwcacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scope URL '{0}'. Expected an absolute http(s) URL")]
    InvalidScope(String),

    // Network errors
    #[error("Network request failed: {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Request to {url} returned status {status}")]
    BadStatus { url: String, status: u16 },

    // Version descriptor errors
    #[error("Version descriptor unavailable: {0}")]
    DescriptorUnavailable(String),

    // Cache store errors
    #[error("Cache store error in {store}: {reason}")]
    Store { store: String, reason: String },

    #[error("Request not cacheable: {0}")]
    NotCacheable(String),

    #[error("Failed to populate cache {store}: {reason}")]
    InstallFailed { store: String, reason: String },

    // Lifecycle errors
    #[error("Worker is {state}, cannot {operation}")]
    InvalidState { state: String, operation: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl SwcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network failure error
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a cache store error
    pub fn store(store: impl Into<String>, reason: impl ToString) -> Self {
        Self::Store {
            store: store.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error is a network rejection (as opposed to an HTTP status)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidScope(_) => Some("Set app.scope in the file shown by: swcache config path"),
            Self::Network { .. } => Some("Check the scope URL, or use --offline to serve from cache"),
            Self::InstallFailed { .. } => {
                Some("Every asset must be reachable for install to succeed")
            }
            Self::ConfigInvalid { .. } => Some("Run: swcache config show"),
            _ => None,
        }
    }
}
