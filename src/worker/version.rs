//! Cache identity derived from the version descriptor
//!
//! The descriptor is a small JSON document, `{ "version": "1.2" }`. Cache
//! names take the form `<product>-v<version>`.

use crate::config::schema::AppConfig;
use crate::error::{SwcacheError, SwcacheResult};
use serde_json::Value;
use std::fmt;

/// Parsed version descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    /// Declared version, if present and non-empty
    pub version: Option<String>,
}

impl VersionDescriptor {
    /// Parse a descriptor body.
    ///
    /// Malformed JSON is an error. A well-formed document without a usable
    /// `version` (absent, empty, null, zero, false, or a non-object
    /// document) parses to `version: None`. Numbers are accepted and
    /// rendered the way the deployed file writes them.
    pub fn parse(body: &[u8]) -> SwcacheResult<Self> {
        let document: Value = serde_json::from_slice(body)
            .map_err(|e| SwcacheError::DescriptorUnavailable(format!("malformed: {}", e)))?;

        let version = match document.get("version") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => render_number(n),
            Some(Value::Bool(true)) => Some("true".to_string()),
            _ => None,
        };

        Ok(Self { version })
    }
}

fn render_number(n: &serde_json::Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return (i != 0).then(|| i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return (u != 0).then(|| u.to_string());
    }
    let f = n.as_f64()?;
    if f == 0.0 || f.is_nan() {
        None
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        Some(format!("{}", f as i64))
    } else {
        Some(f.to_string())
    }
}

/// Where a cache name came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    /// The descriptor's `version` field
    Descriptor,
    /// The descriptor had no usable `version` field
    MissingField,
    /// The descriptor could not be fetched or parsed
    Fallback(String),
}

impl fmt::Display for NameSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descriptor => write!(f, "version descriptor"),
            Self::MissingField => write!(f, "descriptor without version"),
            Self::Fallback(reason) => write!(f, "fallback ({})", reason),
        }
    }
}

/// A derived cache name and its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub source: NameSource,
}

/// Naming rules for cache identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNaming {
    product: String,
    fallback_version: String,
    missing_version: String,
}

impl CacheNaming {
    /// Create naming rules
    pub fn new(
        product: impl Into<String>,
        fallback_version: impl Into<String>,
        missing_version: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            fallback_version: fallback_version.into(),
            missing_version: missing_version.into(),
        }
    }

    /// Naming rules from app config
    pub fn from_config(app: &AppConfig) -> Self {
        Self::new(&app.product, &app.fallback_version, &app.missing_version)
    }

    /// Cache name for a version
    pub fn name_for(&self, version: &str) -> String {
        format!("{}-v{}", self.product, version)
    }

    /// Name used when the descriptor is unavailable, and by a process that
    /// never ran install
    pub fn fallback_name(&self) -> String {
        self.name_for(&self.fallback_version)
    }

    /// Name for a successfully parsed descriptor
    pub fn from_descriptor(&self, descriptor: &VersionDescriptor) -> ResolvedName {
        match &descriptor.version {
            Some(version) => ResolvedName {
                name: self.name_for(version),
                source: NameSource::Descriptor,
            },
            None => ResolvedName {
                name: self.name_for(&self.missing_version),
                source: NameSource::MissingField,
            },
        }
    }

    /// Name for a descriptor that could not be obtained
    pub fn from_failure(&self, reason: impl Into<String>) -> ResolvedName {
        ResolvedName {
            name: self.fallback_name(),
            source: NameSource::Fallback(reason.into()),
        }
    }
}

impl Default for CacheNaming {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
