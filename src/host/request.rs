//! Request and response values exchanged with the host
//!
//! These mirror the subset of the Fetch API the cache lifecycle needs:
//! a method, an absolute URL and a cache mode on the way out, and a
//! status, headers and a fully buffered body on the way back.

use crate::error::{SwcacheError, SwcacheResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Cache mode of an outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Let intermediaries decide
    #[default]
    Default,
    /// Bypass every HTTP cache on the way to the origin
    NoStore,
}

impl CacheMode {
    /// Request headers that enforce this mode on the wire
    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Default => &[],
            Self::NoStore => &[("Cache-Control", "no-store"), ("Pragma", "no-cache")],
        }
    }
}

/// An outgoing request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// HTTP method, upper case
    pub method: String,
    /// Absolute URL
    pub url: String,
    /// Cache mode for the network fetch
    #[serde(default)]
    pub cache: CacheMode,
}

impl Request {
    /// Create a GET request for an absolute URL
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            cache: CacheMode::Default,
        }
    }

    /// Set the HTTP method
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    /// Set the cache mode
    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }

    /// Key under which a cache store files this request.
    ///
    /// The fragment never reaches the network, so it is not part of the key.
    /// URLs that do not parse are keyed verbatim.
    pub fn cache_key(&self) -> String {
        match Url::parse(&self.url) {
            Ok(mut url) => {
                url.set_fragment(None);
                url.into()
            }
            Err(_) => self.url.clone(),
        }
    }

    /// URL scheme, lower-cased
    pub fn scheme(&self) -> Option<String> {
        Url::parse(&self.url).ok().map(|url| url.scheme().to_string())
    }

    /// Check that a store will accept this request paired with `response`.
    ///
    /// Only GET requests over http(s) are storable, and partial content
    /// responses are refused.
    pub fn check_cacheable(&self, response: &Response) -> SwcacheResult<()> {
        if self.method != "GET" {
            return Err(SwcacheError::NotCacheable(format!(
                "method {} is not GET: {}",
                self.method, self.url
            )));
        }
        match self.scheme().as_deref() {
            Some("http") | Some("https") => {}
            _ => {
                return Err(SwcacheError::NotCacheable(format!(
                    "unsupported scheme: {}",
                    self.url
                )))
            }
        }
        if response.status == 206 {
            return Err(SwcacheError::NotCacheable(format!(
                "partial response: {}",
                self.url
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A fully buffered response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers, lower-cased names
    pub headers: BTreeMap<String, String>,
    /// Response body
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with a status and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Create a 200 response
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    /// Add a header
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Whether the status is in the 2xx range
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Resolve a path against the worker scope URL.
///
/// Absolute URLs pass through. Everything else is joined with the scope the
/// way a browser resolves a relative reference.
pub fn resolve_url(scope: &str, path: &str) -> SwcacheResult<String> {
    let base = Url::parse(scope).map_err(|_| SwcacheError::InvalidScope(scope.to_string()))?;
    if base.cannot_be_a_base() || base.host_str().map_or(true, str::is_empty) {
        return Err(SwcacheError::InvalidScope(scope.to_string()));
    }

    let resolved = base
        .join(path)
        .map_err(|e| SwcacheError::User(format!("Cannot resolve {} against {}: {}", path, scope, e)))?;
    Ok(resolved.into())
}
