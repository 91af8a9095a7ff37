//! Network implementations
//!
//! `HttpNetwork` performs real requests with ureq on tokio's blocking pool.
//! `OfflineNetwork` rejects everything, and `StaticNetwork` answers from an
//! in-memory route table.

use super::{Network, Request, Response};
use crate::config::schema::NetworkConfig;
use crate::error::{SwcacheError, SwcacheResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// HTTP network backed by ureq
pub struct HttpNetwork {
    agent: Agent,
    user_agent: String,
}

impl HttpNetwork {
    /// Create a network client from config
    pub fn new(config: &NetworkConfig) -> Self {
        let timeout = match config.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        // Any status is a resolved response; only transport errors reject
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .into();

        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }

    fn fetch_blocking(
        agent: &Agent,
        user_agent: &str,
        request: &Request,
    ) -> SwcacheResult<Response> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str())
            .header("User-Agent", user_agent);
        for (name, value) in request.cache.headers() {
            builder = builder.header(*name, *value);
        }
        let http_request = builder
            .body(())
            .map_err(|e| SwcacheError::network(&request.url, e))?;

        let mut response = agent
            .run(http_request)
            .map_err(|e| SwcacheError::network(&request.url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| SwcacheError::network(&request.url, e))?;

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        debug!("Fetching {} ({:?})", request, request.cache);

        let agent = self.agent.clone();
        let user_agent = self.user_agent.clone();
        let owned = request.clone();
        let response = tokio::task::spawn_blocking(move || {
            Self::fetch_blocking(&agent, &user_agent, &owned)
        })
        .await
        .map_err(|e| SwcacheError::Internal(format!("fetch task failed: {}", e)))??;

        debug!("{} -> {}", request, response.status);
        Ok(response)
    }
}

/// Network that is permanently unreachable
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNetwork;

#[async_trait]
impl Network for OfflineNetwork {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        Err(SwcacheError::network(&request.url, "offline"))
    }
}

/// In-memory network answering from a fixed route table.
///
/// Unrouted URLs answer 404. Routes registered with `fail` reject like a
/// dropped connection. Every request seen is recorded.
#[derive(Default)]
pub struct StaticNetwork {
    routes: HashMap<String, Option<Response>>,
    seen: Mutex<Vec<Request>>,
}

impl StaticNetwork {
    /// Create an empty route table
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `response`
    pub fn route(mut self, url: &str, response: Response) -> Self {
        self.routes.insert(Request::get(url).cache_key(), Some(response));
        self
    }

    /// Reject requests for `url`
    pub fn fail(mut self, url: &str) -> Self {
        self.routes.insert(Request::get(url).cache_key(), None);
        self
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<Request> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Network for StaticNetwork {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }

        match self.routes.get(&request.cache_key()) {
            Some(Some(response)) => Ok(response.clone()),
            Some(None) => Err(SwcacheError::network(&request.url, "connection refused")),
            None => Ok(Response::new(404, "Not Found")),
        }
    }
}
