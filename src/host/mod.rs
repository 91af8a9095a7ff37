//! Host environment abstraction
//!
//! The cache lifecycle controller never talks to sockets or disks directly.
//! It goes through the seams defined here, which model what a browser hands
//! a service worker:
//! - `Network`: the `fetch()` primitive
//! - `CacheStorage` / `CacheStore`: the Cache Storage API
//! - `WorkerScope`: `skipWaiting()` and `clients.claim()`

mod disk;
mod memory;
mod network;
mod request;
mod scope;

pub use disk::DiskCacheStorage;
pub use memory::MemoryCacheStorage;
pub use network::{HttpNetwork, OfflineNetwork, StaticNetwork};
pub use request::{resolve_url, CacheMode, Request, Response};
pub use scope::{LocalScope, WorkerScope};

use crate::error::{SwcacheError, SwcacheResult};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

/// The collaborators a worker is attached to
#[derive(Clone)]
pub struct Host {
    pub network: Arc<dyn Network>,
    pub caches: Arc<dyn CacheStorage>,
    pub scope: Arc<dyn WorkerScope>,
}

impl Host {
    /// Bundle host collaborators
    pub fn new(
        network: Arc<dyn Network>,
        caches: Arc<dyn CacheStorage>,
        scope: Arc<dyn WorkerScope>,
    ) -> Self {
        Self {
            network,
            caches,
            scope,
        }
    }
}

/// Network fetch primitive
///
/// `Ok` means the origin answered, whatever the status. `Err` is a
/// rejection: the request never produced a response.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform exactly one network attempt
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response>;
}

/// A single named cache store (request -> response)
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Name of this store
    fn name(&self) -> &str;

    /// Store a response, replacing any entry for the same request
    async fn put(&self, request: &Request, response: Response) -> SwcacheResult<()>;

    /// Store a batch of entries. Every entry is validated before any is written.
    async fn put_all(&self, entries: Vec<(Request, Response)>) -> SwcacheResult<()>;

    /// Look up the response stored for a request
    async fn lookup(&self, request: &Request) -> SwcacheResult<Option<Response>>;

    /// All stored requests
    async fn requests(&self) -> SwcacheResult<Vec<Request>>;
}

/// Collection of named cache stores
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a store, creating it if absent
    async fn open(&self, name: &str) -> SwcacheResult<Arc<dyn CacheStore>>;

    /// Whether a store with this name exists
    async fn has(&self, name: &str) -> SwcacheResult<bool>;

    /// Names of all stores
    async fn keys(&self) -> SwcacheResult<Vec<String>>;

    /// Delete a store. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> SwcacheResult<bool>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Fetch every request and store the responses, all or nothing.
///
/// All fetches run concurrently. A rejection or a non-2xx status fails the
/// whole batch before anything is written to the store.
pub async fn add_all(
    store: &dyn CacheStore,
    network: &dyn Network,
    requests: &[Request],
) -> SwcacheResult<()> {
    let fetches = requests.iter().map(|request| async move {
        let response = network.fetch(request).await?;
        if !response.is_ok() {
            return Err(SwcacheError::BadStatus {
                url: request.url.clone(),
                status: response.status,
            });
        }
        Ok((request.clone(), response))
    });

    let entries = try_join_all(fetches)
        .await
        .map_err(|e| SwcacheError::InstallFailed {
            store: store.name().to_string(),
            reason: e.to_string(),
        })?;

    debug!("Fetched {} entries for {}", entries.len(), store.name());
    store.put_all(entries).await
}
