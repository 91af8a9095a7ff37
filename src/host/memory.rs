//! In-memory cache storage
//!
//! Stores live for the lifetime of the `MemoryCacheStorage` value. Store
//! names are reported in creation order, like the browser implementation.

use super::{CacheStorage, CacheStore, Request, Response};
use crate::error::{SwcacheError, SwcacheResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Entries = Vec<(Request, Response)>;

/// A single in-memory store
pub struct MemoryCacheStore {
    name: String,
    entries: RwLock<Entries>,
}

impl MemoryCacheStore {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(Vec::new()),
        }
    }

    fn poisoned(&self) -> SwcacheError {
        SwcacheError::store(&self.name, "lock poisoned")
    }

    fn insert(entries: &mut Entries, request: &Request, response: Response) {
        let key = request.cache_key();
        match entries.iter_mut().find(|(r, _)| r.cache_key() == key) {
            Some(slot) => *slot = (request.clone(), response),
            None => entries.push((request.clone(), response)),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, request: &Request, response: Response) -> SwcacheResult<()> {
        request.check_cacheable(&response)?;
        let mut entries = self.entries.write().map_err(|_| self.poisoned())?;
        Self::insert(&mut entries, request, response);
        Ok(())
    }

    async fn put_all(&self, batch: Vec<(Request, Response)>) -> SwcacheResult<()> {
        for (request, response) in &batch {
            request.check_cacheable(response)?;
        }
        let mut entries = self.entries.write().map_err(|_| self.poisoned())?;
        for (request, response) in batch {
            Self::insert(&mut entries, &request, response);
        }
        Ok(())
    }

    async fn lookup(&self, request: &Request) -> SwcacheResult<Option<Response>> {
        if request.method != "GET" {
            return Ok(None);
        }
        let entries = self.entries.read().map_err(|_| self.poisoned())?;
        let key = request.cache_key();
        Ok(entries
            .iter()
            .find(|(r, _)| r.cache_key() == key)
            .map(|(_, response)| response.clone()))
    }

    async fn requests(&self) -> SwcacheResult<Vec<Request>> {
        let entries = self.entries.read().map_err(|_| self.poisoned())?;
        Ok(entries.iter().map(|(r, _)| r.clone()).collect())
    }
}

/// In-memory collection of stores
#[derive(Default)]
pub struct MemoryCacheStorage {
    order: RwLock<Vec<String>>,
    stores: RwLock<HashMap<String, Arc<MemoryCacheStore>>>,
}

impl MemoryCacheStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> SwcacheError {
        SwcacheError::store("memory", "lock poisoned")
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> SwcacheResult<Arc<dyn CacheStore>> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        if let Some(store) = stores.get(name) {
            let store: Arc<dyn CacheStore> = store.clone();
            return Ok(store);
        }

        let store = Arc::new(MemoryCacheStore::new(name));
        stores.insert(name.to_string(), store.clone());
        self.order
            .write()
            .map_err(|_| Self::poisoned())?
            .push(name.to_string());
        let store: Arc<dyn CacheStore> = store;
        Ok(store)
    }

    async fn has(&self, name: &str) -> SwcacheResult<bool> {
        let stores = self.stores.read().map_err(|_| Self::poisoned())?;
        Ok(stores.contains_key(name))
    }

    async fn keys(&self) -> SwcacheResult<Vec<String>> {
        let order = self.order.read().map_err(|_| Self::poisoned())?;
        Ok(order.clone())
    }

    async fn delete(&self, name: &str) -> SwcacheResult<bool> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        if stores.remove(name).is_none() {
            return Ok(false);
        }
        self.order
            .write()
            .map_err(|_| Self::poisoned())?
            .retain(|n| n != name);
        Ok(true)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
