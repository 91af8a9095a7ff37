//! Cache lifecycle controller
//!
//! Drives the three worker events against a `Host`:
//!
//! | Event | Operation | Effect |
//! |-------|-----------|--------|
//! | install | `install` | derive cache name, precache assets |
//! | fetch | `handle_fetch` | network first, mirror into cache, cache fallback |
//! | activate | `activate` | claim clients, delete every other cache |
//!
//! # States
//!
//! `Uninstalled -> Installing -> Installed <-> Activating -> Active`
//!
//! The active cache name is held by the controller. A process that never ran
//! install (a restarted worker, see `resume`) recomputes it from the fallback
//! version, so every restart agrees on the same name.

pub mod version;

pub use version::{CacheNaming, NameSource, ResolvedName, VersionDescriptor};

use crate::config::schema::AppConfig;
use crate::error::{SwcacheError, SwcacheResult};
use crate::host::{
    add_all, resolve_url, CacheMode, CacheStorage, Host, Network, Request, Response,
    WorkerScope,
};
use futures_util::future::join_all;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Lifecycle state of a worker process instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Nothing has run yet
    Uninstalled,
    /// Install in progress
    Installing,
    /// Installed, waiting for activation
    Installed,
    /// Activation in progress
    Activating,
    /// Activated and controlling clients
    Active,
}

impl WorkerState {
    /// Whether fetch events may be handled in this state
    pub fn can_handle_fetch(&self) -> bool {
        matches!(self, Self::Installed | Self::Active)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninstalled => write!(f, "uninstalled"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Result of a successful install
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Cache the assets were stored in
    pub cache_name: String,
    /// How the name was derived
    pub source: NameSource,
    /// Number of assets precached
    pub assets: usize,
}

/// Result of an activation
#[derive(Debug, Clone, Default)]
pub struct ActivationReport {
    /// The cache that was kept
    pub kept: String,
    /// Stale caches that were deleted
    pub deleted: Vec<String>,
    /// Stale caches whose deletion failed, with the reason
    pub failed: Vec<(String, String)>,
}

impl ActivationReport {
    /// True when there was nothing to prune
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.failed.is_empty()
    }
}

/// How a fetch was answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The network answered
    Network(Response),
    /// The network failed and the active cache had an entry
    Cache(Response),
    /// The network failed and nothing was cached
    Miss,
}

impl FetchOutcome {
    /// The response, if any
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Network(response) | Self::Cache(response) => Some(response),
            Self::Miss => None,
        }
    }

    /// Consume into the response, if any
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Network(response) | Self::Cache(response) => Some(response),
            Self::Miss => None,
        }
    }

    /// Short label for where the answer came from
    pub fn source(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Cache(_) => "cache",
            Self::Miss => "none",
        }
    }
}

/// The cache lifecycle controller of one worker process instance
pub struct CacheController {
    naming: CacheNaming,
    descriptor_request: Request,
    asset_requests: Vec<Request>,
    network: Arc<dyn Network>,
    caches: Arc<dyn CacheStorage>,
    scope: Arc<dyn WorkerScope>,
    active_name: RwLock<Option<String>>,
    state: Mutex<WorkerState>,
    /// Cache writes still in flight; dropped (aborted) with the controller
    pending: Mutex<JoinSet<()>>,
}

impl CacheController {
    /// Create a controller for a freshly registered worker
    pub fn new(app: &AppConfig, host: Host) -> SwcacheResult<Self> {
        let descriptor_request = Request::get(resolve_url(&app.scope, &app.version_path)?)
            .with_cache(CacheMode::NoStore);
        let asset_requests = app
            .assets
            .iter()
            .map(|path| resolve_url(&app.scope, path).map(Request::get))
            .collect::<SwcacheResult<Vec<_>>>()?;

        Ok(Self {
            naming: CacheNaming::from_config(app),
            descriptor_request,
            asset_requests,
            network: host.network,
            caches: host.caches,
            scope: host.scope,
            active_name: RwLock::new(None),
            state: Mutex::new(WorkerState::Uninstalled),
            pending: Mutex::new(JoinSet::new()),
        })
    }

    /// Create a controller for a restarted process of an already active worker.
    ///
    /// Install does not run again, so the active cache name comes from the
    /// fallback rule.
    pub fn resume(app: &AppConfig, host: Host) -> SwcacheResult<Self> {
        let controller = Self::new(app, host)?;
        *controller.lock_state() = WorkerState::Active;
        Ok(controller)
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        *self.lock_state()
    }

    /// Resolved asset requests precached on install
    pub fn asset_requests(&self) -> &[Request] {
        &self.asset_requests
    }

    /// Naming rules in effect
    pub fn naming(&self) -> &CacheNaming {
        &self.naming
    }

    /// The active cache name, or the fallback name if install never ran here
    pub fn current_cache_name(&self) -> String {
        let active = self
            .active_name
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        active
            .clone()
            .unwrap_or_else(|| self.naming.fallback_name())
    }

    /// Derive the cache name from the deployed descriptor without touching
    /// any state
    pub async fn probe_cache_name(&self) -> ResolvedName {
        match self.fetch_descriptor().await {
            Ok(descriptor) => self.naming.from_descriptor(&descriptor),
            Err(e) => {
                warn!("Version descriptor unavailable, using fallback: {}", e);
                self.naming.from_failure(e.to_string())
            }
        }
    }

    /// Handle the install event
    pub async fn install(&self) -> SwcacheResult<InstallReport> {
        self.transition(&[WorkerState::Uninstalled], WorkerState::Installing, "install")?;
        self.scope.skip_waiting();

        match self.precache().await {
            Ok(report) => {
                self.set_state(WorkerState::Installed);
                info!(
                    "Installed {} ({} assets, from {})",
                    report.cache_name, report.assets, report.source
                );
                Ok(report)
            }
            Err(e) => {
                self.set_state(WorkerState::Uninstalled);
                warn!("Install failed: {}", e);
                Err(e)
            }
        }
    }

    async fn precache(&self) -> SwcacheResult<InstallReport> {
        let resolved = self.probe_cache_name().await;
        self.set_active_name(resolved.name.clone());

        let store = self.caches.open(&resolved.name).await?;
        add_all(&*store, &*self.network, &self.asset_requests).await?;

        Ok(InstallReport {
            cache_name: resolved.name,
            source: resolved.source,
            assets: self.asset_requests.len(),
        })
    }

    /// Only a rejection or an unparseable body counts as unavailable. The
    /// status is not checked, so an error page carrying a valid descriptor
    /// still names the cache.
    async fn fetch_descriptor(&self) -> SwcacheResult<VersionDescriptor> {
        let response = self.network.fetch(&self.descriptor_request).await?;
        if !response.is_ok() {
            debug!(
                "Version descriptor answered {}, parsing body anyway",
                response.status
            );
        }
        VersionDescriptor::parse(&response.body)
    }

    /// Handle a fetch event: one network attempt, then one cache lookup.
    ///
    /// A network response is mirrored into the active cache in the
    /// background; a failed write never affects the returned outcome.
    pub async fn handle_fetch(&self, request: Request) -> SwcacheResult<FetchOutcome> {
        let state = self.state();
        if !state.can_handle_fetch() {
            return Err(SwcacheError::InvalidState {
                state: state.to_string(),
                operation: "handle fetch".to_string(),
            });
        }

        match self.network.fetch(&request).await {
            Ok(response) => {
                self.mirror(request, response.clone());
                Ok(FetchOutcome::Network(response))
            }
            Err(e) => {
                debug!("Network failed for {}, trying cache: {}", request, e);
                match self.lookup_active(&request).await {
                    Ok(Some(response)) => Ok(FetchOutcome::Cache(response)),
                    Ok(None) => Ok(FetchOutcome::Miss),
                    Err(e) => {
                        debug!("Cache lookup for {} failed, treating as miss: {}", request, e);
                        Ok(FetchOutcome::Miss)
                    }
                }
            }
        }
    }

    async fn lookup_active(&self, request: &Request) -> SwcacheResult<Option<Response>> {
        let name = self.current_cache_name();
        if !self.caches.has(&name).await? {
            return Ok(None);
        }
        self.caches.open(&name).await?.lookup(request).await
    }

    fn mirror(&self, request: Request, response: Response) {
        let caches = Arc::clone(&self.caches);
        let name = self.current_cache_name();

        let write = async move {
            let result = match caches.open(&name).await {
                Ok(store) => store.put(&request, response).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                debug!("Ignoring cache write failure for {}: {}", request, e);
            }
        };

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Reap finished writes so a long-lived controller stays bounded
        while let Some(result) = pending.try_join_next() {
            if let Err(e) = result {
                warn!("Cache write task failed: {}", e);
            }
        }
        pending.spawn(write);
    }

    /// Number of cache writes not yet reaped
    pub fn pending_writes(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Wait for every background cache write to finish
    pub async fn wait_until_idle(&self) {
        loop {
            let mut pending = std::mem::take(
                &mut *self
                    .pending
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
            );
            if pending.is_empty() {
                return;
            }
            while let Some(result) = pending.join_next().await {
                if let Err(e) = result {
                    warn!("Cache write task failed: {}", e);
                }
            }
        }
    }

    /// Caches activation would delete
    pub async fn stale_caches(&self) -> SwcacheResult<Vec<String>> {
        let keep = self.current_cache_name();
        Ok(self
            .caches
            .keys()
            .await?
            .into_iter()
            .filter(|name| *name != keep)
            .collect())
    }

    /// Handle the activate event.
    ///
    /// Stale caches are deleted concurrently. A failed deletion is logged and
    /// reported but neither stops the others nor fails activation.
    pub async fn activate(&self) -> SwcacheResult<ActivationReport> {
        let previous = self.transition(
            &[WorkerState::Installed, WorkerState::Active],
            WorkerState::Activating,
            "activate",
        )?;

        match self.prune().await {
            Ok(report) => {
                self.set_state(WorkerState::Active);
                Ok(report)
            }
            Err(e) => {
                self.set_state(previous);
                Err(e)
            }
        }
    }

    async fn prune(&self) -> SwcacheResult<ActivationReport> {
        self.scope.claim_clients().await?;

        let keep = self.current_cache_name();
        let stale = self.stale_caches().await?;

        let caches = &self.caches;
        let deletions = stale.into_iter().map(|name| async move {
            let result = caches.delete(&name).await;
            (name, result)
        });

        let mut report = ActivationReport {
            kept: keep,
            ..ActivationReport::default()
        };
        for (name, result) in join_all(deletions).await {
            match result {
                Ok(_) => {
                    info!("Deleted stale cache {}", name);
                    report.deleted.push(name);
                }
                Err(e) => {
                    warn!("Failed to delete stale cache {}: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: WorkerState) {
        debug!("Worker state -> {}", state);
        *self.lock_state() = state;
    }

    /// Move to `to` if the current state is one of `from`; returns the old state
    fn transition(
        &self,
        from: &[WorkerState],
        to: WorkerState,
        operation: &str,
    ) -> SwcacheResult<WorkerState> {
        let mut state = self.lock_state();
        let current = *state;
        if !from.contains(&current) {
            return Err(SwcacheError::InvalidState {
                state: current.to_string(),
                operation: operation.to_string(),
            });
        }
        *state = to;
        debug!("Worker state {} -> {}", current, to);
        Ok(current)
    }

    fn set_active_name(&self, name: String) {
        *self
            .active_name
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CacheStore, LocalScope, MemoryCacheStorage, OfflineNetwork, StaticNetwork};
    use async_trait::async_trait;

    const SCOPE: &str = "http://app.test/weight/";

    fn url(path: &str) -> String {
        format!("{}{}", SCOPE, path)
    }

    fn app() -> AppConfig {
        AppConfig {
            scope: SCOPE.to_string(),
            ..AppConfig::default()
        }
    }

    fn site(descriptor: Option<&str>) -> StaticNetwork {
        let network = StaticNetwork::new()
            .route(&url("index.html"), Response::ok("<html>"))
            .route(&url("manifest.json"), Response::ok("{}"))
            .route(&url("peter.jpeg"), Response::ok(vec![0xff, 0xd8]));
        match descriptor {
            Some(body) => network.route(&url("version.json"), Response::ok(body)),
            None => network.fail(&url("version.json")),
        }
    }

    struct Fixture {
        controller: CacheController,
        network: Arc<StaticNetwork>,
        caches: Arc<MemoryCacheStorage>,
        scope: Arc<LocalScope>,
    }

    fn fixture(network: StaticNetwork) -> Fixture {
        fixture_with(network, Arc::new(MemoryCacheStorage::new()))
    }

    fn fixture_with(network: StaticNetwork, caches: Arc<MemoryCacheStorage>) -> Fixture {
        let network = Arc::new(network);
        let scope = Arc::new(LocalScope::new());
        let host = Host::new(network.clone(), caches.clone(), scope.clone());
        Fixture {
            controller: CacheController::new(&app(), host).unwrap(),
            network,
            caches,
            scope,
        }
    }

    #[tokio::test]
    async fn install_uses_descriptor_version() {
        let fx = fixture(site(Some(r#"{"version":"1.2"}"#)));

        let report = fx.controller.install().await.unwrap();

        assert_eq!(report.cache_name, "weight-converter-v1.2");
        assert_eq!(report.source, NameSource::Descriptor);
        assert_eq!(fx.controller.current_cache_name(), "weight-converter-v1.2");
        assert_eq!(fx.controller.state(), WorkerState::Installed);
        assert!(fx.scope.skipped_waiting());

        let store = fx.caches.open("weight-converter-v1.2").await.unwrap();
        let urls: Vec<String> = store
            .requests()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(
            urls,
            vec![
                url("index.html"),
                url("manifest.json"),
                url("version.json"),
                url("peter.jpeg")
            ]
        );
    }

    #[tokio::test]
    async fn install_falls_back_when_descriptor_rejects() {
        // The descriptor fetch rejects, so populating the store fails too,
        // but the name is already chosen
        let fx = fixture(site(None));

        let result = fx.controller.install().await;

        assert!(matches!(result, Err(SwcacheError::InstallFailed { .. })));
        assert_eq!(fx.controller.current_cache_name(), "weight-converter-v0.72");
        assert_eq!(fx.controller.state(), WorkerState::Uninstalled);
    }

    #[tokio::test]
    async fn install_falls_back_on_malformed_descriptor() {
        let fx = fixture(site(Some("<html>not json</html>")));

        let report = fx.controller.install().await.unwrap();

        assert_eq!(report.cache_name, "weight-converter-v0.72");
        assert!(matches!(report.source, NameSource::Fallback(_)));
    }

    #[tokio::test]
    async fn install_defaults_missing_version() {
        let fx = fixture(site(Some("{}")));

        let report = fx.controller.install().await.unwrap();

        assert_eq!(report.cache_name, "weight-converter-v0.3");
        assert_eq!(report.source, NameSource::MissingField);
    }

    #[tokio::test]
    async fn descriptor_body_decides_regardless_of_status() {
        let network = StaticNetwork::new()
            .route(&url("version.json"), Response::new(500, r#"{"version":"9"}"#));
        let fx = fixture(network);

        let resolved = fx.controller.probe_cache_name().await;
        assert_eq!(resolved.name, "weight-converter-v9");
        assert_eq!(resolved.source, NameSource::Descriptor);
    }

    #[tokio::test]
    async fn descriptor_error_page_uses_fallback() {
        // Unrouted descriptor answers 404 with a non-JSON body
        let fx = fixture(StaticNetwork::new());

        let resolved = fx.controller.probe_cache_name().await;
        assert_eq!(resolved.name, "weight-converter-v0.72");
        assert!(matches!(resolved.source, NameSource::Fallback(_)));
    }

    #[tokio::test]
    async fn descriptor_is_fetched_uncached() {
        let fx = fixture(site(Some(r#"{"version":"1.2"}"#)));
        fx.controller.install().await.unwrap();

        let requests = fx.network.requests();
        let descriptor = requests
            .iter()
            .find(|r| r.url == url("version.json") && r.cache == CacheMode::NoStore);
        assert!(descriptor.is_some());
    }

    #[tokio::test]
    async fn install_only_once_per_process() {
        let fx = fixture(site(Some(r#"{"version":"1.2"}"#)));
        fx.controller.install().await.unwrap();

        let again = fx.controller.install().await;
        assert!(matches!(again, Err(SwcacheError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn fetch_mirrors_network_response() {
        let network = site(Some(r#"{"version":"1.2"}"#))
            .route(&url("app.js"), Response::ok("console.log(1)"));
        let fx = fixture(network);
        fx.controller.install().await.unwrap();

        let request = Request::get(url("app.js"));
        let outcome = fx.controller.handle_fetch(request.clone()).await.unwrap();
        fx.controller.wait_until_idle().await;

        assert_eq!(outcome.source(), "network");
        let store = fx.caches.open("weight-converter-v1.2").await.unwrap();
        let cached = store.lookup(&request).await.unwrap().unwrap();
        assert_eq!(Some(&cached), outcome.response());

        // Repeating overwrites without error
        fx.controller.handle_fetch(request.clone()).await.unwrap();
        fx.controller.wait_until_idle().await;
        let count = store
            .requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url == request.url)
            .count();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn fetch_swallows_write_failures() {
        let network = site(Some(r#"{"version":"1.2"}"#))
            .route("chrome-extension://abc/content.js", Response::ok("x"));
        let fx = fixture(network);
        fx.controller.install().await.unwrap();

        let outcome = fx
            .controller
            .handle_fetch(Request::get("chrome-extension://abc/content.js"))
            .await
            .unwrap();
        fx.controller.wait_until_idle().await;

        assert_eq!(outcome.into_response().unwrap().body, b"x");
    }

    #[tokio::test]
    async fn fetch_falls_back_to_cache_when_offline() {
        let caches = Arc::new(MemoryCacheStorage::new());
        let installer = fixture_with(site(Some(r#"{"version":"0.72"}"#)), caches.clone());
        installer.controller.install().await.unwrap();

        // Restarted process with no network: fallback name, served from cache
        let host = Host::new(
            Arc::new(OfflineNetwork),
            caches.clone(),
            Arc::new(LocalScope::new()),
        );
        let restarted = CacheController::resume(&app(), host).unwrap();
        assert_eq!(restarted.state(), WorkerState::Active);

        let hit = restarted
            .handle_fetch(Request::get(url("index.html")))
            .await
            .unwrap();
        assert_eq!(hit, FetchOutcome::Cache(Response::ok("<html>")));

        let miss = restarted
            .handle_fetch(Request::get(url("missing.css")))
            .await
            .unwrap();
        assert_eq!(miss, FetchOutcome::Miss);
    }

    #[tokio::test]
    async fn offline_without_any_cache_is_miss() {
        let host = Host::new(
            Arc::new(OfflineNetwork),
            Arc::new(MemoryCacheStorage::new()),
            Arc::new(LocalScope::new()),
        );
        let controller = CacheController::resume(&app(), host).unwrap();

        let outcome = controller
            .handle_fetch(Request::get(url("index.html")))
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Miss);
    }

    #[tokio::test]
    async fn finished_writes_are_reaped() {
        let network = site(Some(r#"{"version":"1.2"}"#))
            .route(&url("app.js"), Response::ok("console.log(1)"));
        let fx = fixture(network);
        fx.controller.install().await.unwrap();

        for _ in 0..500 {
            fx.controller
                .handle_fetch(Request::get(url("app.js")))
                .await
                .unwrap();
            // Let the spawned write run to completion
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            assert!(fx.controller.pending_writes() <= 2);
        }

        fx.controller.wait_until_idle().await;
        assert_eq!(fx.controller.pending_writes(), 0);
    }

    #[tokio::test]
    async fn broken_storage_on_fallback_is_miss() {
        let host = Host::new(
            Arc::new(OfflineNetwork),
            Arc::new(BrokenStorage),
            Arc::new(LocalScope::new()),
        );
        let controller = CacheController::resume(&app(), host).unwrap();

        let outcome = controller
            .handle_fetch(Request::get(url("index.html")))
            .await
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Miss);
    }

    #[test]
    fn fetch_only_when_installed_or_active() {
        assert!(!WorkerState::Uninstalled.can_handle_fetch());
        assert!(!WorkerState::Installing.can_handle_fetch());
        assert!(WorkerState::Installed.can_handle_fetch());
        assert!(!WorkerState::Activating.can_handle_fetch());
        assert!(WorkerState::Active.can_handle_fetch());
    }

    #[tokio::test]
    async fn fetch_rejected_before_install() {
        let fx = fixture(site(Some("{}")));
        let result = fx.controller.handle_fetch(Request::get(url("index.html"))).await;
        assert!(matches!(result, Err(SwcacheError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn activate_prunes_stale_caches() {
        let caches = Arc::new(MemoryCacheStorage::new());
        for name in ["weight-converter-v0.1", "weight-converter-v0.72"] {
            caches.open(name).await.unwrap();
        }
        let fx = fixture_with(site(Some(r#"{"version":"1.2"}"#)), caches);
        fx.controller.install().await.unwrap();

        let report = fx.controller.activate().await.unwrap();

        assert!(fx.scope.claimed());
        assert_eq!(report.kept, "weight-converter-v1.2");
        assert_eq!(
            report.deleted,
            vec!["weight-converter-v0.1", "weight-converter-v0.72"]
        );
        assert_eq!(
            fx.caches.keys().await.unwrap(),
            vec!["weight-converter-v1.2"]
        );
        assert_eq!(fx.controller.state(), WorkerState::Active);
    }

    #[tokio::test]
    async fn activate_twice_is_noop() {
        let fx = fixture(site(Some(r#"{"version":"1.2"}"#)));
        fx.controller.install().await.unwrap();
        fx.controller.activate().await.unwrap();

        let report = fx.controller.activate().await.unwrap();

        assert!(report.is_noop());
        assert_eq!(
            fx.caches.keys().await.unwrap(),
            vec!["weight-converter-v1.2"]
        );
    }

    #[tokio::test]
    async fn activate_requires_install() {
        let fx = fixture(site(Some("{}")));
        let result = fx.controller.activate().await;
        assert!(matches!(result, Err(SwcacheError::InvalidState { .. })));
    }

    /// Storage whose deletion of one named store always fails
    struct StubbornStorage {
        inner: MemoryCacheStorage,
        stuck: &'static str,
    }

    #[async_trait]
    impl CacheStorage for StubbornStorage {
        async fn open(&self, name: &str) -> SwcacheResult<Arc<dyn CacheStore>> {
            self.inner.open(name).await
        }

        async fn has(&self, name: &str) -> SwcacheResult<bool> {
            self.inner.has(name).await
        }

        async fn keys(&self) -> SwcacheResult<Vec<String>> {
            self.inner.keys().await
        }

        async fn delete(&self, name: &str) -> SwcacheResult<bool> {
            if name == self.stuck {
                return Err(SwcacheError::store(name, "permission denied"));
            }
            self.inner.delete(name).await
        }

        fn backend_name(&self) -> &'static str {
            "stubborn"
        }
    }

    /// Storage whose every operation fails
    struct BrokenStorage;

    #[async_trait]
    impl CacheStorage for BrokenStorage {
        async fn open(&self, name: &str) -> SwcacheResult<Arc<dyn CacheStore>> {
            Err(SwcacheError::store(name, "disk unavailable"))
        }

        async fn has(&self, name: &str) -> SwcacheResult<bool> {
            Err(SwcacheError::store(name, "disk unavailable"))
        }

        async fn keys(&self) -> SwcacheResult<Vec<String>> {
            Err(SwcacheError::store("*", "disk unavailable"))
        }

        async fn delete(&self, name: &str) -> SwcacheResult<bool> {
            Err(SwcacheError::store(name, "disk unavailable"))
        }

        fn backend_name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn failed_deletion_does_not_block_others() {
        let storage = StubbornStorage {
            inner: MemoryCacheStorage::new(),
            stuck: "weight-converter-v0.1",
        };
        for name in ["weight-converter-v0.1", "weight-converter-v0.2", "weight-converter-v0.72"] {
            storage.open(name).await.unwrap();
        }
        let storage = Arc::new(storage);
        let host = Host::new(
            Arc::new(OfflineNetwork),
            storage.clone(),
            Arc::new(LocalScope::new()),
        );
        let controller = CacheController::resume(&app(), host).unwrap();

        let report = controller.activate().await.unwrap();

        assert_eq!(report.kept, "weight-converter-v0.72");
        assert_eq!(report.deleted, vec!["weight-converter-v0.2"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "weight-converter-v0.1");
        assert_eq!(controller.state(), WorkerState::Active);
    }

    #[tokio::test]
    async fn resumed_worker_keeps_only_fallback_cache() {
        let caches = Arc::new(MemoryCacheStorage::new());
        for name in ["weight-converter-v0.1", "weight-converter-v0.72", "weight-converter-v1.2"] {
            caches.open(name).await.unwrap();
        }
        let host = Host::new(Arc::new(OfflineNetwork), caches.clone(), Arc::new(LocalScope::new()));
        let controller = CacheController::resume(&app(), host).unwrap();

        assert_eq!(
            controller.stale_caches().await.unwrap(),
            vec!["weight-converter-v0.1", "weight-converter-v1.2"]
        );
    }

    #[test]
    fn invalid_scope_rejected() {
        let app = AppConfig {
            scope: "localhost".to_string(),
            ..AppConfig::default()
        };
        let host = Host::new(
            Arc::new(OfflineNetwork),
            Arc::new(MemoryCacheStorage::new()),
            Arc::new(LocalScope::new()),
        );
        assert!(matches!(
            CacheController::new(&app, host),
            Err(SwcacheError::InvalidScope(_))
        ));
    }
}
