//! CLI command implementations
//!
//! Each command acts as the host for one worker process instance: a disk
//! cache storage under the configured cache directory, the HTTP network
//! (or an offline one), and a local scope with no pages to claim.

pub mod activate;
pub mod clear;
pub mod config;
pub mod fetch;
pub mod install;
pub mod list;
pub mod status;

pub use activate::execute as activate;
pub use clear::execute as clear;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use install::execute as install;
pub use list::execute as list;
pub use status::execute as status;

use crate::config::{Config, ConfigManager};
use crate::host::{DiskCacheStorage, Host, HttpNetwork, LocalScope, Network, OfflineNetwork};
use std::sync::Arc;
use tracing::debug;

/// Disk storage at the configured cache directory
pub(crate) fn disk_storage(config: &Config) -> Arc<DiskCacheStorage> {
    let root = ConfigManager::cache_dir(config);
    debug!("Cache storage at {}", root.display());
    Arc::new(DiskCacheStorage::new(root))
}

/// Host collaborators for a CLI-driven worker
pub(crate) fn cli_host(config: &Config, offline: bool) -> Host {
    let network: Arc<dyn Network> = if offline {
        Arc::new(OfflineNetwork)
    } else {
        Arc::new(HttpNetwork::new(&config.network))
    };
    Host::new(network, disk_storage(config), Arc::new(LocalScope::new()))
}
