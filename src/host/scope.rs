//! Worker scope control primitives

use crate::error::SwcacheResult;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Lifecycle control the host exposes to the worker
#[async_trait]
pub trait WorkerScope: Send + Sync {
    /// Take effect immediately instead of waiting for old instances to close
    fn skip_waiting(&self);

    /// Take control of every open client under this scope
    async fn claim_clients(&self) -> SwcacheResult<()>;
}

/// Scope for a host with no pages of its own (CLI, tests).
///
/// Records which primitives were invoked.
#[derive(Debug, Default)]
pub struct LocalScope {
    skipped_waiting: AtomicBool,
    claimed: AtomicBool,
}

impl LocalScope {
    /// Create a fresh scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `skip_waiting` has been called
    pub fn skipped_waiting(&self) -> bool {
        self.skipped_waiting.load(Ordering::SeqCst)
    }

    /// Whether `claim_clients` has been called
    pub fn claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerScope for LocalScope {
    fn skip_waiting(&self) {
        debug!("Skipping waiting phase");
        self.skipped_waiting.store(true, Ordering::SeqCst);
    }

    async fn claim_clients(&self) -> SwcacheResult<()> {
        debug!("Claiming clients");
        self.claimed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
