//! swcache - Offline asset cache manager
//!
//! Keeps a version-named cache of a static web app's assets: precaches on
//! install, serves network-first with cache fallback, and prunes caches from
//! older versions on activation.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod ui;
pub mod worker;

pub use error::{SwcacheError, SwcacheResult};
pub use worker::{CacheController, WorkerState};
