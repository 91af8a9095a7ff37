//! Status command - configuration, active cache and version drift
//!
//! The fallback version has to match the deployed version descriptor, or a
//! restarted worker keeps (and prunes toward) the wrong cache. Nothing at
//! runtime detects that drift, so this command checks it explicitly.

use super::cli_host;
use crate::config::Config;
use crate::error::SwcacheResult;
use crate::ui::{self, UiContext};
use crate::worker::{CacheController, NameSource};

/// Drift between the fallback name and what the descriptor declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    /// Descriptor and fallback agree
    InSync,
    /// Descriptor declares a different name
    Diverged { deployed: String },
    /// Descriptor could not be checked
    Unknown(String),
}

/// Compare the fallback name against a resolved descriptor name
pub fn detect_drift(fallback: &str, deployed: &str, source: &NameSource) -> Drift {
    match source {
        NameSource::Fallback(reason) => Drift::Unknown(reason.clone()),
        NameSource::Descriptor | NameSource::MissingField if deployed == fallback => Drift::InSync,
        NameSource::Descriptor | NameSource::MissingField => Drift::Diverged {
            deployed: deployed.to_string(),
        },
    }
}

/// Execute the status command
pub async fn execute(config: &Config) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    let host = cli_host(config, false);
    let caches = host.caches.clone();
    let controller = CacheController::resume(&config.app, host)?;

    ui::intro(&ctx, "swcache status");

    ui::key_value(&ctx, "scope", &config.app.scope);
    ui::key_value(&ctx, "storage", caches.backend_name());
    let fallback = controller.current_cache_name();
    ui::key_value(&ctx, "fallback cache", &fallback);

    if caches.has(&fallback).await? {
        let entries = caches.open(&fallback).await?.requests().await?.len();
        ui::key_value_status(&ctx, "fallback store", &format!("{} entries", entries), true);
    } else {
        ui::key_value_status(&ctx, "fallback store", "missing", false);
    }

    let stale = controller.stale_caches().await?;
    ui::key_value_status(
        &ctx,
        "stale caches",
        &stale.len().to_string(),
        stale.is_empty(),
    );

    let resolved = controller.probe_cache_name().await;
    match detect_drift(&fallback, &resolved.name, &resolved.source) {
        Drift::InSync => ui::step_ok(&ctx, "Version descriptor matches fallback version"),
        Drift::Diverged { deployed } => ui::step_warn_hint(
            &ctx,
            &format!("Deployed descriptor names {}, fallback is {}", deployed, fallback),
            "Update app.fallback_version to match",
        ),
        Drift::Unknown(reason) => ui::step_warn(
            &ctx,
            &format!("Could not check version descriptor: {}", reason),
        ),
    }

    Ok(())
}
