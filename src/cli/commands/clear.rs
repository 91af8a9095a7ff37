//! Clear command - delete every cache store

use super::disk_storage;
use crate::cli::args::ClearArgs;
use crate::config::Config;
use crate::error::SwcacheResult;
use crate::host::CacheStorage;
use crate::ui::{self, UiContext};
use tracing::debug;

/// Execute the clear command
pub async fn execute(args: ClearArgs, config: &Config) -> SwcacheResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let storage = disk_storage(config);
    let names = storage.keys().await?;

    if names.is_empty() {
        ui::step_info(&ctx, "No cache stores to clear");
        return Ok(());
    }

    ui::step_info(&ctx, &format!("This will delete {} cache store(s):", names.len()));
    for name in &names {
        ui::key_value(&ctx, "cache", name);
    }

    if !ui::confirm(&ctx, "Delete these caches?", false).await? {
        ui::step_warn_hint(&ctx, "Aborted", "Pass --yes to skip confirmation");
        return Ok(());
    }

    let mut removed = 0;
    for name in &names {
        debug!("Deleting cache store {}", name);
        if storage.delete(name).await? {
            removed += 1;
        }
    }

    ui::step_ok(&ctx, &format!("Cleared {} cache store(s)", removed));
    Ok(())
}
