//! Activate command - prune caches other than the active one
//!
//! A fresh process never ran install, so the kept cache is the one named by
//! the fallback version. Use `install --activate` to activate the cache a
//! just-finished install populated.

use super::cli_host;
use crate::cli::args::ActivateArgs;
use crate::config::Config;
use crate::error::SwcacheResult;
use crate::ui::{self, UiContext};
use crate::worker::{ActivationReport, CacheController};

/// Execute the activate command
pub async fn execute(args: ActivateArgs, config: &Config) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    // Activation never touches the network
    let controller = CacheController::resume(&config.app, cli_host(config, true))?;

    ui::intro(&ctx, "swcache activate");
    ui::key_value(&ctx, "keep", &controller.current_cache_name());

    if args.dry_run {
        let stale = controller.stale_caches().await?;
        if stale.is_empty() {
            ui::step_info(&ctx, "No stale caches");
        }
        for name in &stale {
            ui::step_info(&ctx, &format!("Would delete {}", name));
        }
        return Ok(());
    }

    let report = controller.activate().await?;
    print_report(&ctx, &report);
    Ok(())
}

/// Print the outcome of an activation
pub(crate) fn print_report(ctx: &UiContext, report: &ActivationReport) {
    if report.is_noop() {
        ui::step_info(ctx, "No stale caches");
        return;
    }
    for name in &report.deleted {
        ui::step_ok(ctx, &format!("Deleted {}", name));
    }
    for (name, reason) in &report.failed {
        ui::step_error_detail(ctx, &format!("Could not delete {}", name), reason);
    }
}
