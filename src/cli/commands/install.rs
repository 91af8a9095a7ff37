//! Install command - derive the cache name and precache assets

use super::{activate::print_report, cli_host};
use crate::cli::args::InstallArgs;
use crate::config::Config;
use crate::error::SwcacheResult;
use crate::ui::{self, UiContext};
use crate::worker::{CacheController, NameSource};

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> SwcacheResult<()> {
    let ctx = UiContext::detect();
    let controller = CacheController::new(&config.app, cli_host(config, false))?;

    ui::intro(&ctx, "swcache install");
    ui::key_value(&ctx, "scope", &config.app.scope);

    let report = match controller.install().await {
        Ok(report) => report,
        Err(e) => {
            ui::step_error_detail(&ctx, "Install failed", &e.to_string());
            return Err(e);
        }
    };

    if let NameSource::Fallback(reason) = &report.source {
        ui::step_warn_hint(
            &ctx,
            &format!("Version descriptor unavailable: {}", reason),
            "Using app.fallback_version",
        );
    }
    ui::step_ok_detail(
        &ctx,
        &format!("Precached {} assets", report.assets),
        &report.cache_name,
    );

    if args.activate {
        let activation = controller.activate().await?;
        print_report(&ctx, &activation);
    }

    ui::outro_success(&ctx, &format!("Active cache: {}", controller.current_cache_name()));
    Ok(())
}
