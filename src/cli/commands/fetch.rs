//! Fetch command - network first, active cache as fallback

use super::cli_host;
use crate::cli::args::FetchArgs;
use crate::config::Config;
use crate::error::{SwcacheError, SwcacheResult};
use crate::host::{resolve_url, Request};
use crate::worker::{CacheController, FetchOutcome};
use std::io::{self, Write};
use tokio::fs;
use tracing::info;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> SwcacheResult<()> {
    let controller = CacheController::resume(&config.app, cli_host(config, args.offline))?;
    let url = resolve_url(&config.app.scope, &args.url)?;

    let outcome = controller.handle_fetch(Request::get(url.as_str())).await?;
    controller.wait_until_idle().await;

    let response = match outcome {
        FetchOutcome::Miss => {
            return Err(SwcacheError::User(format!(
                "{} is unreachable and not cached in {}",
                url,
                controller.current_cache_name()
            )));
        }
        FetchOutcome::Network(ref response) | FetchOutcome::Cache(ref response) => response,
    };
    info!(
        "{} {} from {} ({} bytes)",
        response.status,
        url,
        outcome.source(),
        response.body.len()
    );

    match args.output {
        Some(path) => fs::write(&path, &response.body)
            .await
            .map_err(|e| SwcacheError::io(format!("writing {}", path.display()), e))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&response.body)
                .and_then(|()| stdout.flush())
                .map_err(|e| SwcacheError::io("writing to stdout", e))?;
        }
    }

    Ok(())
}
