//! List command - show cache stores

use super::disk_storage;
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::SwcacheResult;
use crate::host::CacheStorage;
use crate::ui::{self, UiContext};
use crate::worker::CacheNaming;
use console::style;
use serde::Serialize;

/// One row of the listing
#[derive(Debug, Serialize)]
struct StoreSummary {
    name: String,
    entries: usize,
    active: bool,
}

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> SwcacheResult<()> {
    let storage = disk_storage(config);
    let active = CacheNaming::from_config(&config.app).fallback_name();

    let mut stores = vec![];
    for name in storage.keys().await? {
        let entries = storage.open(&name).await?.requests().await?.len();
        stores.push(StoreSummary {
            active: name == active,
            name,
            entries,
        });
    }

    if stores.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No cache stores");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&stores),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stores)?),
        OutputFormat::Plain => {
            for store in &stores {
                println!("{}", store.name);
            }
        }
    }

    Ok(())
}

fn print_table(stores: &[StoreSummary]) {
    println!(
        "{:<36} {:<8} {:<10}",
        style("CACHE").bold(),
        style("ENTRIES").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(56));

    for store in stores {
        let status = if store.active {
            style("active").green()
        } else {
            style("stale").dim()
        };
        println!("{:<36} {:<8} {:<10}", store.name, store.entries, status);
    }

    println!();
    println!("{} cache(s)", stores.len());
}
