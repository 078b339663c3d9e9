//! Serve command - run the local JSON HTTP API.

use std::path::Path;

use colored::Colorize;
use xmlsheet::Catalog;

use super::load_source;
use crate::server::{app, state::AppState};

pub fn run(
    store: &Path,
    source: Option<&str>,
    port: u16,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = Catalog::open(store)?;

    // Load before the runtime starts; URL fetches are blocking
    if let Some(source) = source {
        load_source(&mut catalog, source)?;
        if verbose {
            println!("Loaded {} records from {}", catalog.records().len(), source);
        }
    }

    let state = AppState::new(catalog);

    let url = format!("http://localhost:{}/api/catalog", port);
    println!();
    println!(
        "{} {}",
        "Starting xmlsheet API at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  Store: {}", store.display());
    if let Some(source) = source {
        println!("  Catalog: {}", source);
    }
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            println!();
            println!("{}", "Shutting down...".yellow());
            std::process::exit(0);
        });

        app::run_server(state, port).await
    })?;

    Ok(())
}
