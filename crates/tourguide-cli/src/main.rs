//! Tourguide CLI Application
//!
//! Simulates page loads against the guided-tour orchestrator, one page view
//! per invocation.

mod args;
mod cli;
mod page;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use page::Page;
use renderer::TerminalRenderer;
use tourguide_core::{OrchestratorBuilder, OrchestratorConfig, RouteTable, TourCatalog};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        storage_file,
        session,
        catalog,
        routes,
        wait_timeout_ms,
        reset_shortcut,
        no_color,
        command,
    } = Args::parse();

    let mut config = OrchestratorConfig::default();
    if let Some(millis) = wait_timeout_ms {
        config = config.with_wait_timeout_ms(millis);
    }
    if let Some(combo) = reset_shortcut {
        config.reset_shortcut = combo;
    }

    let mut builder = OrchestratorBuilder::new()
        .with_storage_path(storage_file)
        .with_session(session)
        .with_config(config);
    if let Some(path) = catalog {
        let catalog = TourCatalog::from_path(&path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?;
        builder = builder.with_catalog(catalog);
    }
    if let Some(path) = routes {
        let routes = RouteTable::from_path(&path)
            .with_context(|| format!("Failed to load routes from {}", path.display()))?;
        builder = builder.with_routes(routes);
    }

    let page = Page::open(builder).await?;
    let renderer = TerminalRenderer::new(!no_color);

    info!("Tourguide started");

    Cli::new(page, renderer)
        .handle(command.unwrap_or(Commands::Status))
        .await
}
