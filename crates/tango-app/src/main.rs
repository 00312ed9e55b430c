use std::sync::Arc;

use clap::Parser;
use tango_config::Config;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod cli;
mod controller;
mod events;
mod print;
mod state;

#[cfg(test)]
mod tests;

use self::cli::Cli;
use self::controller::AppController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Results go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };

    let controller = Arc::new(AppController::new(config));

    // Shutdown future (Ctrl+C)
    let shutdown = controller.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested");
                shutdown.shutdown();
            }
            Err(e) => tracing::error!("failed to listen for ctrl+c: {e}"),
        }
    });

    controller.run(cli.command).await
}
