//! gymwatch - local workout logging CLI
//!
//! Main entry point for the gymwatch application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gymwatch::cli::Cli;
use gymwatch::commands;
use gymwatch::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("gymwatch.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Mirror the resolved storage path into GYMWATCH_DB so the store
    // initializer picks it up without threading the config through.
    if let Some(db_path) = &config.storage.path {
        std::env::set_var("GYMWATCH_DB", db_path);
        tracing::debug!("Using storage override: {}", db_path.display());
    }

    commands::run(cli.command, &config).await
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gymwatch=debug" } else { "gymwatch=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
