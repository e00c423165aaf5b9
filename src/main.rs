use anyhow::Context;
use clap::Parser;

use coinops::{
    arguments::Cli,
    commands,
    config,
    logger::{self, LogTag},
};

/// Main entry point for CoinOps
///
/// Load `.env`, parse arguments, load config, initialize logging, then hand
/// off to the selected subcommand.
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Missing .env is normal outside development
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    logger::init(
        &config.logging.level,
        &config.logging.format,
        cli.debug,
        cli.verbose,
    );
    logger::debug(
        LogTag::Config,
        &format!("Configuration loaded from {}", config.source),
    );

    commands::dispatch(cli, config).await?;
    Ok(())
}
