//! Registrar - extract company founding facts from text into a database.

use anyhow::Context;
use clap::Parser;
use registrar_cli::{commands, Cli, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .layered(|key| std::env::var(key).ok(), &cli.overrides())
        .context("failed to apply environment overrides")?;

    init_tracing(&config.output.log_level);

    let command = cli.command();
    config.validate_for(command)?;

    let formatter = Formatter::new(config.output.format, config.output.color);

    commands::execute(command, &config, &formatter).await?;

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("registrar=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
