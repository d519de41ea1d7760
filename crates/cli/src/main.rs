use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use vetogest_cli::{Banner, Settings};
use vetogest_core::tracing::{InstrumentationConfig, init_tracing};
use vetogest_http::{AuthSession, VetoClientBuilder};

mod commands;

use commands::Commands;

/// VetoGest - veterinary customer records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    let instrumentation_config = InstrumentationConfig::default()
        .with_service_name("vetogest-cli")
        .with_log_level(settings.log_level.clone());
    init_tracing(&instrumentation_config)?;
    debug!(token_file = %settings.storage.token_file.display(), "Settings loaded");

    let tokens = settings.token_store().context("Failed to open token store")?;
    let builder = VetoClientBuilder::from_config(&settings.api)?.token_store(tokens);
    let session = AuthSession::new(builder)?;
    info!(base_url = session.client().base_url(), "Client ready");

    let banner = commands::run(cli.command, &session).await?;
    Ok(report(&banner))
}

fn report(banner: &Banner) -> ExitCode {
    if banner.is_success() {
        println!("{banner}");
        ExitCode::SUCCESS
    } else {
        eprintln!("{banner}");
        ExitCode::FAILURE
    }
}
