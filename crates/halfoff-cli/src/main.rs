use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod capture_log;
mod extract;
mod report;

#[derive(Debug, Parser)]
#[command(name = "halfoff")]
#[command(about = "Clearance extraction over saved page snapshots and capture logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract deep-discount products from one store's page artifacts.
    Extract(extract::ExtractArgs),
}

fn main() -> anyhow::Result<()> {
    let config = halfoff_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => extract::run(&args, &config),
    }
}
