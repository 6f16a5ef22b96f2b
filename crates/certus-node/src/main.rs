//! Certus registry node — entry point.
//!
//! Applies one registry operation per invocation against a local data
//! directory, standing in for the hosting ledger's call dispatch. The height
//! the host chain reports for the call is passed with `--height`.

mod commands;
mod config;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::Command;
use config::CertusConfig;

/// Certus KYC registry node
#[derive(Parser, Debug)]
#[command(name = "certus-node", version, about = "Certus KYC registry node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "certus.toml")]
    config: PathBuf,

    /// Height reported by the host chain for this call.
    #[arg(long, default_value_t = 0)]
    height: u64,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration and apply CLI overrides
    let mut config = CertusConfig::load(&args.config)?;
    if let Some(ref data_dir) = args.data_dir {
        config.registry.data_dir = data_dir.clone();
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Handle init before touching the data directory
    if let Command::Init = args.command {
        let config = CertusConfig::default();
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    commands::execute(args.command, &config, args.height)
}
