//! grove — entry point for managing directory and OS groups.

mod commands;
mod config;
mod logging;
mod sync;

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Command;
use crate::config::{GroveConfig, LogFormat};

#[derive(Parser)]
#[command(name = "grove", about = "Directory-backed and local OS group management")]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, env = "GROVE_CONFIG")]
    config: Option<PathBuf>,

    /// Log output format; overrides the configuration file.
    #[arg(long, value_enum, env = "GROVE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = GroveConfig::load(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
    logging::init_tracing(&config.log)?;

    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "Loaded configuration");
    }

    commands::run(cli.command, &config).await
}
