//! HJM CLI - Command Line Operations for the Gaussian HJM Engine
//!
//! Loads a TOML world description (economies, exchange rates, simulation
//! settings and quotes) and runs it through the engine.
//!
//! # Commands
//!
//! - `hjm check` - Build the world and report its state layout and covariance ranks
//! - `hjm price` - Price the configured quotes in closed form and by simulation
//!
//! # Architecture
//!
//! As the service layer above `hjm_core`, `hjm_models` and `hjm_pricing`,
//! this crate only parses input, wires the layers and prints results.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{LogLevel, WorldConfig};

/// Multi-currency Gaussian HJM engine CLI
#[derive(Parser)]
#[command(name = "hjm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// World description file path
    #[arg(short, long, global = true, default_value = "hjm.toml")]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the world and report state layout and covariance ranks
    Check,

    /// Price the configured quotes in closed form and by simulation
    Price {
        /// Number of Monte Carlo paths, overriding the file
        #[arg(short = 'n', long)]
        num_paths: Option<usize>,
    },
}

fn init_tracing(log_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = WorldConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let log_level = match (&cli.log_level, cli.verbose) {
        (Some(level), _) => LogLevel::from_str(level)?,
        (None, true) => LogLevel::Debug,
        (None, false) => config.log_level,
    };
    init_tracing(log_level);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Check => commands::check::run(&config),
        Commands::Price { num_paths } => commands::price::run(&config, num_paths),
    }
    .context("command failed")
}
