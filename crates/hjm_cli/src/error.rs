//! CLI error types.

use hjm_core::market_data::MarketDataError;
use hjm_models::volatility::VolatilityError;
use hjm_models::ModelError;
use hjm_pricing::mc::ConfigError;
use hjm_pricing::world::WorldError;
use thiserror::Error;

/// Errors raised by the `hjm` commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Volatility(#[from] VolatilityError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    MonteCarlo(#[from] ConfigError),
}

/// Result alias for the CLI.
pub type Result<T> = std::result::Result<T, CliError>;
