//! Error types for the model layer.
//!
//! This module provides:
//! - `ModelError`: Errors raised by closed-form analytics and economies

use hjm_core::market_data::MarketDataError;
use hjm_core::types::{PricingError, SolverError};
use thiserror::Error;

use crate::volatility::VolatilityError;

/// Errors raised by the model layer.
///
/// Lower-level errors are wrapped transparently so their messages survive.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Volatility function error (unsupported pair, mismatch, extrapolation).
    #[error(transparent)]
    Volatility(#[from] VolatilityError),

    /// Discount curve error.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Break-even search failed to converge.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Invalid instrument or model input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Closed form not available for this configuration.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl From<ModelError> for PricingError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Volatility(inner) => inner.into(),
            ModelError::MarketData(inner) => inner.into(),
            ModelError::Solver(inner) => inner.into(),
            ModelError::InvalidInput(_) => PricingError::InvalidInput(err.to_string()),
            ModelError::Unsupported(_) => PricingError::Unsupported(err.to_string()),
        }
    }
}
