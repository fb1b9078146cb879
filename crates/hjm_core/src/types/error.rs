//! Error types for the Gaussian HJM engine.
//!
//! This module provides:
//! - `PricingError`: Categorised errors surfaced by closed-form pricing
//! - `SolverError`: Errors from root-finding solvers

use std::fmt;
use thiserror::Error;

/// Categorised pricing errors.
///
/// Every lower-level error (market data, solver, volatility) converts into
/// one of these categories so that callers composing several layers can
/// work with a single type.
///
/// # Variants
/// - `InvalidInput`: Malformed curve, volatility or contract parameters
/// - `NumericalInstability`: A break-even search failed to converge
/// - `Unsupported`: Closed form not available, e.g. too many active factors
///
/// # Examples
/// ```
/// use hjm_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("Negative strike".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: Negative strike");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Invalid input data or parameters
    InvalidInput(String),

    /// Numerical instability during computation
    NumericalInstability(String),

    /// Operation not supported
    Unsupported(String),
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PricingError::NumericalInstability(msg) => {
                write!(f, "Numerical instability: {}", msg)
            }
            PricingError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for PricingError {}

/// Root-finding solver errors.
///
/// # Examples
/// ```
/// use hjm_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },
}

impl From<SolverError> for PricingError {
    fn from(err: SolverError) -> Self {
        PricingError::NumericalInstability(err.to_string())
    }
}
