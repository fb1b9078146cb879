//! Error types for the multivariate normal sampler.

use thiserror::Error;

/// Errors raised while building or drawing from a
/// [`MultivariateNormal`](super::MultivariateNormal).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SamplerError {
    /// Covariance matrix is not square.
    #[error("Covariance matrix is {rows}x{cols}, expected square")]
    NotSquare {
        /// Row count
        rows: usize,
        /// Column count
        cols: usize,
    },

    /// Covariance matrix has a NaN or infinite entry.
    #[error("Covariance matrix has non-finite entries")]
    NonFinite,

    /// Covariance matrix has a materially negative eigenvalue.
    #[error("Covariance matrix is not positive semi-definite: eigenvalue {eigenvalue:e}")]
    NotPositiveSemiDefinite {
        /// Smallest eigenvalue
        eigenvalue: f64,
    },

    /// Fewer independent variates than the rank.
    #[error("Insufficient variates: {provided} provided, rank {required}")]
    InsufficientVariates {
        /// Rank of the sampler
        required: usize,
        /// Variates supplied
        provided: usize,
    },

    /// Output buffer length differs from the dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the sampler
        expected: usize,
        /// Buffer length supplied
        actual: usize,
    },
}
