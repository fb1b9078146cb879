//! Error types for world simulation.

use hjm_models::volatility::VolatilityError;
use hjm_models::ModelError;
use thiserror::Error;

use crate::mvn::SamplerError;

/// Errors raised by [`GaussMarkovWorld`](super::GaussMarkovWorld).
///
/// All errors are fatal to the call. A failed `set_timeline` or
/// `set_numeraire` leaves the previous timeline and drifts in place.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorldError {
    /// Propagation requested before a timeline was set.
    #[error("Timeline not set")]
    TimelineNotSet,

    /// Timeline does not start at zero, is not strictly increasing, or has
    /// fewer than two points.
    #[error("Invalid timeline: {0}")]
    InvalidTimeline(String),

    /// Driving variates do not cover every step or the sampler rank.
    #[error(
        "Insufficient random variates: need {steps} steps x {rank} variates, got {rows} x {cols}"
    )]
    InsufficientRandoms {
        /// Steps in the timeline
        steps: usize,
        /// Maximum sampler rank
        rank: usize,
        /// Rows supplied
        rows: usize,
        /// Columns supplied
        cols: usize,
    },

    /// Inputs or buffers have inconsistent sizes.
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being sized
        what: &'static str,
        /// Expected size
        expected: usize,
        /// Supplied size
        actual: usize,
    },

    /// Reportable selector or target outside the world.
    #[error("Invalid reportable: {0}")]
    InvalidReportable(String),

    /// Numeraire outside the world.
    #[error("Invalid numeraire: {0}")]
    InvalidNumeraire(String),

    /// Covariance decomposition or draw failed.
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    /// Closed-form model error while pricing a reportable.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Volatility integral failed while assembling covariances or drifts.
    #[error(transparent)]
    Volatility(#[from] VolatilityError),
}
