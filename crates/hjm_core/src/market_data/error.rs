//! Errors raised by initial discount curves.

use crate::types::PricingError;
use thiserror::Error;

/// Discount curve construction and query errors.
///
/// Curves are functions of time measured from today, so every query before
/// today and every empty accrual interval is rejected. Pillar curves also
/// reject malformed pillars and, without extrapolation, queries past the
/// last pillar.
///
/// # Examples
///
/// ```
/// use hjm_core::market_data::{DiscountCurve, MarketDataError, YieldCurve};
///
/// let curve = DiscountCurve::flat(0.02);
/// assert_eq!(
///     curve.discount_factor(-1.0),
///     Err(MarketDataError::NegativeTime { t: -1.0 })
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Curve queried before today.
    #[error("Curve queried at negative time {t}")]
    NegativeTime {
        /// Queried time
        t: f64,
    },

    /// Rate requested over an interval that does not move forward in time.
    #[error("Empty rate interval [{start}, {end}]")]
    EmptyInterval {
        /// Interval start
        start: f64,
        /// Interval end
        end: f64,
    },

    /// Pillar curve built without pillars.
    #[error("Curve has no pillars")]
    NoPillars,

    /// One rate per tenor is required.
    #[error("Curve has {tenors} tenors but {rates} rates")]
    PillarMismatch {
        /// Number of tenors
        tenors: usize,
        /// Number of rates
        rates: usize,
    },

    /// Tenors must be positive and strictly increasing.
    #[error("Pillar {index} at {tenor} does not follow the previous pillar")]
    UnorderedPillar {
        /// Index of the offending pillar
        index: usize,
        /// Tenor of the offending pillar
        tenor: f64,
    },

    /// Zero rate that cannot produce a discount factor.
    #[error("Non-finite zero rate {rate}")]
    NonFiniteRate {
        /// Offending rate
        rate: f64,
    },

    /// Query past the last pillar of a curve that does not extrapolate.
    #[error("Time {t} is beyond the last pillar {last}")]
    BeyondLastPillar {
        /// Queried time
        t: f64,
        /// Tenor of the last pillar
        last: f64,
    },
}

impl From<MarketDataError> for PricingError {
    fn from(err: MarketDataError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            MarketDataError::NegativeTime { t: -1.5 }.to_string(),
            "Curve queried at negative time -1.5"
        );
        assert_eq!(
            MarketDataError::PillarMismatch { tenors: 3, rates: 2 }.to_string(),
            "Curve has 3 tenors but 2 rates"
        );
        assert_eq!(
            MarketDataError::BeyondLastPillar { t: 12.0, last: 10.0 }.to_string(),
            "Time 12 is beyond the last pillar 10"
        );
    }

    #[test]
    fn test_into_pricing_error() {
        let pricing_err: PricingError = MarketDataError::UnorderedPillar {
            index: 2,
            tenor: 0.5,
        }
        .into();
        match pricing_err {
            PricingError::InvalidInput(msg) => assert!(msg.contains("Pillar 2")),
            _ => panic!("Expected InvalidInput variant"),
        }
    }
}
