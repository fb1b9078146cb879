//! Flat yield curve implementation.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;

/// Flat yield curve with constant continuously compounded rate.
///
/// # Example
///
/// ```
/// use hjm_core::market_data::curves::{FlatCurve, YieldCurve};
///
/// let curve = FlatCurve::new(0.05);
/// let df = curve.discount_factor(1.0).unwrap();
/// assert!((df - 0.951229).abs() < 1e-5);
/// assert_eq!(curve.zero_rate(5.0).unwrap(), 0.05);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatCurve {
    rate: f64,
}

impl FlatCurve {
    /// Construct a flat curve with the given constant rate.
    #[inline]
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    /// Return the constant rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl YieldCurve for FlatCurve {
    #[inline]
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        if t < 0.0 {
            return Err(MarketDataError::NegativeTime { t });
        }
        Ok((-self.rate * t).exp())
    }

    #[inline]
    fn zero_rate(&self, t: f64) -> Result<f64, MarketDataError> {
        if t < 0.0 {
            return Err(MarketDataError::NegativeTime { t });
        }
        Ok(self.rate)
    }

    #[inline]
    fn forward_rate(&self, t1: f64, t2: f64) -> Result<f64, MarketDataError> {
        if t1 < 0.0 {
            return Err(MarketDataError::NegativeTime { t: t1 });
        }
        if t2 <= t1 {
            return Err(MarketDataError::EmptyInterval { start: t1, end: t2 });
        }
        Ok(self.rate)
    }
}
