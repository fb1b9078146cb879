//! Yield curve trait definition.

use crate::market_data::error::MarketDataError;

/// Time-0 discount curve contract.
///
/// # Contract
///
/// - `discount_factor(t)` returns the discount factor D(t) for maturity t
/// - `zero_rate(t)` returns the continuously compounded zero rate r(t)
/// - `forward_rate(t1, t2)` returns the forward rate between t1 and t2
///
/// # Invariants
///
/// - D(0) = 1
/// - D(t) > 0 for all t >= 0
/// - Queries with t < 0 fail with `MarketDataError::NegativeTime`
///
/// # Example
///
/// ```
/// use hjm_core::market_data::curves::{FlatCurve, YieldCurve};
///
/// let curve = FlatCurve::new(0.05);
///
/// let df = curve.discount_factor(1.0).unwrap();
/// assert!((df - 0.951229).abs() < 1e-5);
///
/// let fwd = curve.forward_rate(1.0, 2.0).unwrap();
/// assert!((fwd - 0.05).abs() < 1e-10);
/// ```
pub trait YieldCurve {
    /// Return the discount factor for maturity `t`.
    ///
    /// # Returns
    ///
    /// * `Ok(D(t))` - Discount factor at time t
    /// * `Err(MarketDataError::NegativeTime)` - If t < 0
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError>;

    /// Return the continuously compounded zero rate for maturity `t`.
    ///
    /// ```text
    /// r(t) = -ln(D(t)) / t
    /// ```
    fn zero_rate(&self, t: f64) -> Result<f64, MarketDataError> {
        if t <= 0.0 {
            return Err(MarketDataError::EmptyInterval { start: 0.0, end: t });
        }
        let df = self.discount_factor(t)?;
        Ok(-df.ln() / t)
    }

    /// Return the continuously compounded forward rate between t1 and t2.
    ///
    /// ```text
    /// f(t1, t2) = -ln(D(t2) / D(t1)) / (t2 - t1)
    /// ```
    fn forward_rate(&self, t1: f64, t2: f64) -> Result<f64, MarketDataError> {
        let dt = t2 - t1;
        if dt <= 0.0 {
            return Err(MarketDataError::EmptyInterval { start: t1, end: t2 });
        }
        let df1 = self.discount_factor(t1)?;
        let df2 = self.discount_factor(t2)?;
        Ok(-(df2 / df1).ln() / dt)
    }

    /// Return the forward discount factor D(t2) / D(t1).
    fn forward_discount(&self, t1: f64, t2: f64) -> Result<f64, MarketDataError> {
        Ok(self.discount_factor(t2)? / self.discount_factor(t1)?)
    }
}
