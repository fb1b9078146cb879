//! Static dispatch over the supported discount curves.

use super::{FlatCurve, InterpolatedCurve, YieldCurve};
use crate::market_data::error::MarketDataError;

/// Discount curve consumed by the models.
///
/// Wraps the concrete curves so that an economy can own one curve type
/// without boxing.
///
/// # Example
///
/// ```
/// use hjm_core::market_data::curves::{DiscountCurve, YieldCurve};
///
/// let curve = DiscountCurve::flat(0.03);
/// assert!((curve.discount_factor(1.0).unwrap() - (-0.03_f64).exp()).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountCurve {
    /// Constant rate curve
    Flat(FlatCurve),
    /// Pillar-based curve
    Interpolated(InterpolatedCurve),
}

impl DiscountCurve {
    /// Convenience constructor for a flat curve.
    #[inline]
    pub fn flat(rate: f64) -> Self {
        DiscountCurve::Flat(FlatCurve::new(rate))
    }
}

impl YieldCurve for DiscountCurve {
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        match self {
            DiscountCurve::Flat(curve) => curve.discount_factor(t),
            DiscountCurve::Interpolated(curve) => curve.discount_factor(t),
        }
    }

    fn zero_rate(&self, t: f64) -> Result<f64, MarketDataError> {
        match self {
            DiscountCurve::Flat(curve) => curve.zero_rate(t),
            DiscountCurve::Interpolated(curve) => curve.zero_rate(t),
        }
    }

    fn forward_rate(&self, t1: f64, t2: f64) -> Result<f64, MarketDataError> {
        match self {
            DiscountCurve::Flat(curve) => curve.forward_rate(t1, t2),
            DiscountCurve::Interpolated(curve) => curve.forward_rate(t1, t2),
        }
    }
}

impl From<FlatCurve> for DiscountCurve {
    fn from(curve: FlatCurve) -> Self {
        DiscountCurve::Flat(curve)
    }
}

impl From<InterpolatedCurve> for DiscountCurve {
    fn from(curve: InterpolatedCurve) -> Self {
        DiscountCurve::Interpolated(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::curves::CurveInterpolation;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_dispatch() {
        let curve = DiscountCurve::flat(0.04);
        assert_relative_eq!(curve.zero_rate(3.0).unwrap(), 0.04, epsilon = 1e-15);
        assert_relative_eq!(curve.forward_rate(1.0, 2.0).unwrap(), 0.04, epsilon = 1e-15);
    }

    #[test]
    fn test_interpolated_dispatch() {
        let inner = InterpolatedCurve::new(
            &[1.0, 2.0],
            &[0.01, 0.02],
            CurveInterpolation::LogLinear,
            false,
        )
        .unwrap();
        let curve: DiscountCurve = inner.clone().into();
        assert_eq!(
            curve.discount_factor(1.5).unwrap(),
            inner.discount_factor(1.5).unwrap()
        );
        assert!(curve.discount_factor(2.5).is_err());
    }

    #[test]
    fn test_from_flat() {
        let curve: DiscountCurve = FlatCurve::new(0.01).into();
        assert!(matches!(curve, DiscountCurve::Flat(_)));
    }
}
