//! Difference of two volatility functions.

use super::error::VolatilityError;
use super::VolatilityFunction;

/// Volatility `v1 - v2` of a quotient of two lognormal quantities.
///
/// The ratio `S1 / S2` of two assets, or a cross exchange rate, diffuses
/// with the difference of the two volatilities. Only the linear integrals
/// (`integral`, `volproduct`) are available; bond volatilities, `A`, `B`
/// and per-factor variances have no meaning for a quotient and fail with
/// [`VolatilityError::Unsupported`].
///
/// # Example
///
/// ```
/// use hjm_models::volatility::VolatilityFunction;
///
/// let s1 = VolatilityFunction::constant(vec![0.3, 0.0]).unwrap();
/// let s2 = VolatilityFunction::constant(vec![0.1, 0.2]).unwrap();
/// let ratio = VolatilityFunction::difference(s1, s2).unwrap();
///
/// // |(0.2, -0.2)|² over one year
/// let variance = ratio.volproduct(0.0, 1.0, &ratio).unwrap();
/// assert!((variance - 0.08).abs() < 1e-15);
/// assert!(ratio.a(0.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceVol {
    lhs: Box<VolatilityFunction>,
    rhs: Box<VolatilityFunction>,
}

impl DifferenceVol {
    /// Construct `lhs - rhs`.
    ///
    /// # Errors
    ///
    /// `FactorMismatch` if the operands have different factor counts.
    pub fn new(lhs: VolatilityFunction, rhs: VolatilityFunction) -> Result<Self, VolatilityError> {
        if lhs.factors() != rhs.factors() {
            return Err(VolatilityError::FactorMismatch {
                lhs: lhs.factors(),
                rhs: rhs.factors(),
            });
        }
        Ok(Self {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// Minuend.
    #[inline]
    pub fn lhs(&self) -> &VolatilityFunction {
        &self.lhs
    }

    /// Subtrahend.
    #[inline]
    pub fn rhs(&self) -> &VolatilityFunction {
        &self.rhs
    }

    /// Number of factors.
    #[inline]
    pub fn factors(&self) -> usize {
        self.lhs.factors()
    }

    pub(crate) fn integral(&self, t: f64, dt: f64) -> Result<Vec<f64>, VolatilityError> {
        let minuend = self.lhs.integral(t, dt)?;
        let subtrahend = self.rhs.integral(t, dt)?;
        Ok(minuend
            .iter()
            .zip(&subtrahend)
            .map(|(x, y)| x - y)
            .collect())
    }

    pub(crate) fn constant_level(&self, t: f64, maturity: f64) -> Option<Vec<f64>> {
        let minuend = self.lhs.volatility_level(t, maturity)?;
        let subtrahend = self.rhs.volatility_level(t, maturity)?;
        Some(
            minuend
                .iter()
                .zip(&subtrahend)
                .map(|(x, y)| x - y)
                .collect(),
        )
    }

    pub(crate) fn segments(&self, t: f64, dt: f64) -> Result<Vec<f64>, VolatilityError> {
        let mut points = self.lhs.segments(t, dt)?;
        points.extend(self.rhs.segments(t, dt)?);
        points.sort_by(f64::total_cmp);
        points.dedup();
        Ok(points)
    }

    pub(crate) fn component(&self, i: usize) -> Result<Self, VolatilityError> {
        Self::new(self.lhs.component_vol(i)?, self.rhs.component_vol(i)?)
    }
}
