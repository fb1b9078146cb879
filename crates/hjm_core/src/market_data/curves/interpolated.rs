//! Interpolated yield curve implementation.

use super::YieldCurve;
use crate::market_data::error::MarketDataError;

/// Interpolation scheme for [`InterpolatedCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CurveInterpolation {
    /// Linear interpolation of zero rates, flat before the first pillar.
    Linear,

    /// Linear interpolation of log discount factors, anchored at D(0) = 1.
    /// Gives piecewise flat instantaneous forward rates.
    #[default]
    LogLinear,
}

/// Pillar-based discount curve.
///
/// Pillars are given as strictly increasing positive tenors with their
/// continuously compounded zero rates. Beyond the last pillar the curve
/// either extrapolates (flat zero rate for `Linear`, flat forward rate for
/// `LogLinear`) or fails with `MarketDataError::BeyondLastPillar`.
///
/// # Example
///
/// ```
/// use hjm_core::market_data::curves::{CurveInterpolation, InterpolatedCurve, YieldCurve};
///
/// let curve = InterpolatedCurve::new(
///     &[1.0, 2.0, 5.0],
///     &[0.02, 0.025, 0.03],
///     CurveInterpolation::LogLinear,
///     false,
/// )
/// .unwrap();
///
/// let df = curve.discount_factor(2.0).unwrap();
/// assert!((df - (-0.05_f64).exp()).abs() < 1e-14);
/// assert!(curve.discount_factor(6.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedCurve {
    tenors: Vec<f64>,
    rates: Vec<f64>,
    method: CurveInterpolation,
    allow_extrapolation: bool,
}

impl InterpolatedCurve {
    /// Construct a curve from pillar tenors and zero rates.
    ///
    /// # Errors
    ///
    /// * `NoPillars`, `PillarMismatch` - empty or unpaired pillars
    /// * `UnorderedPillar` - tenors not positive and strictly increasing
    /// * `NonFiniteRate` - non-finite rate
    pub fn new(
        tenors: &[f64],
        rates: &[f64],
        method: CurveInterpolation,
        allow_extrapolation: bool,
    ) -> Result<Self, MarketDataError> {
        if tenors.is_empty() {
            return Err(MarketDataError::NoPillars);
        }
        if tenors.len() != rates.len() {
            return Err(MarketDataError::PillarMismatch {
                tenors: tenors.len(),
                rates: rates.len(),
            });
        }

        let mut previous = 0.0;
        for (index, &tenor) in tenors.iter().enumerate() {
            if tenor <= previous {
                return Err(MarketDataError::UnorderedPillar { index, tenor });
            }
            previous = tenor;
        }
        if let Some(&rate) = rates.iter().find(|r| !r.is_finite()) {
            return Err(MarketDataError::NonFiniteRate { rate });
        }

        Ok(Self {
            tenors: tenors.to_vec(),
            rates: rates.to_vec(),
            method,
            allow_extrapolation,
        })
    }

    /// First and last pillar.
    #[inline]
    pub fn domain(&self) -> (f64, f64) {
        (self.tenors[0], self.tenors[self.tenors.len() - 1])
    }

    /// Interpolation scheme.
    #[inline]
    pub fn method(&self) -> CurveInterpolation {
        self.method
    }

    /// Whether queries beyond the last pillar are extrapolated.
    #[inline]
    pub fn allow_extrapolation(&self) -> bool {
        self.allow_extrapolation
    }

    /// Index `i` with `tenors[i] <= t < tenors[i + 1]`, or `None` before the
    /// first pillar.
    fn bracket(&self, t: f64) -> Option<usize> {
        match self.tenors.partition_point(|&x| x <= t) {
            0 => None,
            n => Some((n - 1).min(self.tenors.len().saturating_sub(2))),
        }
    }

    fn check_domain(&self, t: f64) -> Result<(), MarketDataError> {
        let (_, last) = self.domain();
        if t > last && !self.allow_extrapolation {
            return Err(MarketDataError::BeyondLastPillar { t, last });
        }
        Ok(())
    }

    fn log_discount(&self, t: f64) -> f64 {
        let n = self.tenors.len();
        let last = n - 1;
        if t >= self.tenors[last] {
            // Flat forward beyond the last pillar (single pillar: flat rate).
            let forward = if n == 1 {
                self.rates[0]
            } else {
                let (t0, t1) = (self.tenors[last - 1], self.tenors[last]);
                (self.rates[last] * t1 - self.rates[last - 1] * t0) / (t1 - t0)
            };
            return -self.rates[last] * self.tenors[last] - forward * (t - self.tenors[last]);
        }
        let (t0, y0, t1, y1) = match self.bracket(t) {
            None => (0.0, 0.0, self.tenors[0], -self.rates[0] * self.tenors[0]),
            Some(i) => (
                self.tenors[i],
                -self.rates[i] * self.tenors[i],
                self.tenors[i + 1],
                -self.rates[i + 1] * self.tenors[i + 1],
            ),
        };
        let w = (t - t0) / (t1 - t0);
        y0 + w * (y1 - y0)
    }

    fn linear_rate(&self, t: f64) -> f64 {
        let last = self.tenors.len() - 1;
        if t >= self.tenors[last] {
            return self.rates[last];
        }
        match self.bracket(t) {
            None => self.rates[0],
            Some(i) => {
                let (t0, t1) = (self.tenors[i], self.tenors[i + 1]);
                let w = (t - t0) / (t1 - t0);
                self.rates[i] + w * (self.rates[i + 1] - self.rates[i])
            }
        }
    }
}

impl YieldCurve for InterpolatedCurve {
    fn discount_factor(&self, t: f64) -> Result<f64, MarketDataError> {
        if t < 0.0 {
            return Err(MarketDataError::NegativeTime { t });
        }
        if t == 0.0 {
            return Ok(1.0);
        }
        self.check_domain(t)?;

        match self.method {
            CurveInterpolation::Linear => Ok((-self.linear_rate(t) * t).exp()),
            CurveInterpolation::LogLinear => Ok(self.log_discount(t).exp()),
        }
    }
}
