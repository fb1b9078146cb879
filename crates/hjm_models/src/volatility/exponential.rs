//! Exponentially decaying volatility.

use super::constant::{isolate, validate_levels};
use super::error::VolatilityError;
use super::kernels::{dd2, exp_integral, h, phi1};

/// Forward-rate volatility decaying exponentially in time to maturity.
///
/// ```text
/// σ_i(s, T) = v_i e^{-a_i (T - s)}          forward rate
/// σ_i(s)    = v_i e^{a_i s}                 state variable
/// b_i(s, T) = v_i (1 - e^{-a_i (T - s)}) / a_i
/// ```
///
/// As an interest-rate volatility this is the multi-factor Hull/White
/// specification with mean reversion speeds `a_i`. A zero decay reproduces
/// [`ConstantVol`](super::ConstantVol) exactly; small decays are evaluated
/// without cancellation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialVol {
    levels: Vec<f64>,
    decays: Vec<f64>,
}

impl ExponentialVol {
    /// Construct from per-factor levels and decays.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for empty, non-finite or mismatched inputs.
    pub fn new(levels: Vec<f64>, decays: Vec<f64>) -> Result<Self, VolatilityError> {
        validate_levels(&levels)?;
        if decays.len() != levels.len() {
            return Err(VolatilityError::InvalidParameter(format!(
                "{} decays for {} levels",
                decays.len(),
                levels.len()
            )));
        }
        if let Some(a) = decays.iter().find(|a| !a.is_finite()) {
            return Err(VolatilityError::InvalidParameter(format!(
                "non-finite decay {}",
                a
            )));
        }
        Ok(Self { levels, decays })
    }

    /// Per-factor levels `v_i`.
    #[inline]
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Per-factor decays `a_i`.
    #[inline]
    pub fn decays(&self) -> &[f64] {
        &self.decays
    }

    /// Number of factors.
    #[inline]
    pub fn factors(&self) -> usize {
        self.levels.len()
    }

    fn params(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.levels.iter().copied().zip(self.decays.iter().copied())
    }

    pub(crate) fn integral(&self, t: f64, dt: f64) -> Vec<f64> {
        self.params().map(|(v, a)| v * exp_integral(a, t, dt)).collect()
    }

    pub(crate) fn forward_rate_variance(&self, t: f64, maturity: f64) -> Vec<f64> {
        let tau = maturity - t;
        self.params()
            .map(|(v, a)| v * v * tau * phi1(-2.0 * a * tau))
            .collect()
    }

    pub(crate) fn maturity_loading(&self, t1: f64, t2: f64) -> Vec<f64> {
        self.decays.iter().map(|&a| h(a, t2 - t1)).collect()
    }

    /// ```text
    /// ln A(t,T) = -½ Σ v² H [2t² e[0,-at,-2at] + H t φ1(-2at)],  H = h_a(T - t)
    /// ```
    pub(crate) fn a(&self, t: f64, maturity: f64) -> f64 {
        let exponent: f64 = self
            .params()
            .map(|(v, a)| {
                let big_h = h(a, maturity - t);
                v * v
                    * big_h
                    * (2.0 * t * t * dd2(-a * t, -2.0 * a * t) + big_h * t * phi1(-2.0 * a * t))
            })
            .sum();
        (-0.5 * exponent).exp()
    }

    pub(crate) fn b(&self, t: f64, maturity: f64) -> Vec<f64> {
        self.decays
            .iter()
            .map(|&a| (-a * t).exp() * h(a, maturity - t))
            .collect()
    }

    pub(crate) fn var(&self, i: usize, t: f64, dt: f64) -> f64 {
        let (v, a) = (self.levels[i], self.decays[i]);
        v * v * exp_integral(2.0 * a, t, dt)
    }

    pub(crate) fn covar_dw(&self, i: usize, t: f64, dt: f64) -> f64 {
        self.levels[i] * exp_integral(self.decays[i], t, dt)
    }

    /// Levels if every factor is flat, i.e. has zero decay or zero level.
    pub(crate) fn constant_level(&self) -> Option<Vec<f64>> {
        self.params()
            .map(|(v, a)| if a == 0.0 || v == 0.0 { Some(v) } else { None })
            .collect()
    }

    pub(crate) fn component(&self, i: usize) -> Self {
        Self {
            levels: isolate(&self.levels, i),
            decays: self.decays.clone(),
        }
    }
}
