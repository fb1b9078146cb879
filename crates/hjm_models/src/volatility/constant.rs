//! Constant volatility levels.

use super::error::VolatilityError;

/// Volatility constant in time, one level per factor.
///
/// ```text
/// σ_i(s) = v_i,   b_i(s, T) = v_i (T - s)
/// ```
///
/// This is the multi-factor Ho/Lee specification when used as an
/// interest-rate volatility, and geometric Brownian motion when used for an
/// asset or exchange rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantVol {
    levels: Vec<f64>,
}

impl ConstantVol {
    /// Construct from one level per factor.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an empty or non-finite level vector.
    pub fn new(levels: Vec<f64>) -> Result<Self, VolatilityError> {
        validate_levels(&levels)?;
        Ok(Self { levels })
    }

    /// Per-factor levels.
    #[inline]
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Number of factors.
    #[inline]
    pub fn factors(&self) -> usize {
        self.levels.len()
    }

    pub(crate) fn integral(&self, dt: f64) -> Vec<f64> {
        self.levels.iter().map(|v| v * dt).collect()
    }

    pub(crate) fn forward_rate_variance(&self, t: f64, maturity: f64) -> Vec<f64> {
        self.levels.iter().map(|v| v * v * (maturity - t)).collect()
    }

    pub(crate) fn maturity_loading(&self, t1: f64, t2: f64) -> Vec<f64> {
        vec![t2 - t1; self.factors()]
    }

    /// `A(t,T) = exp(-½ Σ v² T t (T - t))`.
    pub(crate) fn a(&self, t: f64, maturity: f64) -> f64 {
        let sum_squares: f64 = self.levels.iter().map(|v| v * v).sum();
        (-0.5 * sum_squares * maturity * t * (maturity - t)).exp()
    }

    pub(crate) fn b(&self, t: f64, maturity: f64) -> Vec<f64> {
        vec![maturity - t; self.factors()]
    }

    pub(crate) fn var(&self, i: usize, dt: f64) -> f64 {
        self.levels[i] * self.levels[i] * dt
    }

    pub(crate) fn component(&self, i: usize) -> Self {
        Self {
            levels: isolate(&self.levels, i),
        }
    }
}

/// Shared level validation for every shape.
pub(crate) fn validate_levels(levels: &[f64]) -> Result<(), VolatilityError> {
    if levels.is_empty() {
        return Err(VolatilityError::InvalidParameter(
            "at least one factor is required".to_string(),
        ));
    }
    if let Some(v) = levels.iter().find(|v| !v.is_finite()) {
        return Err(VolatilityError::InvalidParameter(format!(
            "non-finite level {}",
            v
        )));
    }
    Ok(())
}

/// Copy of `values` with every entry but `i` zeroed.
pub(crate) fn isolate(values: &[f64], i: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(k, &v)| if k == i { v } else { 0.0 })
        .collect()
}
