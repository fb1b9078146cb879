//! Traded assets and exchange rates.

use std::sync::Arc;

use crate::error::ModelError;
use crate::volatility::{VolatilityError, VolatilityFunction};

/// A traded asset with a continuous dividend yield.
///
/// The asset's log-price diffuses with the deterministic vector volatility
/// `σ_S(s)` over the same Brownian factors as its economy's interest rates.
#[derive(Debug, Clone)]
pub struct Asset {
    name: String,
    spot: f64,
    dividend_yield: f64,
    volatility: Arc<VolatilityFunction>,
}

impl Asset {
    /// Create an asset.
    ///
    /// # Errors
    /// `ModelError::InvalidInput` if `spot` is not positive or the dividend
    /// yield is not finite.
    pub fn new(
        name: impl Into<String>,
        spot: f64,
        dividend_yield: f64,
        volatility: Arc<VolatilityFunction>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if !(spot > 0.0 && spot.is_finite()) {
            return Err(ModelError::InvalidInput(format!(
                "asset {} has non-positive spot {}",
                name, spot
            )));
        }
        if !dividend_yield.is_finite() {
            return Err(ModelError::InvalidInput(format!(
                "asset {} has non-finite dividend yield",
                name
            )));
        }
        Ok(Self {
            name,
            spot,
            dividend_yield,
            volatility,
        })
    }

    /// Identifier.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current trade price `S(0)`.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Continuous dividend yield `q`.
    #[inline]
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield
    }

    /// Instantaneous volatility `σ_S`.
    #[inline]
    pub fn volatility(&self) -> &Arc<VolatilityFunction> {
        &self.volatility
    }

    /// Dividend discount `e^{-q(T-t)}` over `[t, maturity]`.
    #[inline]
    pub fn dividend_discount(&self, t: f64, maturity: f64) -> f64 {
        (-self.dividend_yield * (maturity - t)).exp()
    }

    /// Forward price `S(0)·e^{-qT} / D(T)` for delivery at `maturity`, given
    /// the discount factor to that date.
    #[inline]
    pub fn forward(&self, maturity: f64, discount: f64) -> f64 {
        self.spot * self.dividend_discount(0.0, maturity) / discount
    }

    /// `∫_t^{t+dt} σ_S(s)·σ_other(s) ds`.
    pub fn covariance(&self, other: &Asset, t: f64, dt: f64) -> Result<f64, VolatilityError> {
        self.volatility.volproduct(t, dt, &other.volatility)
    }
}

/// Spot exchange rate: units of domestic currency per unit of a foreign
/// currency.
#[derive(Debug, Clone)]
pub struct ExchangeRate {
    spot: f64,
    volatility: Arc<VolatilityFunction>,
}

impl ExchangeRate {
    /// Create an exchange rate.
    ///
    /// # Errors
    /// `ModelError::InvalidInput` if `spot` is not positive.
    pub fn new(spot: f64, volatility: Arc<VolatilityFunction>) -> Result<Self, ModelError> {
        if !(spot > 0.0 && spot.is_finite()) {
            return Err(ModelError::InvalidInput(format!(
                "exchange rate has non-positive spot {}",
                spot
            )));
        }
        Ok(Self { spot, volatility })
    }

    /// Current spot rate `X(0)`.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Instantaneous volatility `σ_X`.
    #[inline]
    pub fn volatility(&self) -> &Arc<VolatilityFunction> {
        &self.volatility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vol(levels: Vec<f64>) -> Arc<VolatilityFunction> {
        Arc::new(VolatilityFunction::constant(levels).unwrap())
    }

    #[test]
    fn test_rejects_bad_spot() {
        assert!(Asset::new("X", 0.0, 0.0, vol(vec![0.2])).is_err());
        assert!(Asset::new("X", f64::NAN, 0.0, vol(vec![0.2])).is_err());
        assert!(Asset::new("X", 1.0, f64::INFINITY, vol(vec![0.2])).is_err());
        assert!(ExchangeRate::new(-1.0, vol(vec![0.1])).is_err());
    }

    #[test]
    fn test_forward_and_dividends() {
        let asset = Asset::new("SPX", 100.0, 0.02, vol(vec![0.2])).unwrap();
        assert_relative_eq!(
            asset.dividend_discount(1.0, 3.0),
            (-0.04_f64).exp(),
            max_relative = 1e-15
        );
        let discount = (-0.03_f64).exp();
        assert_relative_eq!(
            asset.forward(1.0, discount),
            100.0 * (0.01_f64).exp(),
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_covariance() {
        let a = Asset::new("A", 1.0, 0.0, vol(vec![0.2, 0.1])).unwrap();
        let b = Asset::new("B", 1.0, 0.0, vol(vec![0.1, -0.3])).unwrap();
        assert_relative_eq!(a.covariance(&b, 0.0, 2.0).unwrap(), -0.02, epsilon = 1e-15);
        assert_eq!(a.name(), "A");
    }
}
