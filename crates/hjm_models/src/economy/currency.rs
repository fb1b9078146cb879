//! Economy of one currency.

use std::sync::Arc;

use hjm_core::market_data::DiscountCurve;

use super::asset::Asset;
use crate::analytical::GaussianHjm;
use crate::error::ModelError;
use crate::volatility::{VolatilityError, VolatilityFunction};

/// Assets, interest-rate volatility and discount curve of one currency.
///
/// Immutable after construction. The interest-rate volatility is shared
/// with the closed-form model; the per-factor component volatilities are
/// built once and owned here.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use hjm_core::market_data::DiscountCurve;
/// use hjm_models::economy::{Asset, Economy};
/// use hjm_models::volatility::VolatilityFunction;
///
/// let rates = Arc::new(VolatilityFunction::constant(vec![0.01, 0.0]).unwrap());
/// let equity = Asset::new(
///     "EQ",
///     100.0,
///     0.0,
///     Arc::new(VolatilityFunction::constant(vec![0.0, 0.2]).unwrap()),
/// )
/// .unwrap();
///
/// let economy = Economy::new(vec![equity], rates, Arc::new(DiscountCurve::flat(0.03))).unwrap();
/// assert_eq!(economy.factors(), 2);
/// assert_eq!(economy.asset_index("EQ"), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct Economy {
    assets: Vec<Asset>,
    rate_volatility: Arc<VolatilityFunction>,
    components: Vec<Arc<VolatilityFunction>>,
    curve: Arc<DiscountCurve>,
    model: GaussianHjm,
}

impl Economy {
    /// Build an economy.
    ///
    /// # Errors
    /// `Volatility(FactorMismatch)` if an asset volatility has a different
    /// factor count from the interest-rate volatility.
    pub fn new(
        assets: Vec<Asset>,
        rate_volatility: Arc<VolatilityFunction>,
        curve: Arc<DiscountCurve>,
    ) -> Result<Self, ModelError> {
        let factors = rate_volatility.factors();
        for asset in &assets {
            if asset.volatility().factors() != factors {
                return Err(VolatilityError::FactorMismatch {
                    lhs: asset.volatility().factors(),
                    rhs: factors,
                }
                .into());
            }
        }

        let components = (0..factors)
            .map(|i| rate_volatility.component_vol(i).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let model = GaussianHjm::new(Arc::clone(&rate_volatility), Arc::clone(&curve));

        Ok(Self {
            assets,
            rate_volatility,
            components,
            curve,
            model,
        })
    }

    /// Traded assets in input order.
    #[inline]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Asset `j`, if present.
    #[inline]
    pub fn asset(&self, j: usize) -> Option<&Asset> {
        self.assets.get(j)
    }

    /// Position of the asset called `name`.
    pub fn asset_index(&self, name: &str) -> Option<usize> {
        self.assets.iter().position(|a| a.name() == name)
    }

    /// Number of Brownian factors.
    #[inline]
    pub fn factors(&self) -> usize {
        self.rate_volatility.factors()
    }

    /// Interest-rate volatility.
    #[inline]
    pub fn rate_volatility(&self) -> &Arc<VolatilityFunction> {
        &self.rate_volatility
    }

    /// Interest-rate volatility restricted to factor `i`.
    #[inline]
    pub fn component_volatility(&self, i: usize) -> Option<&Arc<VolatilityFunction>> {
        self.components.get(i)
    }

    /// All component volatilities, one per factor.
    #[inline]
    pub fn component_volatilities(&self) -> &[Arc<VolatilityFunction>] {
        &self.components
    }

    /// Initial discount curve.
    #[inline]
    pub fn curve(&self) -> &Arc<DiscountCurve> {
        &self.curve
    }

    /// Closed-form model of this currency.
    #[inline]
    pub fn model(&self) -> &GaussianHjm {
        &self.model
    }

    /// Initial discount factor `D(t)`.
    #[inline]
    pub fn discount(&self, t: f64) -> Result<f64, ModelError> {
        self.model.discount(t)
    }
}
