//! Worlds shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use hjm_core::market_data::{CurveInterpolation, DiscountCurve, InterpolatedCurve};
use hjm_models::economy::{Asset, Economy, ExchangeRate};
use hjm_models::volatility::VolatilityFunction;
use hjm_pricing::world::GaussMarkovWorld;

pub fn constant(levels: Vec<f64>) -> Arc<VolatilityFunction> {
    Arc::new(VolatilityFunction::constant(levels).unwrap())
}

pub fn flat(rate: f64) -> Arc<DiscountCurve> {
    Arc::new(DiscountCurve::flat(rate))
}

pub fn upward_curve() -> Arc<DiscountCurve> {
    let curve = InterpolatedCurve::new(
        &[0.5, 1.0, 2.0, 5.0, 10.0],
        &[0.020, 0.022, 0.025, 0.029, 0.031],
        CurveInterpolation::LogLinear,
        true,
    )
    .unwrap();
    Arc::new(curve.into())
}

/// Domestic economy with one equity and exponential rates, and one foreign
/// economy with one equity and constant rates, over two factors.
pub fn two_currency_world() -> GaussMarkovWorld {
    let domestic = Economy::new(
        vec![Asset::new("DOM", 100.0, 0.01, constant(vec![0.10, 0.15])).unwrap()],
        Arc::new(VolatilityFunction::exponential(vec![0.012, 0.004], vec![0.05, 0.3]).unwrap()),
        upward_curve(),
    )
    .unwrap();
    let foreign = Economy::new(
        vec![Asset::new("FOR", 50.0, 0.02, constant(vec![-0.05, 0.2])).unwrap()],
        constant(vec![0.006, 0.008]),
        flat(0.01),
    )
    .unwrap();
    let fx = ExchangeRate::new(1.25, constant(vec![0.05, -0.08])).unwrap();
    GaussMarkovWorld::new(vec![domestic, foreign], vec![fx]).unwrap()
}
