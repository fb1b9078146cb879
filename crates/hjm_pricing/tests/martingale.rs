//! Martingale tests: deflated traded values have constant expectation
//! under every numeraire.
//!
//! # Test Categories
//!
//! 1. **Single Economy**: equity under the domestic rolling spot
//! 2. **Two Currencies**: domestic and foreign assets and bonds, converted
//!    to domestic currency, under domestic, foreign and asset numeraires

mod common;

use hjm_core::market_data::YieldCurve;
use hjm_models::economy::{Asset, Economy};
use hjm_pricing::mc::{MonteCarloConfig, WorldPricer};
use hjm_pricing::world::{GaussMarkovWorld, Numeraire, ReportableKind};

use common::{constant, flat, two_currency_world};

// ============================================================================
// Single Economy
// ============================================================================

#[test]
fn test_single_economy_equity_forward() {
    let economy = Economy::new(
        vec![Asset::new("EQ", 100.0, 0.0, constant(vec![0.2])).unwrap()],
        constant(vec![0.01]),
        flat(0.03),
    )
    .unwrap();
    let mut world = GaussMarkovWorld::new(vec![economy], vec![]).unwrap();
    let equity = world.set_reporting(0, ReportableKind::Asset(0)).unwrap();
    world.set_timeline(&[0.0, 1.0]).unwrap();
    world.set_numeraire(Numeraire::DomesticRollingSpot).unwrap();

    let config = MonteCarloConfig::builder()
        .n_paths(100_000)
        .seed(20_240_601)
        .build()
        .unwrap();
    let pricer = WorldPricer::new(config);

    // E[S(1)/N(1)]·N(0) = S(0)
    let deflated = pricer.price_discounted(&world, |path| path.terminal(equity)).unwrap();
    assert!(deflated.contains(100.0, 4.0), "{:?}", deflated);

    // Equivalently E^T[S(1)] = S(0)/D(1)
    let forward = pricer.estimate(&world, |path| path.terminal(equity)).unwrap();
    assert!(forward.contains(100.0 / (-0.03_f64).exp(), 4.0), "{:?}", forward);
}

// ============================================================================
// Two Currencies
// ============================================================================

#[test]
fn test_traded_values_are_martingales_under_every_numeraire() {
    let mut world = two_currency_world();
    let dom_asset = world.set_reporting(0, ReportableKind::Asset(0)).unwrap();
    let dom_bond = world
        .set_reporting(0, ReportableKind::FixedMaturityBond(4.0))
        .unwrap();
    let for_asset = world.set_reporting(1, ReportableKind::Asset(0)).unwrap();
    let for_bond = world
        .set_reporting(1, ReportableKind::FixedMaturityBond(3.5))
        .unwrap();
    let fx = world.set_reporting(1, ReportableKind::TerminalForwardFx).unwrap();
    world.set_timeline(&[0.0, 0.5, 1.0, 2.0]).unwrap();

    let domestic_curve = world.economies()[0].curve().clone();
    let expected = [
        // Domestic asset with dividends reinvested over [0, 2]
        (dom_asset, 100.0 * (-0.01_f64 * 2.0).exp()),
        (dom_bond, domestic_curve.discount_factor(4.0).unwrap()),
        // Foreign asset and bond in domestic currency
        (for_asset, 1.25 * 50.0 * (-0.02_f64 * 2.0).exp()),
        (for_bond, 1.25 * (-0.01_f64 * 3.5).exp()),
    ];

    let config = MonteCarloConfig::builder()
        .n_paths(40_000)
        .seed(7)
        .build()
        .unwrap();
    let pricer = WorldPricer::new(config);

    for numeraire in [
        Numeraire::DomesticRollingSpot,
        Numeraire::ForeignRollingSpot(1),
        Numeraire::DomesticAsset(0),
    ] {
        world.set_numeraire(numeraire).unwrap();
        for (index, value) in expected {
            let foreign = index == for_asset || index == for_bond;
            let estimate = pricer
                .price_discounted(&world, |path| {
                    let local = path.terminal(index);
                    if foreign {
                        // At the horizon the forward exchange rate is spot
                        local * path.terminal(fx)
                    } else {
                        local
                    }
                })
                .unwrap();
            // Deflated payoffs can be deterministic (asset under its own
            // numeraire), so allow for rounding
            assert!(
                (estimate.mean - value).abs() <= 4.0 * estimate.std_error + 1e-10 * value,
                "{:?} reportable {}: {:?} vs {}",
                numeraire,
                index,
                estimate,
                value
            );
        }
    }
}

#[test]
fn test_numeraire_values_start_at_initial_value() {
    let mut world = two_currency_world();
    world.set_timeline(&[0.0, 1.0]).unwrap();
    let x = nalgebra::DMatrix::zeros(1, world.max_rank());
    let mut path = hjm_pricing::world::PathValues::new(0, 0);

    for (numeraire, initial) in [
        (Numeraire::DomesticRollingSpot, 1.0),
        (Numeraire::ForeignRollingSpot(1), 1.25),
        (Numeraire::DomesticAsset(0), 100.0),
    ] {
        world.set_numeraire(numeraire).unwrap();
        world.simulate_path(&x, &mut path).unwrap();
        assert!((path.numeraire(0) - initial).abs() < 1e-12 * initial);
        assert!((world.initial_numeraire() - initial).abs() < 1e-15);
    }
}
