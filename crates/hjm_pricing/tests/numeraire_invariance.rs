//! Closed forms against simulation under different numeraires.
//!
//! # Test Categories
//!
//! 1. **Zero-Coupon Bond Options**: `zcb_option` against paths under the
//!    domestic, foreign and asset numeraires
//! 2. **Cross-Currency and Equity**: FX options, equity options and quanto
//!    caplets against paths under the foreign numeraire

mod common;

use std::sync::Arc;

use hjm_models::analytical::OptionType;
use hjm_pricing::mc::{McEstimate, MonteCarloConfig, WorldPricer};
use hjm_pricing::world::{GaussMarkovWorld, Numeraire, ReportableKind};

use common::two_currency_world;

const NUMERAIRES: [Numeraire; 3] = [
    Numeraire::DomesticRollingSpot,
    Numeraire::ForeignRollingSpot(1),
    Numeraire::DomesticAsset(0),
];

fn pricer(n_paths: usize, seed: u64) -> WorldPricer {
    let config = MonteCarloConfig::builder()
        .n_paths(n_paths)
        .seed(seed)
        .build()
        .unwrap();
    WorldPricer::new(config)
}

fn assert_agrees(estimate: McEstimate, closed: f64, label: &str) {
    assert!(
        estimate.contains(closed, 4.0),
        "{}: simulated {:?} vs closed form {}",
        label,
        estimate,
        closed
    );
}

// ============================================================================
// Zero-Coupon Bond Options
// ============================================================================

fn bond_option_world(timeline: &[f64], maturity: f64) -> (GaussMarkovWorld, usize) {
    let mut world = two_currency_world();
    let bond = world
        .set_reporting(0, ReportableKind::FixedMaturityBond(maturity))
        .unwrap();
    world.set_timeline(timeline).unwrap();
    (world, bond)
}

#[test]
fn test_zcb_option_invariant_under_numeraire_change() {
    let (mut world, bond) = bond_option_world(&[0.0, 1.0], 3.0);
    let model = world.economies()[0].model().clone();
    let strike = model.discount(3.0).unwrap() / model.discount(1.0).unwrap();

    for option in [OptionType::Call, OptionType::Put] {
        let closed = model.zcb_option(1.0, 3.0, strike, option).unwrap();
        for numeraire in NUMERAIRES {
            world.set_numeraire(numeraire).unwrap();
            let estimate = pricer(60_000, 11)
                .price_discounted(&world, |path| option.intrinsic(path.terminal(bond), strike))
                .unwrap();
            assert_agrees(estimate, closed, &format!("{:?} {:?}", option, numeraire));
        }
    }
}

#[test]
fn test_zcb_option_with_intermediate_dates() {
    let (mut world, bond) = bond_option_world(&[0.0, 0.25, 0.5, 1.5], 4.0);
    let model = world.economies()[0].model().clone();
    let strike = 0.95 * model.discount(4.0).unwrap() / model.discount(1.5).unwrap();
    let closed = model.zcb_option(1.5, 4.0, strike, OptionType::Call).unwrap();

    for numeraire in NUMERAIRES {
        world.set_numeraire(numeraire).unwrap();
        let estimate = pricer(60_000, 12)
            .price_discounted(&world, |path| (path.terminal(bond) - strike).max(0.0))
            .unwrap();
        assert_agrees(estimate, closed, &format!("{:?}", numeraire));
    }
}

// ============================================================================
// Cross-Currency and Equity
// ============================================================================

#[test]
fn test_fx_option_matches_closed_form() {
    let mut world = two_currency_world();
    let fx = world.set_reporting(1, ReportableKind::TerminalForwardFx).unwrap();
    world.set_timeline(&[0.0, 0.5, 1.0]).unwrap();

    let domestic = world.economies()[0].model().clone();
    let foreign = world.economies()[1].model().clone();
    let fx_vol = Arc::clone(world.exchange_rate(1).unwrap().volatility());
    let strike = 1.3;
    let closed = domestic
        .fx_option(&foreign, &fx_vol, 1.25, 1.0, strike, OptionType::Call)
        .unwrap();

    for numeraire in [Numeraire::DomesticRollingSpot, Numeraire::ForeignRollingSpot(1)] {
        world.set_numeraire(numeraire).unwrap();
        let estimate = pricer(60_000, 13)
            .price_discounted(&world, |path| (path.terminal(fx) - strike).max(0.0))
            .unwrap();
        assert_agrees(estimate, closed, &format!("FX call {:?}", numeraire));
    }
}

#[test]
fn test_equity_option_under_foreign_numeraire() {
    let mut world = two_currency_world();
    let equity = world.set_reporting(0, ReportableKind::Asset(0)).unwrap();
    world.set_timeline(&[0.0, 2.0]).unwrap();
    world.set_numeraire(Numeraire::ForeignRollingSpot(1)).unwrap();

    let economy = &world.economies()[0];
    let closed = economy
        .model()
        .equity_option(&economy.assets()[0], 2.0, 105.0, OptionType::Put)
        .unwrap();
    let estimate = pricer(60_000, 14)
        .price_discounted(&world, |path| (105.0 - path.terminal(equity)).max(0.0))
        .unwrap();
    assert_agrees(estimate, closed, "equity put");
}

#[test]
fn test_quanto_caplet_matches_closed_form() {
    let (reset, payment, strike) = (1.0, 1.5, 0.012);
    let accrual = payment - reset;

    let mut world = two_currency_world();
    let foreign_bond = world
        .set_reporting(1, ReportableKind::RollingBond(accrual))
        .unwrap();
    world.set_timeline(&[0.0, reset, payment]).unwrap();
    world.set_numeraire(Numeraire::ForeignRollingSpot(1)).unwrap();

    let domestic = world.economies()[0].model().clone();
    let foreign = world.economies()[1].model().clone();
    let fx_vol = Arc::clone(world.exchange_rate(1).unwrap().volatility());
    let closed = domestic
        .quanto_caplet(&foreign, &fx_vol, reset, payment, strike)
        .unwrap();

    // δ·(L_f - K)^+ fixed at reset, paid in domestic currency at payment
    let estimate = pricer(60_000, 15)
        .price_discounted(&world, |path| {
            (1.0 / path.value(foreign_bond, 1) - 1.0 - accrual * strike).max(0.0)
        })
        .unwrap();
    assert_agrees(estimate, closed, "quanto caplet");
}
