//! Pairwise integral identities between volatility shapes.
//!
//! Each pairwise integral has a different closed form for every pair of
//! shapes, so neither shape can evaluate it alone. The functions here match
//! on `(lhs, rhs)`:
//!
//! | pair | resolution |
//! |------|------------|
//! | `Difference` on either side | linear expansion (`volproduct`, instantaneous side of `bondvolproduct`), otherwise unsupported |
//! | `Piecewise` on either side | walk the merged segments, freeze the piecewise operand to its constant level, re-enter |
//! | `Constant` x `Constant` | polynomial closed forms |
//! | `Constant` x `Exponential`, `Exponential` x `Constant`, `Exponential` x `Exponential` | φ-function kernels |
//!
//! Every entry point checks that both operands have the same factor count.

use std::borrow::Cow;

use super::error::VolatilityError;
use super::kernels::{
    bond_bond, bond_instantaneous, constant_bond_bond, constant_bond_instantaneous, exp_integral,
};
use super::{ConstantVol, ExponentialVol, VolatilityFunction};

fn check_factors(
    lhs: &VolatilityFunction,
    rhs: &VolatilityFunction,
) -> Result<(), VolatilityError> {
    if lhs.factors() != rhs.factors() {
        return Err(VolatilityError::FactorMismatch {
            lhs: lhs.factors(),
            rhs: rhs.factors(),
        });
    }
    Ok(())
}

fn unsupported(
    operation: &'static str,
    lhs: &VolatilityFunction,
    rhs: &VolatilityFunction,
) -> VolatilityError {
    VolatilityError::UnsupportedPair {
        operation,
        lhs: lhs.kind(),
        rhs: rhs.kind(),
    }
}

/// Piecewise operand replaced by its constant level at `s`; other shapes
/// are borrowed unchanged.
fn frozen_at(vol: &VolatilityFunction, s: f64) -> Result<Cow<'_, VolatilityFunction>, VolatilityError> {
    match vol {
        VolatilityFunction::Piecewise(p) => Ok(Cow::Owned(VolatilityFunction::Constant(
            ConstantVol::new(p.level_at(s)?.to_vec())?,
        ))),
        _ => Ok(Cow::Borrowed(vol)),
    }
}

/// Sum `op` over the merged segments of both operands on `[t, t+dt]`.
fn walk_segments<F>(
    lhs: &VolatilityFunction,
    rhs: &VolatilityFunction,
    t: f64,
    dt: f64,
    op: F,
) -> Result<f64, VolatilityError>
where
    F: Fn(&VolatilityFunction, &VolatilityFunction, f64, f64) -> Result<f64, VolatilityError>,
{
    let mut points = lhs.segments(t, dt)?;
    points.extend(rhs.segments(t, dt)?);
    points.sort_by(f64::total_cmp);
    points.dedup();

    let mut total = 0.0;
    for piece in points.windows(2) {
        let (lo, hi) = (piece[0], piece[1]);
        if hi <= lo {
            continue;
        }
        let mid = 0.5 * (lo + hi);
        let l = frozen_at(lhs, mid)?;
        let r = frozen_at(rhs, mid)?;
        total += op(&l, &r, lo, hi - lo)?;
    }
    Ok(total)
}

/// `Σ_i f(v_i, a_i, w_i, c_i)` over the per-factor (level, decay) pairs.
fn sum_factors<F>(lhs: (&[f64], &[f64]), rhs: (&[f64], &[f64]), f: F) -> f64
where
    F: Fn(f64, f64, f64, f64) -> f64,
{
    lhs.0
        .iter()
        .zip(lhs.1)
        .zip(rhs.0.iter().zip(rhs.1))
        .map(|((&v, &a), (&w, &c))| f(v, a, w, c))
        .sum()
}

/// Decay vector of zeros for a constant operand.
fn no_decay(v: &ConstantVol) -> Vec<f64> {
    vec![0.0; v.factors()]
}

fn exp_params(v: &ExponentialVol) -> (&[f64], &[f64]) {
    (v.levels(), v.decays())
}

/// `∫_t^{t+dt} σ_lhs(s)·σ_rhs(s) ds`.
pub fn volproduct(
    lhs: &VolatilityFunction,
    rhs: &VolatilityFunction,
    t: f64,
    dt: f64,
) -> Result<f64, VolatilityError> {
    use VolatilityFunction::*;

    check_factors(lhs, rhs)?;
    match (lhs, rhs) {
        (Difference(d), _) => {
            Ok(volproduct(d.lhs(), rhs, t, dt)? - volproduct(d.rhs(), rhs, t, dt)?)
        }
        (_, Difference(d)) => {
            Ok(volproduct(lhs, d.lhs(), t, dt)? - volproduct(lhs, d.rhs(), t, dt)?)
        }
        (Piecewise(_), _) | (_, Piecewise(_)) => walk_segments(lhs, rhs, t, dt, |l, r, s, ds| {
            volproduct(l, r, s, ds)
        }),
        (Constant(x), Constant(y)) => Ok(x
            .levels()
            .iter()
            .zip(y.levels())
            .map(|(v, w)| v * w * dt)
            .sum()),
        (Constant(x), Exponential(y)) => Ok(sum_factors(
            (x.levels(), &no_decay(x)),
            exp_params(y),
            |v, _, w, c| v * w * exp_integral(c, t, dt),
        )),
        (Exponential(x), Constant(y)) => Ok(sum_factors(
            exp_params(x),
            (y.levels(), &no_decay(y)),
            |v, a, w, _| v * w * exp_integral(a, t, dt),
        )),
        (Exponential(x), Exponential(y)) => Ok(sum_factors(
            exp_params(x),
            exp_params(y),
            |v, a, w, c| v * w * exp_integral(a + c, t, dt),
        )),
    }
}

/// `∫_t^{t+dt} b_bond(s, maturity)·σ_inst(s) ds`.
pub fn bondvolproduct(
    bond: &VolatilityFunction,
    maturity: f64,
    inst: &VolatilityFunction,
    t: f64,
    dt: f64,
) -> Result<f64, VolatilityError> {
    use VolatilityFunction::*;

    check_factors(bond, inst)?;
    let x = maturity - t;
    match (bond, inst) {
        (Difference(_), _) => Err(unsupported("bondvolproduct", bond, inst)),
        (_, Difference(d)) => Ok(bondvolproduct(bond, maturity, d.lhs(), t, dt)?
            - bondvolproduct(bond, maturity, d.rhs(), t, dt)?),
        (Piecewise(_), _) | (_, Piecewise(_)) => {
            walk_segments(bond, inst, t, dt, |l, r, s, ds| {
                bondvolproduct(l, maturity, r, s, ds)
            })
        }
        (Constant(x_vol), Constant(y)) => {
            let kernel = constant_bond_instantaneous(x, dt);
            Ok(x_vol
                .levels()
                .iter()
                .zip(y.levels())
                .map(|(v, w)| v * w * kernel)
                .sum())
        }
        (Constant(x_vol), Exponential(y)) => Ok(sum_factors(
            (x_vol.levels(), &no_decay(x_vol)),
            exp_params(y),
            |v, _, w, c| v * w * bond_instantaneous(0.0, c, x, t, dt),
        )),
        (Exponential(x_vol), Constant(y)) => Ok(sum_factors(
            exp_params(x_vol),
            (y.levels(), &no_decay(y)),
            |v, a, w, _| v * w * bond_instantaneous(a, 0.0, x, t, dt),
        )),
        (Exponential(x_vol), Exponential(y)) => Ok(sum_factors(
            exp_params(x_vol),
            exp_params(y),
            |v, a, w, c| v * w * bond_instantaneous(a, c, x, t, dt),
        )),
    }
}

/// `∫_t^{t+dt} b_lhs(s, t1)·b_rhs(s, t2) ds`.
pub fn bondbondvolproduct(
    lhs: &VolatilityFunction,
    t1: f64,
    rhs: &VolatilityFunction,
    t2: f64,
    t: f64,
    dt: f64,
) -> Result<f64, VolatilityError> {
    use VolatilityFunction::*;

    check_factors(lhs, rhs)?;
    let (x1, x2) = (t1 - t, t2 - t);
    match (lhs, rhs) {
        (Difference(_), _) | (_, Difference(_)) => {
            Err(unsupported("bondbondvolproduct", lhs, rhs))
        }
        (Piecewise(_), _) | (_, Piecewise(_)) => walk_segments(lhs, rhs, t, dt, |l, r, s, ds| {
            bondbondvolproduct(l, t1, r, t2, s, ds)
        }),
        (Constant(x), Constant(y)) => {
            let kernel = constant_bond_bond(x1, x2, dt);
            Ok(x
                .levels()
                .iter()
                .zip(y.levels())
                .map(|(v, w)| v * w * kernel)
                .sum())
        }
        (Constant(x), Exponential(y)) => Ok(sum_factors(
            (x.levels(), &no_decay(x)),
            exp_params(y),
            |v, _, w, c| v * w * bond_bond(0.0, x1, c, x2, dt),
        )),
        (Exponential(x), Constant(y)) => Ok(sum_factors(
            exp_params(x),
            (y.levels(), &no_decay(y)),
            |v, a, w, _| v * w * bond_bond(a, x1, 0.0, x2, dt),
        )),
        (Exponential(x), Exponential(y)) => Ok(sum_factors(
            exp_params(x),
            exp_params(y),
            |v, a, w, c| v * w * bond_bond(a, x1, c, x2, dt),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volatility::kernels::h;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn simpson<F: Fn(f64) -> f64>(f: F, lo: f64, hi: f64, n: usize) -> f64 {
        let step = (hi - lo) / n as f64;
        let mut sum = f(lo) + f(hi);
        for k in 1..n {
            let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight * f(lo + k as f64 * step);
        }
        sum * step / 3.0
    }

    /// Single-factor (state vol, bond vol) pointwise evaluators.
    fn pointwise(vol: &VolatilityFunction) -> (Box<dyn Fn(f64) -> f64 + '_>, Box<dyn Fn(f64, f64) -> f64 + '_>) {
        match vol {
            VolatilityFunction::Constant(c) => {
                let v = c.levels()[0];
                (Box::new(move |_| v), Box::new(move |s, m| v * (m - s)))
            }
            VolatilityFunction::Exponential(e) => {
                let (v, a) = (e.levels()[0], e.decays()[0]);
                (
                    Box::new(move |s| v * (a * s).exp()),
                    Box::new(move |s, m| v * h(a, m - s)),
                )
            }
            VolatilityFunction::Piecewise(p) => (
                Box::new(move |s| p.level_at(s).map(|l| l[0]).unwrap_or(0.0)),
                Box::new(move |s, m| p.level_at(s).map(|l| l[0]).unwrap_or(0.0) * (m - s)),
            ),
            VolatilityFunction::Difference(_) => unreachable!("not used in these tests"),
        }
    }

    fn single_factor_shapes() -> Vec<VolatilityFunction> {
        vec![
            VolatilityFunction::constant(vec![0.15]).unwrap(),
            VolatilityFunction::exponential(vec![0.012], vec![0.08]).unwrap(),
            VolatilityFunction::exponential(vec![0.2], vec![-0.3]).unwrap(),
            VolatilityFunction::piecewise(vec![0.0, 0.7, 1.9, 10.0], vec![vec![0.1], vec![0.25], vec![0.05]])
                .unwrap(),
        ]
    }

    // ========================================
    // Agreement With Quadrature
    // ========================================

    #[test]
    fn test_all_pairs_against_quadrature() {
        let (t, dt, m1, m2) = (0.4, 2.1, 4.0, 6.5);
        // Piecewise integrands jump, so integrate each piece separately and
        // keep the nodes off the break points.
        let cuts = [0.4, 0.7, 1.9, 2.5];
        let integrate = |f: &dyn Fn(f64) -> f64| -> f64 {
            cuts.windows(2)
                .map(|w| simpson(f, w[0] + 1e-13, w[1] - 1e-13, 2000))
                .sum()
        };

        for lhs in single_factor_shapes() {
            for rhs in single_factor_shapes() {
                let (sl, bl) = pointwise(&lhs);
                let (sr, br) = pointwise(&rhs);

                let vp = integrate(&|s| sl(s) * sr(s));
                assert_relative_eq!(
                    volproduct(&lhs, &rhs, t, dt).unwrap(),
                    vp,
                    max_relative = 1e-9
                );

                let bvp = integrate(&|s| bl(s, m1) * sr(s));
                assert_relative_eq!(
                    bondvolproduct(&lhs, m1, &rhs, t, dt).unwrap(),
                    bvp,
                    max_relative = 1e-9
                );

                let bbvp = integrate(&|s| bl(s, m1) * br(s, m2));
                assert_relative_eq!(
                    bondbondvolproduct(&lhs, m1, &rhs, m2, t, dt).unwrap(),
                    bbvp,
                    max_relative = 1e-9
                );
            }
        }
    }

    // ========================================
    // Structural Properties
    // ========================================

    #[test]
    fn test_factor_mismatch_rejected() {
        let one = VolatilityFunction::constant(vec![0.1]).unwrap();
        let two = VolatilityFunction::exponential(vec![0.1, 0.1], vec![0.1, 0.2]).unwrap();
        assert!(matches!(
            volproduct(&one, &two, 0.0, 1.0),
            Err(VolatilityError::FactorMismatch { lhs: 1, rhs: 2 })
        ));
        assert!(bondvolproduct(&one, 5.0, &two, 0.0, 1.0).is_err());
        assert!(bondbondvolproduct(&two, 5.0, &one, 5.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_difference_expands_linearly() {
        let a = VolatilityFunction::exponential(vec![0.2, 0.1], vec![0.3, -0.1]).unwrap();
        let b = VolatilityFunction::constant(vec![0.05, 0.15]).unwrap();
        let w = VolatilityFunction::piecewise(vec![0.0, 1.0, 5.0], vec![vec![0.1, 0.2], vec![0.3, 0.1]])
            .unwrap();
        let diff = VolatilityFunction::difference(a.clone(), b.clone()).unwrap();

        let expected = volproduct(&a, &w, 0.5, 2.0).unwrap() - volproduct(&b, &w, 0.5, 2.0).unwrap();
        assert_relative_eq!(volproduct(&diff, &w, 0.5, 2.0).unwrap(), expected, max_relative = 1e-14);
        assert_relative_eq!(volproduct(&w, &diff, 0.5, 2.0).unwrap(), expected, max_relative = 1e-14);

        let rates = VolatilityFunction::constant(vec![0.01, 0.005]).unwrap();
        let expected = bondvolproduct(&rates, 5.0, &a, 0.0, 1.0).unwrap()
            - bondvolproduct(&rates, 5.0, &b, 0.0, 1.0).unwrap();
        assert_relative_eq!(
            bondvolproduct(&rates, 5.0, &diff, 0.0, 1.0).unwrap(),
            expected,
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_piecewise_extrapolation_propagates() {
        let p = VolatilityFunction::piecewise(vec![0.0, 1.0], vec![vec![0.1]]).unwrap();
        let c = VolatilityFunction::constant(vec![0.1]).unwrap();
        assert!(matches!(
            volproduct(&c, &p, 0.5, 1.0),
            Err(VolatilityError::Extrapolation { .. })
        ));
    }

    fn arbitrary_shape() -> impl Strategy<Value = VolatilityFunction> {
        prop_oneof![
            (0.0..0.5_f64, 0.0..0.5_f64)
                .prop_map(|(v, w)| VolatilityFunction::constant(vec![v, w]).unwrap()),
            (0.0..0.5_f64, -1.0..2.0_f64, 0.0..0.5_f64, -1.0..2.0_f64).prop_map(|(v, a, w, c)| {
                VolatilityFunction::exponential(vec![v, w], vec![a, c]).unwrap()
            }),
            (0.0..0.5_f64, 0.0..0.5_f64, 0.1..4.0_f64).prop_map(|(v, w, cut)| {
                VolatilityFunction::piecewise(vec![0.0, cut, 10.0], vec![vec![v, w], vec![w, v]])
                    .unwrap()
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_volproduct_symmetric(
            lhs in arbitrary_shape(),
            rhs in arbitrary_shape(),
            t in 0.0..3.0_f64,
            dt in 0.0..3.0_f64,
        ) {
            let forward = volproduct(&lhs, &rhs, t, dt).unwrap();
            let backward = volproduct(&rhs, &lhs, t, dt).unwrap();
            prop_assert!((forward - backward).abs() <= 1e-12 * forward.abs().max(1e-12));
        }

        #[test]
        fn prop_bondbond_symmetric(
            lhs in arbitrary_shape(),
            rhs in arbitrary_shape(),
            dt in 0.01..2.0_f64,
        ) {
            let forward = bondbondvolproduct(&lhs, 4.0, &rhs, 7.0, 0.5, dt).unwrap();
            let backward = bondbondvolproduct(&rhs, 7.0, &lhs, 4.0, 0.5, dt).unwrap();
            prop_assert!((forward - backward).abs() <= 1e-11 * forward.abs().max(1e-12));
        }

        #[test]
        fn prop_volproduct_additive(
            lhs in arbitrary_shape(),
            rhs in arbitrary_shape(),
            t in 0.0..2.0_f64,
            first in 0.0..2.0_f64,
            second in 0.0..2.0_f64,
        ) {
            let whole = volproduct(&lhs, &rhs, t, first + second).unwrap();
            let split = volproduct(&lhs, &rhs, t, first).unwrap()
                + volproduct(&lhs, &rhs, t + first, second).unwrap();
            prop_assert!((whole - split).abs() <= 1e-11 * whole.abs().max(1e-10));
        }
    }
}
