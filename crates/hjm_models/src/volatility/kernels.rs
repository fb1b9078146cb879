//! Scalar integral kernels shared by every closed form.
//!
//! All integrals of exponential volatility shapes reduce to the entire
//! functions
//!
//! ```text
//! φ1(z) = (e^z - 1) / z              = e[0, z]
//! φ2(z) = (e^z - 1 - z) / z²         = e[0, 0, z]
//! dd2(p, q) = (φ1(p) - φ1(q)) / (p - q) = e[0, p, q]
//! ```
//!
//! where `e[...]` denotes divided differences of `exp`. Each is evaluated
//! with a power series near the origin and an algebraically rearranged
//! closed form elsewhere, so every formula stays accurate as decays tend to
//! zero and reduces to its constant-volatility counterpart.
//!
//! Per factor, a volatility shape is described by a level `v` and a decay
//! `a` (zero for constant levels). The state-variable volatility is
//! `v·e^{a s}` and the bond volatility to maturity `T` is `v·h_a(T - s)`.

/// Below this magnitude `φ2` and `dd2` switch to their power series.
const SERIES_RADIUS: f64 = 0.1;

/// Terms kept in the single-variable series (error below 1e-17 inside
/// `SERIES_RADIUS`).
const SERIES_TERMS: usize = 14;

/// Below this magnitude of `a·τ` the bond-bond kernel uses its double series.
const DOUBLE_SERIES_RADIUS: f64 = 0.5;

/// Terms per variable kept in the double series.
const DOUBLE_SERIES_TERMS: usize = 17;

/// `φ1(z) = (e^z - 1) / z`, with `φ1(0) = 1`.
#[inline]
pub fn phi1(z: f64) -> f64 {
    if z == 0.0 {
        1.0
    } else {
        z.exp_m1() / z
    }
}

/// `φ2(z) = (e^z - 1 - z) / z²`, with `φ2(0) = 1/2`.
pub fn phi2(z: f64) -> f64 {
    if z.abs() < SERIES_RADIUS {
        // Σ z^k / (k + 2)!
        let mut term = 0.5;
        let mut sum = term;
        for k in 1..SERIES_TERMS {
            term *= z / (k + 2) as f64;
            sum += term;
        }
        sum
    } else {
        (z.exp_m1() - z) / (z * z)
    }
}

/// Second divided difference of `exp` at `(0, p, q)`.
///
/// Symmetric in `p` and `q`; `dd2(z, z) = φ1'(z)` and `dd2(z, 0) = φ2(z)`.
pub fn dd2(p: f64, q: f64) -> f64 {
    if p.abs().max(q.abs()) < SERIES_RADIUS {
        // Σ_n h_n(p, q) / (n + 2)!, h_n the complete homogeneous polynomial
        let mut homogeneous = 1.0;
        let mut q_power = 1.0;
        let mut factorial = 2.0;
        let mut sum = 0.5;
        for n in 1..SERIES_TERMS {
            q_power *= q;
            homogeneous = p * homogeneous + q_power;
            factorial *= (n + 2) as f64;
            sum += homogeneous / factorial;
        }
        sum
    } else if p.abs() >= q.abs() {
        ((q.exp() * phi1(p - q)) - phi1(q)) / p
    } else {
        ((p.exp() * phi1(q - p)) - phi1(p)) / q
    }
}

/// `h_a(y) = (1 - e^{-a y}) / a`, with `h_0(y) = y`.
#[inline]
pub fn h(a: f64, y: f64) -> f64 {
    y * phi1(-a * y)
}

/// `∫_t^{t+τ} e^{λ s} ds`.
#[inline]
pub fn exp_integral(lambda: f64, t: f64, tau: f64) -> f64 {
    (lambda * t).exp() * tau * phi1(lambda * tau)
}

/// `∫_t^{t+τ} h_a(T - s)·e^{c s} ds` with `x = T - t`.
///
/// Bond volatility of shape `a` against instantaneous volatility of shape
/// `c`, per unit of level.
pub fn bond_instantaneous(a: f64, c: f64, x: f64, t: f64, tau: f64) -> f64 {
    let r = x - tau;
    let head = h(a, r) * tau * phi1(c * tau);
    let tail = (-a * r).exp() * tau * tau * dd2(c * tau, -a * tau);
    (c * t).exp() * (head + tail)
}

/// `∫_t^{t+τ} h_{a1}(T1 - s)·h_{a2}(T2 - s) ds` with `x_i = T_i - t`.
pub fn bond_bond(a1: f64, x1: f64, a2: f64, x2: f64, tau: f64) -> f64 {
    let (r1, r2) = (x1 - tau, x2 - tau);
    let (alpha1, alpha2) = (h(a1, r1), h(a2, r2));
    let (beta1, beta2) = ((-a1 * r1).exp(), (-a2 * r2).exp());
    let tau2 = tau * tau;

    alpha1 * alpha2 * tau
        + alpha1 * beta2 * tau2 * phi2(-a2 * tau)
        + alpha2 * beta1 * tau2 * phi2(-a1 * tau)
        + beta1 * beta2 * tau2 * tau * h_product_integral(a1 * tau, a2 * tau)
}

/// `∫_0^1 r² φ1(-z1 r) φ1(-z2 r) dr`.
fn h_product_integral(z1: f64, z2: f64) -> f64 {
    if z1.abs().max(z2.abs()) < DOUBLE_SERIES_RADIUS {
        // Σ_{j,k} (-z1)^j (-z2)^k / ((j+1)! (k+1)! (j+k+3))
        let mut u = [0.0; DOUBLE_SERIES_TERMS];
        let mut w = [0.0; DOUBLE_SERIES_TERMS];
        let (mut pu, mut pw) = (1.0, 1.0);
        for j in 0..DOUBLE_SERIES_TERMS {
            pu /= (j + 1) as f64;
            pw /= (j + 1) as f64;
            u[j] = pu;
            w[j] = pw;
            pu *= -z1;
            pw *= -z2;
        }
        let mut sum = 0.0;
        for (j, uj) in u.iter().enumerate() {
            for (k, wk) in w.iter().enumerate() {
                sum += uj * wk / (j + k + 3) as f64;
            }
        }
        sum
    } else {
        let (z1, z2) = if z1.abs() >= z2.abs() { (z1, z2) } else { (z2, z1) };
        (phi2(-z2) - dd2(-(z1 + z2), -z1)) / z1
    }
}

/// `∫_t^{t+τ} (T - s) ds` with `x = T - t`.
#[inline]
pub fn constant_bond_instantaneous(x: f64, tau: f64) -> f64 {
    tau * (x - 0.5 * tau)
}

/// `∫_t^{t+τ} (T1 - s)(T2 - s) ds` with `x_i = T_i - t`.
#[inline]
pub fn constant_bond_bond(x1: f64, x2: f64, tau: f64) -> f64 {
    x1 * x2 * tau - 0.5 * (x1 + x2) * tau * tau + tau * tau * tau / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// Composite Simpson rule with `n` (even) panels.
    fn simpson<F: Fn(f64) -> f64>(f: F, lo: f64, hi: f64, n: usize) -> f64 {
        let step = (hi - lo) / n as f64;
        let mut sum = f(lo) + f(hi);
        for k in 1..n {
            let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight * f(lo + k as f64 * step);
        }
        sum * step / 3.0
    }

    // ========================================
    // φ-function Tests
    // ========================================

    #[test]
    fn test_phi_values_at_zero() {
        assert_eq!(phi1(0.0), 1.0);
        assert_eq!(phi2(0.0), 0.5);
        assert_eq!(dd2(0.0, 0.0), 0.5);
    }

    #[test]
    fn test_phi2_continuous_across_series_switch() {
        let inside = phi2(SERIES_RADIUS * (1.0 - 1e-12));
        let outside = phi2(SERIES_RADIUS * (1.0 + 1e-12));
        assert_relative_eq!(inside, outside, max_relative = 1e-13);
    }

    #[test]
    fn test_dd2_matches_definition() {
        let (p, q) = (1.3, -0.7);
        let direct = (phi1(p) - phi1(q)) / (p - q);
        assert_relative_eq!(dd2(p, q), direct, max_relative = 1e-14);
        assert_relative_eq!(dd2(q, p), direct, max_relative = 1e-14);
    }

    #[test]
    fn test_dd2_confluent_is_phi1_derivative() {
        let m = 0.8_f64;
        let derivative = (m * m.exp() - m.exp_m1()) / (m * m);
        assert_relative_eq!(dd2(m, m), derivative, max_relative = 1e-13);
    }

    #[test]
    fn test_dd2_reduces_to_phi2() {
        for z in [-3.0, -0.05, 0.02, 0.7, 5.0] {
            assert_relative_eq!(dd2(z, 0.0), phi2(z), max_relative = 1e-13);
        }
    }

    #[test]
    fn test_h_limits() {
        assert_eq!(h(0.0, 2.5), 2.5);
        assert_relative_eq!(h(0.3, 2.0), (1.0 - (-0.6_f64).exp()) / 0.3, max_relative = 1e-14);
    }

    proptest! {
        #[test]
        fn prop_dd2_symmetric(p in -5.0..5.0_f64, q in -5.0..5.0_f64) {
            let lhs = dd2(p, q);
            let rhs = dd2(q, p);
            prop_assert!((lhs - rhs).abs() <= 1e-12 * lhs.abs().max(1.0));
        }

        #[test]
        fn prop_dd2_between_endpoint_derivatives(p in -3.0..3.0_f64, q in -3.0..3.0_f64) {
            // φ1 is convex, so its secant slope lies between its end slopes.
            let lo = dd2(p.min(q), p.min(q));
            let hi = dd2(p.max(q), p.max(q));
            let mid = dd2(p, q);
            prop_assert!(mid >= lo - 1e-12 && mid <= hi + 1e-12);
        }
    }

    // ========================================
    // Integral Kernel Tests
    // ========================================

    #[test]
    fn test_exp_integral_against_quadrature() {
        let (lambda, t, tau) = (0.35, 1.5, 2.0);
        let numeric = simpson(|s| (lambda * s).exp(), t, t + tau, 2000);
        assert_relative_eq!(exp_integral(lambda, t, tau), numeric, max_relative = 1e-12);
    }

    #[test]
    fn test_bond_instantaneous_against_quadrature() {
        let cases = [
            (0.1, 0.05, 1.0, 0.5),
            (1.2, -0.4, 0.0, 3.0),
            (0.0, 0.3, 2.0, 1.0),
            (0.5, 0.0, 0.7, 0.25),
            (2.5, 2.5, 0.0, 5.0),
        ];
        for &(a, c, t, tau) in &cases {
            let maturity = t + tau + 1.5;
            let numeric = simpson(
                |s| h(a, maturity - s) * (c * s).exp(),
                t,
                t + tau,
                4000,
            );
            let closed = bond_instantaneous(a, c, maturity - t, t, tau);
            assert_relative_eq!(closed, numeric, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_bond_bond_against_quadrature() {
        let cases = [
            (0.1, 0.05, 0.0, 1.0),
            (1.2, 0.4, 1.0, 3.0),
            (0.0, 0.3, 2.0, 1.0),
            (3.0, -0.2, 0.5, 2.0),
            (0.02, 0.01, 0.0, 10.0),
        ];
        for &(a1, a2, t, tau) in &cases {
            let (t1, t2) = (t + tau + 0.5, t + tau + 4.0);
            let numeric = simpson(
                |s| h(a1, t1 - s) * h(a2, t2 - s),
                t,
                t + tau,
                4000,
            );
            let closed = bond_bond(a1, t1 - t, a2, t2 - t, tau);
            assert_relative_eq!(closed, numeric, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_kernels_reduce_to_constant_forms() {
        let (x1, x2, tau) = (3.0, 5.0, 2.0);
        assert_relative_eq!(
            bond_instantaneous(1e-9, 0.0, x1, 0.0, tau),
            constant_bond_instantaneous(x1, tau),
            max_relative = 1e-8
        );
        assert_relative_eq!(
            bond_bond(1e-9, x1, 1e-9, x2, tau),
            constant_bond_bond(x1, x2, tau),
            max_relative = 1e-8
        );
        assert_relative_eq!(
            bond_bond(0.0, x1, 0.0, x2, tau),
            constant_bond_bond(x1, x2, tau),
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_h_product_integral_continuous_across_switch() {
        let z = DOUBLE_SERIES_RADIUS;
        let inside = h_product_integral(z * (1.0 - 1e-12), 0.2);
        let outside = h_product_integral(z * (1.0 + 1e-12), 0.2);
        assert_relative_eq!(inside, outside, max_relative = 1e-12);
    }
}
