//! Brent's method root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;

/// Brent's method root finder.
///
/// Combines bisection, secant and inverse quadratic interpolation. The
/// bracket `[a, b]` is maintained throughout, so the method converges for
/// any continuous function whose endpoint values differ in sign.
///
/// # Example
///
/// ```
/// use hjm_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
///
/// // Solve x³ - x - 2 = 0 in bracket [1, 2]
/// let f = |x: f64| x * x * x - x - 2.0;
///
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!(f(root).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver {
    config: SolverConfig,
}

impl BrentSolver {
    /// Create a new Brent solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Find a root of `f` in the bracket [a, b].
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Root located to within the configured tolerance
    /// * `Err(SolverError::NoBracket)` - `f(a)` and `f(b)` have same sign
    /// * `Err(SolverError::MaxIterationsExceeded)` - Failed to converge
    pub fn find_root<F>(&self, f: F, a: f64, b: f64) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        let mut a = a;
        let mut b = b;
        let mut fa = f(a);
        let mut fb = f(b);

        if fa == 0.0 {
            return Ok(a);
        }
        if fb == 0.0 {
            return Ok(b);
        }
        if fa * fb > 0.0 || fa.is_nan() || fb.is_nan() {
            return Err(SolverError::NoBracket { a, b });
        }

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        for _ in 0..self.config.max_iterations {
            if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * self.config.tolerance;
            let m = 0.5 * (c - b);
            if m.abs() <= tol || fb == 0.0 {
                return Ok(b);
            }

            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    // Secant step
                    (2.0 * m * s, 1.0 - s)
                } else {
                    // Inverse quadratic interpolation
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * m * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();

                let min1 = 3.0 * m * q - (tol * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = m;
                    e = d;
                }
            } else {
                d = m;
                e = d;
            }

            a = b;
            fa = fb;
            b += if d.abs() > tol { d } else { tol.copysign(m) };
            fb = f(b);
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Expand `[a, b]` geometrically around its midpoint until `f` changes
    /// sign, then solve.
    ///
    /// Used where only a plausible search region is known, e.g. the
    /// break-even state of a coupon bond.
    pub fn find_root_expanding<F>(
        &self,
        f: F,
        a: f64,
        b: f64,
        max_expansions: usize,
    ) -> Result<f64, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        let mut lo = a;
        let mut hi = b;
        for _ in 0..max_expansions {
            if f(lo) * f(hi) <= 0.0 {
                return self.find_root(&f, lo, hi);
            }
            let width = hi - lo;
            lo -= width;
            hi += width;
        }
        self.find_root(&f, lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ========================================
    // Basic Functionality Tests
    // ========================================

    #[test]
    fn test_find_sqrt_2() {
        let solver = BrentSolver::with_defaults();
        let root = solver.find_root(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert_relative_eq!(root, std::f64::consts::SQRT_2, epsilon = 1e-11);
    }

    #[test]
    fn test_find_transcendental_root() {
        let solver = BrentSolver::with_defaults();
        // cos(x) = x near 0.739
        let root = solver.find_root(|x: f64| x.cos() - x, 0.0, 1.0).unwrap();
        assert_relative_eq!(root, 0.739_085_133_215_160_6, epsilon = 1e-11);
    }

    #[test]
    fn test_root_at_endpoint() {
        let solver = BrentSolver::with_defaults();
        assert_eq!(solver.find_root(|x| x - 1.0, 1.0, 3.0).unwrap(), 1.0);
    }

    #[test]
    fn test_reversed_bracket() {
        let solver = BrentSolver::with_defaults();
        let root = solver.find_root(|x| x * x - 4.0, 5.0, 0.0).unwrap();
        assert_relative_eq!(root, 2.0, epsilon = 1e-11);
    }

    // ========================================
    // Error Tests
    // ========================================

    #[test]
    fn test_no_bracket() {
        let solver = BrentSolver::with_defaults();
        let result = solver.find_root(|x| x * x + 1.0, -1.0, 1.0);
        assert!(matches!(result, Err(SolverError::NoBracket { .. })));
    }

    #[test]
    fn test_iteration_budget() {
        let solver = BrentSolver::new(SolverConfig::new(1e-300, 2));
        let result = solver.find_root(|x: f64| x.exp() - 10.0, 0.0, 100.0);
        assert!(matches!(
            result,
            Err(SolverError::MaxIterationsExceeded { iterations: 2 })
        ));
    }

    #[test]
    fn test_expanding_bracket() {
        let solver = BrentSolver::with_defaults();
        let root = solver
            .find_root_expanding(|x| x - 37.0, -1.0, 1.0, 20)
            .unwrap();
        assert_relative_eq!(root, 37.0, epsilon = 1e-10);
    }
}
