//! Standard normal distribution helpers.
//!
//! The distribution function is evaluated through the complementary error
//! function from `statrs`. Its absolute error is of order `1e-11`, and the
//! lower tail keeps its relative accuracy where `1 - N(-x)` would cancel.

use statrs::function::erf::erfc;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Standard normal probability density.
///
/// # Example
///
/// ```
/// use hjm_core::math::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0) - 0.398_942_280_401_432_7).abs() < 1e-15);
/// ```
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal cumulative distribution function.
///
/// # Example
///
/// ```
/// use hjm_core::math::distributions::norm_cdf;
///
/// assert!((norm_cdf(1.959_963_984_540_054) - 0.975).abs() < 1e-10);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_cdf_at_zero() {
        assert_relative_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_cdf_known_values() {
        assert_relative_eq!(norm_cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-10);
        assert_relative_eq!(norm_cdf(-2.0), 0.022_750_131_948_179_2, epsilon = 1e-10);
    }

    #[test]
    fn test_cdf_lower_tail_keeps_precision() {
        // N(-10) ~ 7.6e-24
        let p = norm_cdf(-10.0);
        assert!(p > 7.0e-24 && p < 8.0e-24);
    }

    proptest! {
        #[test]
        fn prop_cdf_symmetry(x in -8.0..8.0_f64) {
            prop_assert!((norm_cdf(x) + norm_cdf(-x) - 1.0).abs() < 1e-14);
        }

        #[test]
        fn prop_pdf_positive(x in -30.0..30.0_f64) {
            prop_assert!(norm_pdf(x) >= 0.0);
        }
    }
}
