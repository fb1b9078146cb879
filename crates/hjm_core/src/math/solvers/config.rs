//! Solver configuration types.

/// Configuration for root-finding algorithms.
///
/// # Example
///
/// ```
/// use hjm_core::math::solvers::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
/// assert!(config.max_iterations >= 50);
///
/// let custom = SolverConfig::new(1e-12, 200);
/// assert_eq!(custom.max_iterations, 200);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Absolute tolerance on the root location.
    pub tolerance: f64,

    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    /// Tolerance 1e-12, 100 iterations.
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 100,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration.
    ///
    /// # Panics
    ///
    /// Panics if `tolerance <= 0` or `max_iterations == 0`.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        assert!(tolerance > 0.0, "tolerance must be positive");
        assert!(max_iterations > 0, "max_iterations must be positive");
        Self {
            tolerance,
            max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = SolverConfig::default();
        assert_eq!(config.tolerance, 1e-12);
        assert_eq!(config.max_iterations, 100);
    }

    #[test]
    #[should_panic(expected = "tolerance must be positive")]
    fn test_new_rejects_zero_tolerance() {
        let _ = SolverConfig::new(0.0, 10);
    }

    #[test]
    #[should_panic(expected = "max_iterations must be positive")]
    fn test_new_rejects_zero_iterations() {
        let _ = SolverConfig::new(1e-8, 0);
    }
}
