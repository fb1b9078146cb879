//! Volatility function errors.

use hjm_core::types::PricingError;
use thiserror::Error;

use super::VolatilityKind;

/// Errors raised by volatility functions and the mediator.
///
/// All variants describe configuration or programming errors; none of them
/// is transient.
///
/// # Examples
///
/// ```
/// use hjm_models::volatility::{VolatilityError, VolatilityKind};
///
/// let err = VolatilityError::UnsupportedPair {
///     operation: "bondvolproduct",
///     lhs: VolatilityKind::Difference,
///     rhs: VolatilityKind::Constant,
/// };
/// assert!(err.to_string().contains("difference"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VolatilityError {
    /// Operands of a binary operation have different factor counts.
    #[error("Factor mismatch: {lhs} factors vs {rhs} factors")]
    FactorMismatch {
        /// Factor count of the left operand
        lhs: usize,
        /// Factor count of the right operand
        rhs: usize,
    },

    /// Factor index outside `0..factors`.
    #[error("Factor index {index} out of range for {factors} factors")]
    FactorIndex {
        /// Requested index
        index: usize,
        /// Factor count of the function
        factors: usize,
    },

    /// Unary operation without a closed form for this shape.
    #[error("Operation '{operation}' is not supported for {kind} volatility")]
    Unsupported {
        /// Operation name
        operation: &'static str,
        /// Shape of the operand
        kind: VolatilityKind,
    },

    /// Pairwise operation without a closed form for this pair of shapes.
    #[error("Operation '{operation}' is not supported for {lhs} x {rhs} volatility")]
    UnsupportedPair {
        /// Operation name
        operation: &'static str,
        /// Shape of the left operand
        lhs: VolatilityKind,
        /// Shape of the right operand
        rhs: VolatilityKind,
    },

    /// Query outside the domain of a piecewise constant function.
    #[error("Cannot extrapolate volatility to t = {t}: defined on [{start}, {end}]")]
    Extrapolation {
        /// Offending time
        t: f64,
        /// First break point
        start: f64,
        /// Last break point
        end: f64,
    },

    /// Invalid construction or query parameter.
    #[error("Invalid volatility parameter: {0}")]
    InvalidParameter(String),
}

impl From<VolatilityError> for PricingError {
    fn from(err: VolatilityError) -> Self {
        match err {
            VolatilityError::Unsupported { .. } | VolatilityError::UnsupportedPair { .. } => {
                PricingError::Unsupported(err.to_string())
            }
            _ => PricingError::InvalidInput(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_mismatch_display() {
        let err = VolatilityError::FactorMismatch { lhs: 2, rhs: 3 };
        assert_eq!(err.to_string(), "Factor mismatch: 2 factors vs 3 factors");
    }

    #[test]
    fn test_extrapolation_display() {
        let err = VolatilityError::Extrapolation {
            t: 12.0,
            start: 0.0,
            end: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "Cannot extrapolate volatility to t = 12: defined on [0, 10]"
        );
    }

    #[test]
    fn test_unsupported_display() {
        let err = VolatilityError::Unsupported {
            operation: "A",
            kind: VolatilityKind::Difference,
        };
        assert_eq!(
            err.to_string(),
            "Operation 'A' is not supported for difference volatility"
        );
    }

    #[test]
    fn test_into_pricing_error() {
        let err: PricingError = VolatilityError::UnsupportedPair {
            operation: "bondbondvolproduct",
            lhs: VolatilityKind::Difference,
            rhs: VolatilityKind::Exponential,
        }
        .into();
        assert!(matches!(err, PricingError::Unsupported(_)));

        let err: PricingError = VolatilityError::FactorMismatch { lhs: 1, rhs: 2 }.into();
        assert!(matches!(err, PricingError::InvalidInput(_)));
    }
}
