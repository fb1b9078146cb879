//! Linear combinations of instantaneous and bond volatilities.

use std::sync::Arc;

use super::error::VolatilityError;
use super::mediator::{bondbondvolproduct, bondvolproduct, volproduct};
use super::VolatilityFunction;

/// One volatility entering a log-price diffusion.
#[derive(Debug, Clone)]
pub enum VolTerm {
    /// Instantaneous volatility `σ(s)`.
    Instantaneous(Arc<VolatilityFunction>),
    /// Bond volatility `b(s, maturity)` of a rate volatility.
    Bond {
        /// Rate volatility.
        vol: Arc<VolatilityFunction>,
        /// Bond maturity.
        maturity: f64,
    },
}

impl VolTerm {
    fn factors(&self) -> usize {
        match self {
            VolTerm::Instantaneous(vol) | VolTerm::Bond { vol, .. } => vol.factors(),
        }
    }

    /// `∫_t^{t+dt} self(s)·other(s) ds`.
    pub fn product(&self, other: &VolTerm, t: f64, dt: f64) -> Result<f64, VolatilityError> {
        match (self, other) {
            (VolTerm::Instantaneous(lhs), VolTerm::Instantaneous(rhs)) => {
                volproduct(lhs, rhs, t, dt)
            }
            (VolTerm::Bond { vol, maturity }, VolTerm::Instantaneous(inst))
            | (VolTerm::Instantaneous(inst), VolTerm::Bond { vol, maturity }) => {
                bondvolproduct(vol, *maturity, inst, t, dt)
            }
            (
                VolTerm::Bond {
                    vol: lhs,
                    maturity: t1,
                },
                VolTerm::Bond {
                    vol: rhs,
                    maturity: t2,
                },
            ) => bondbondvolproduct(lhs, *t1, rhs, *t2, t, dt),
        }
    }
}

/// Vector volatility `Σ_k c_k·term_k` of a log price.
///
/// Log-prices in the model diffuse with sums of asset, exchange-rate and
/// bond volatilities, e.g. `σ_X - b_f(·,T) + b_d(·,T)` for the forward
/// exchange rate. Their covariances are bilinear in the terms, so they
/// expand into the pairwise integrals of the mediator.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hjm_models::volatility::{VolExpression, VolatilityFunction};
///
/// let fx = Arc::new(VolatilityFunction::constant(vec![0.1, 0.0]).unwrap());
/// let rates = Arc::new(VolatilityFunction::constant(vec![0.0, 0.01]).unwrap());
///
/// let forward_fx = VolExpression::new()
///     .instantaneous(1.0, fx)
///     .bond(1.0, rates, 2.0);
/// let variance = forward_fx.variance(0.0, 2.0).unwrap();
/// // 0.1² · 2 + 0.01² · ∫_0^2 (2 - s)² ds
/// assert!((variance - (0.02 + 1e-4 * 8.0 / 3.0)).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VolExpression {
    terms: Vec<(f64, VolTerm)>,
}

impl VolExpression {
    /// Empty expression (zero volatility).
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `coefficient · term`.
    pub fn plus(mut self, coefficient: f64, term: VolTerm) -> Self {
        if coefficient != 0.0 {
            self.terms.push((coefficient, term));
        }
        self
    }

    /// Append `coefficient · σ(s)`.
    pub fn instantaneous(self, coefficient: f64, vol: Arc<VolatilityFunction>) -> Self {
        self.plus(coefficient, VolTerm::Instantaneous(vol))
    }

    /// Append `coefficient · b(s, maturity)`.
    pub fn bond(self, coefficient: f64, vol: Arc<VolatilityFunction>, maturity: f64) -> Self {
        self.plus(coefficient, VolTerm::Bond { vol, maturity })
    }

    /// Concatenate two expressions.
    pub fn concat(mut self, other: &VolExpression) -> Self {
        self.terms.extend(other.terms.iter().cloned());
        self
    }

    /// `self - other`.
    pub fn minus(self, other: &VolExpression) -> Self {
        self.concat(&other.negated())
    }

    /// `-self`.
    pub fn negated(&self) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(c, term)| (-c, term.clone()))
                .collect(),
        }
    }

    /// Terms with their coefficients.
    pub fn terms(&self) -> &[(f64, VolTerm)] {
        &self.terms
    }

    /// `true` if the expression has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// `∫_t^{t+dt} self(s)·other(s) ds`.
    ///
    /// # Errors
    ///
    /// `FactorMismatch` when two terms disagree on the factor count, or the
    /// error of the first pairwise integral that fails.
    pub fn inner_product(
        &self,
        other: &VolExpression,
        t: f64,
        dt: f64,
    ) -> Result<f64, VolatilityError> {
        let mut total = 0.0;
        for (c, lhs) in &self.terms {
            for (d, rhs) in &other.terms {
                if lhs.factors() != rhs.factors() {
                    return Err(VolatilityError::FactorMismatch {
                        lhs: lhs.factors(),
                        rhs: rhs.factors(),
                    });
                }
                total += c * d * lhs.product(rhs, t, dt)?;
            }
        }
        Ok(total)
    }

    /// `∫_t^{t+dt} |self(s)|² ds`, floored at zero.
    pub fn variance(&self, t: f64, dt: f64) -> Result<f64, VolatilityError> {
        Ok(self.inner_product(self, t, dt)?.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arc(vol: VolatilityFunction) -> Arc<VolatilityFunction> {
        Arc::new(vol)
    }

    #[test]
    fn test_expression_expands_bilinearly() {
        let sigma = arc(VolatilityFunction::exponential(vec![0.2, 0.05], vec![0.1, 0.0]).unwrap());
        let rates = arc(VolatilityFunction::exponential(vec![0.01, 0.0], vec![0.05, 0.0]).unwrap());
        let expr = VolExpression::new()
            .instantaneous(1.0, sigma.clone())
            .bond(-1.0, rates.clone(), 3.0);

        let (t, dt) = (0.5, 1.5);
        let expected = sigma.volproduct(t, dt, &sigma).unwrap()
            - 2.0 * rates.bondvolproduct(t, dt, 3.0, &sigma).unwrap()
            + rates.bondbondvolproduct(t, dt, 3.0, 3.0, &rates).unwrap();
        assert_relative_eq!(expr.variance(t, dt).unwrap(), expected, max_relative = 1e-13);
    }

    #[test]
    fn test_negation_and_subtraction() {
        let sigma = arc(VolatilityFunction::constant(vec![0.3]).unwrap());
        let one = VolExpression::new().instantaneous(1.0, sigma.clone());
        let zero = one.clone().minus(&one);
        assert_eq!(zero.terms().len(), 2);
        assert!(zero.variance(0.0, 1.0).unwrap().abs() < 1e-16);
        assert_relative_eq!(
            one.inner_product(&one.negated(), 0.0, 1.0).unwrap(),
            -0.09,
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_zero_coefficients_dropped() {
        let sigma = arc(VolatilityFunction::constant(vec![0.3]).unwrap());
        let expr = VolExpression::new().instantaneous(0.0, sigma);
        assert!(expr.is_empty());
        assert_eq!(expr.variance(0.0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_factor_mismatch_between_terms() {
        let one = arc(VolatilityFunction::constant(vec![0.3]).unwrap());
        let two = arc(VolatilityFunction::constant(vec![0.3, 0.1]).unwrap());
        let expr = VolExpression::new()
            .instantaneous(1.0, one)
            .instantaneous(1.0, two);
        assert!(matches!(
            expr.variance(0.0, 1.0),
            Err(VolatilityError::FactorMismatch { .. })
        ));
    }
}
