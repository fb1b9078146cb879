//! Deterministic volatility functions.
//!
//! A volatility function is a time-dependent vector over a fixed number of
//! independent Brownian factors. It is used in three roles:
//!
//! - **Interest-rate volatility** of an economy: drives the forward rates
//!   and, through the bond volatility `b(s,T)`, all zero-coupon bond prices
//! - **Asset volatility**: instantaneous volatility of a traded asset
//! - **Exchange-rate volatility**: instantaneous volatility of a spot FX rate
//!
//! The concrete shapes form a closed enum, [`VolatilityFunction`]. Unary
//! operations dispatch on the shape; pairwise integrals go through the
//! [`mediator`], which matches on both shapes and applies the closed form
//! for that pair.
//!
//! ## Conventions
//!
//! For factor `i`:
//!
//! ```text
//! σ_i(s)       state-variable volatility
//! b_i(s, T)    bond volatility, ∫_s^T σ_i(s, u) du
//! z_i(t)       state variable, ∫_0^t σ_i(s) dW_i(s)
//! P(t, T)    = D(T)/D(t) · A(t,T) · exp(-B(t,T) · z(t))
//! ```
//!
//! ## Example
//!
//! ```
//! use hjm_models::volatility::VolatilityFunction;
//!
//! let rates = VolatilityFunction::exponential(vec![0.01], vec![0.05]).unwrap();
//! let equity = VolatilityFunction::constant(vec![0.2]).unwrap();
//!
//! // Covariance contribution between the equity and a 10y bond over one year
//! let cross = rates.bondvolproduct(0.0, 1.0, 10.0, &equity).unwrap();
//! assert!(cross > 0.0);
//! ```

mod constant;
mod difference;
mod error;
mod exponential;
mod expression;
pub mod kernels;
pub mod mediator;
mod piecewise;

pub use constant::ConstantVol;
pub use difference::DifferenceVol;
pub use error::VolatilityError;
pub use exponential::ExponentialVol;
pub use expression::{VolExpression, VolTerm};
pub use piecewise::PiecewiseConstantVol;

use std::fmt;

/// Shape tag of a [`VolatilityFunction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolatilityKind {
    /// [`ConstantVol`]
    Constant,
    /// [`ExponentialVol`]
    Exponential,
    /// [`PiecewiseConstantVol`]
    Piecewise,
    /// [`DifferenceVol`]
    Difference,
}

impl VolatilityKind {
    /// Lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityKind::Constant => "constant",
            VolatilityKind::Exponential => "exponential",
            VolatilityKind::Piecewise => "piecewise",
            VolatilityKind::Difference => "difference",
        }
    }
}

impl fmt::Display for VolatilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Time-dependent, vector-valued volatility.
///
/// Immutable once constructed; the factor count never changes and must
/// match across the operands of every pairwise operation.
#[derive(Debug, Clone, PartialEq)]
pub enum VolatilityFunction {
    /// Constant levels
    Constant(ConstantVol),
    /// Exponentially decaying forward-rate levels
    Exponential(ExponentialVol),
    /// Piecewise constant levels on a timeline
    Piecewise(PiecewiseConstantVol),
    /// Difference of two functions
    Difference(DifferenceVol),
}

impl VolatilityFunction {
    /// Constant volatility with one level per factor.
    pub fn constant(levels: Vec<f64>) -> Result<Self, VolatilityError> {
        Ok(VolatilityFunction::Constant(ConstantVol::new(levels)?))
    }

    /// Exponentially decaying volatility.
    pub fn exponential(levels: Vec<f64>, decays: Vec<f64>) -> Result<Self, VolatilityError> {
        Ok(VolatilityFunction::Exponential(ExponentialVol::new(
            levels, decays,
        )?))
    }

    /// Piecewise constant volatility on `breakpoints`.
    pub fn piecewise(
        breakpoints: Vec<f64>,
        levels: Vec<Vec<f64>>,
    ) -> Result<Self, VolatilityError> {
        Ok(VolatilityFunction::Piecewise(PiecewiseConstantVol::new(
            breakpoints,
            levels,
        )?))
    }

    /// Difference `lhs - rhs`.
    pub fn difference(lhs: Self, rhs: Self) -> Result<Self, VolatilityError> {
        Ok(VolatilityFunction::Difference(DifferenceVol::new(lhs, rhs)?))
    }

    /// Number of factors.
    pub fn factors(&self) -> usize {
        match self {
            VolatilityFunction::Constant(v) => v.factors(),
            VolatilityFunction::Exponential(v) => v.factors(),
            VolatilityFunction::Piecewise(v) => v.factors(),
            VolatilityFunction::Difference(v) => v.factors(),
        }
    }

    /// Shape tag.
    pub fn kind(&self) -> VolatilityKind {
        match self {
            VolatilityFunction::Constant(_) => VolatilityKind::Constant,
            VolatilityFunction::Exponential(_) => VolatilityKind::Exponential,
            VolatilityFunction::Piecewise(_) => VolatilityKind::Piecewise,
            VolatilityFunction::Difference(_) => VolatilityKind::Difference,
        }
    }

    fn unsupported(&self, operation: &'static str) -> VolatilityError {
        VolatilityError::Unsupported {
            operation,
            kind: self.kind(),
        }
    }

    fn check_factor(&self, i: usize) -> Result<(), VolatilityError> {
        if i >= self.factors() {
            return Err(VolatilityError::FactorIndex {
                index: i,
                factors: self.factors(),
            });
        }
        Ok(())
    }

    /// Per-factor `∫_t^{t+dt} σ_i(s) ds`.
    pub fn integral(&self, t: f64, dt: f64) -> Result<Vec<f64>, VolatilityError> {
        match self {
            VolatilityFunction::Constant(v) => Ok(v.integral(dt)),
            VolatilityFunction::Exponential(v) => Ok(v.integral(t, dt)),
            VolatilityFunction::Piecewise(v) => v.integral(t, dt),
            VolatilityFunction::Difference(v) => v.integral(t, dt),
        }
    }

    /// `∫_t^{t+dt} σ(s)·σ_other(s) ds`.
    pub fn volproduct(&self, t: f64, dt: f64, other: &Self) -> Result<f64, VolatilityError> {
        mediator::volproduct(self, other, t, dt)
    }

    /// `∫_t^{t+dt} b(s, bond_maturity)·σ_other(s) ds`.
    pub fn bondvolproduct(
        &self,
        t: f64,
        dt: f64,
        bond_maturity: f64,
        other: &Self,
    ) -> Result<f64, VolatilityError> {
        mediator::bondvolproduct(self, bond_maturity, other, t, dt)
    }

    /// `∫_t^{t+dt} b(s, t1)·b_other(s, t2) ds`.
    pub fn bondbondvolproduct(
        &self,
        t: f64,
        dt: f64,
        t1: f64,
        t2: f64,
        other: &Self,
    ) -> Result<f64, VolatilityError> {
        mediator::bondbondvolproduct(self, t1, other, t2, t, dt)
    }

    /// Per-factor `∫_t^T σ_i(s, T)² ds`, the variance of the instantaneous
    /// forward rate for `T` accumulated from `t`.
    pub fn forward_rate_variance(
        &self,
        t: f64,
        maturity: f64,
    ) -> Result<Vec<f64>, VolatilityError> {
        match self {
            VolatilityFunction::Constant(v) => Ok(v.forward_rate_variance(t, maturity)),
            VolatilityFunction::Exponential(v) => Ok(v.forward_rate_variance(t, maturity)),
            VolatilityFunction::Piecewise(v) => v.forward_rate_variance(t, maturity),
            VolatilityFunction::Difference(_) => Err(self.unsupported("forward_rate_variance")),
        }
    }

    /// Volatility of the forward bond price `P(·, t2) / P(·, t1)`
    /// accumulated over `[t, t1]`:
    ///
    /// ```text
    /// sqrt(∫_t^{t1} |b(s, t2) - b(s, t1)|² ds)
    /// ```
    ///
    /// # Errors
    ///
    /// `InvalidParameter` unless `t <= t1 <= t2`.
    pub fn fwd_bond_vol(&self, t: f64, t1: f64, t2: f64) -> Result<f64, VolatilityError> {
        if !(t <= t1 && t1 <= t2) {
            return Err(VolatilityError::InvalidParameter(format!(
                "forward bond volatility needs t <= T1 <= T2, got {} / {} / {}",
                t, t1, t2
            )));
        }
        let loading = match self {
            VolatilityFunction::Constant(v) => v.maturity_loading(t1, t2),
            VolatilityFunction::Exponential(v) => v.maturity_loading(t1, t2),
            VolatilityFunction::Piecewise(v) => v.maturity_loading(t1, t2),
            VolatilityFunction::Difference(_) => return Err(self.unsupported("fwd_bond_vol")),
        };
        let variance = self.forward_rate_variance(t, t1)?;
        Ok(loading
            .iter()
            .zip(&variance)
            .map(|(b, v)| b * b * v)
            .sum::<f64>()
            .sqrt())
    }

    /// Deterministic bond-price coefficient `A(t, T)`.
    pub fn a(&self, t: f64, maturity: f64) -> Result<f64, VolatilityError> {
        match self {
            VolatilityFunction::Constant(v) => Ok(v.a(t, maturity)),
            VolatilityFunction::Exponential(v) => Ok(v.a(t, maturity)),
            VolatilityFunction::Piecewise(v) => v.a(t, maturity),
            VolatilityFunction::Difference(_) => Err(self.unsupported("A")),
        }
    }

    /// Per-factor state-variable loading `B(t, T)` of the bond price.
    pub fn b(&self, t: f64, maturity: f64) -> Result<Vec<f64>, VolatilityError> {
        match self {
            VolatilityFunction::Constant(v) => Ok(v.b(t, maturity)),
            VolatilityFunction::Exponential(v) => Ok(v.b(t, maturity)),
            VolatilityFunction::Piecewise(v) => Ok(v.b(t, maturity)),
            VolatilityFunction::Difference(_) => Err(self.unsupported("B")),
        }
    }

    /// `∫_t^{t+dt} σ_i(s)² ds`, the variance of the state-variable increment.
    pub fn var(&self, i: usize, t: f64, dt: f64) -> Result<f64, VolatilityError> {
        self.check_factor(i)?;
        match self {
            VolatilityFunction::Constant(v) => Ok(v.var(i, dt)),
            VolatilityFunction::Exponential(v) => Ok(v.var(i, t, dt)),
            VolatilityFunction::Piecewise(v) => v.var(i, t, dt),
            VolatilityFunction::Difference(_) => Err(self.unsupported("var")),
        }
    }

    /// `∫_t^{t+dt} σ_i(s) ds`, the covariance of the state-variable
    /// increment with the Brownian increment of factor `i`.
    pub fn covar_dw(&self, i: usize, t: f64, dt: f64) -> Result<f64, VolatilityError> {
        self.check_factor(i)?;
        match self {
            VolatilityFunction::Constant(v) => Ok(v.integral(dt)[i]),
            VolatilityFunction::Exponential(v) => Ok(v.covar_dw(i, t, dt)),
            VolatilityFunction::Piecewise(v) => v.covar_dw(i, t, dt),
            VolatilityFunction::Difference(_) => Err(self.unsupported("covar_dw")),
        }
    }

    /// Constant level vector if the function is constant on `[t, maturity]`.
    ///
    /// `None` means only that the constant fast path is unavailable.
    pub fn volatility_level(&self, t: f64, maturity: f64) -> Option<Vec<f64>> {
        match self {
            VolatilityFunction::Constant(v) => Some(v.levels().to_vec()),
            VolatilityFunction::Exponential(v) => v.constant_level(),
            VolatilityFunction::Piecewise(v) => v.constant_level(t, maturity),
            VolatilityFunction::Difference(v) => v.constant_level(t, maturity),
        }
    }

    /// Subdivision of `[t, t+dt]` into pieces on which the level does not
    /// jump. Smooth shapes return the two end points.
    pub fn segments(&self, t: f64, dt: f64) -> Result<Vec<f64>, VolatilityError> {
        match self {
            VolatilityFunction::Constant(_) | VolatilityFunction::Exponential(_) => {
                Ok(vec![t, t + dt])
            }
            VolatilityFunction::Piecewise(v) => v.segments(t, dt),
            VolatilityFunction::Difference(v) => v.segments(t, dt),
        }
    }

    /// Same shape with every factor but `i` zeroed.
    pub fn component_vol(&self, i: usize) -> Result<Self, VolatilityError> {
        self.check_factor(i)?;
        Ok(match self {
            VolatilityFunction::Constant(v) => VolatilityFunction::Constant(v.component(i)),
            VolatilityFunction::Exponential(v) => VolatilityFunction::Exponential(v.component(i)),
            VolatilityFunction::Piecewise(v) => VolatilityFunction::Piecewise(v.component(i)),
            VolatilityFunction::Difference(v) => VolatilityFunction::Difference(v.component(i)?),
        })
    }
}

impl From<ConstantVol> for VolatilityFunction {
    fn from(v: ConstantVol) -> Self {
        VolatilityFunction::Constant(v)
    }
}

impl From<ExponentialVol> for VolatilityFunction {
    fn from(v: ExponentialVol) -> Self {
        VolatilityFunction::Exponential(v)
    }
}

impl From<PiecewiseConstantVol> for VolatilityFunction {
    fn from(v: PiecewiseConstantVol) -> Self {
        VolatilityFunction::Piecewise(v)
    }
}
