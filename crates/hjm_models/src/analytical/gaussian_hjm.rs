//! Single-currency Gaussian HJM model.
//!
//! Zero-coupon bond prices are exponential-affine in the state variables:
//!
//! ```text
//! P(t, T) = D(T)/D(t) · A(t,T) · exp(-B(t,T)·z(t))
//! ```
//!
//! Under the `T`-forward measure every bond price at `T` is lognormal, and
//! its log-loading on factor `i` is `B_i(T, t_j)`. This separability is what
//! makes coupon bond options tractable: the coupon bond is a monotone
//! function of the per-factor states, so the exercise boundary is a single
//! break-even state per factor.

use std::sync::Arc;

use hjm_core::market_data::{CurveInterpolation, DiscountCurve, InterpolatedCurve, YieldCurve};
use hjm_core::math::distributions::{norm_cdf, norm_pdf};
use hjm_core::math::quadrature::{graded_edges, GaussLegendre};
use hjm_core::math::solvers::{BrentSolver, SolverConfig};
use tracing::debug;

use super::black::{black, OptionType, SwaptionType};
use crate::economy::Asset;
use crate::error::ModelError;
use crate::volatility::{VolExpression, VolatilityFunction};

/// Gauss-Legendre points per panel for the outer integral of two-factor
/// coupon bond options.
const OUTER_RULE_ORDER: usize = 16;

/// Half-width of the outer integration range in standard deviations.
const OUTER_RANGE_SD: f64 = 10.0;

/// Halvings of the outer panels towards the break-even state.
const OUTER_GRADING_LEVELS: u32 = 30;

/// Bracket expansions allowed when searching for a break-even state.
const BRACKET_EXPANSIONS: usize = 40;

/// Closed-form Gaussian HJM model of one currency.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use hjm_core::market_data::DiscountCurve;
/// use hjm_models::analytical::{GaussianHjm, OptionType};
/// use hjm_models::volatility::VolatilityFunction;
///
/// let model = GaussianHjm::new(
///     Arc::new(VolatilityFunction::exponential(vec![0.01], vec![0.1]).unwrap()),
///     Arc::new(DiscountCurve::flat(0.03)),
/// );
///
/// let bond = model.bond(&[0.0], 0.0, 5.0).unwrap();
/// assert!((bond - (-0.15_f64).exp()).abs() < 1e-14);
///
/// let option = model.zcb_option(1.0, 5.0, 0.88, OptionType::Call).unwrap();
/// assert!(option > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct GaussianHjm {
    volatility: Arc<VolatilityFunction>,
    curve: Arc<DiscountCurve>,
}

/// `(weight, loading)` of one cash flow of a coupon bond conditional on
/// all factors but one: the cash flow is worth
/// `weight · exp(-½ loading² V - loading · y)` at expiry.
type ConditionalFlow = (f64, f64);

impl GaussianHjm {
    /// Create a model from its interest-rate volatility and initial curve.
    pub fn new(volatility: Arc<VolatilityFunction>, curve: Arc<DiscountCurve>) -> Self {
        Self { volatility, curve }
    }

    /// Interest-rate volatility.
    #[inline]
    pub fn volatility(&self) -> &Arc<VolatilityFunction> {
        &self.volatility
    }

    /// Initial discount curve.
    #[inline]
    pub fn curve(&self) -> &Arc<DiscountCurve> {
        &self.curve
    }

    /// Number of factors.
    #[inline]
    pub fn factors(&self) -> usize {
        self.volatility.factors()
    }

    /// Initial discount factor `D(t)`.
    #[inline]
    pub fn discount(&self, t: f64) -> Result<f64, ModelError> {
        Ok(self.curve.discount_factor(t)?)
    }

    /// Zero-coupon bond price at `t` for time to maturity `ttm`, given the
    /// state `z(t)`.
    ///
    /// # Errors
    /// `InvalidInput` for a state of the wrong dimension or a negative time
    /// to maturity.
    pub fn bond(&self, z: &[f64], t: f64, ttm: f64) -> Result<f64, ModelError> {
        if z.len() != self.factors() {
            return Err(ModelError::InvalidInput(format!(
                "state has {} entries for {} factors",
                z.len(),
                self.factors()
            )));
        }
        if ttm < 0.0 {
            return Err(ModelError::InvalidInput(format!(
                "negative time to maturity {}",
                ttm
            )));
        }
        let maturity = t + ttm;
        let ratio = self.discount(maturity)? / self.discount(t)?;
        let a = self.volatility.a(t, maturity)?;
        let exponent: f64 = self
            .volatility
            .b(t, maturity)?
            .iter()
            .zip(z)
            .map(|(b, z)| b * z)
            .sum();
        Ok(ratio * a * (-exponent).exp())
    }

    /// Discount curve seen at `t` in state `z`, with pillars at the given
    /// times to maturity.
    ///
    /// # Errors
    /// Bond price errors, or `MarketData` if the times to maturity are not
    /// positive and increasing.
    pub fn term_structure(
        &self,
        z: &[f64],
        t: f64,
        tenors: &[f64],
    ) -> Result<DiscountCurve, ModelError> {
        let mut rates = Vec::with_capacity(tenors.len());
        for &ttm in tenors {
            let price = self.bond(z, t, ttm)?;
            rates.push(if ttm > 0.0 { -price.ln() / ttm } else { 0.0 });
        }
        let curve = InterpolatedCurve::new(tenors, &rates, CurveInterpolation::LogLinear, true)?;
        Ok(curve.into())
    }

    /// European option on the zero-coupon bond maturing at `bond_maturity`.
    ///
    /// # Errors
    /// `InvalidInput` unless `0 <= expiry <= bond_maturity`.
    pub fn zcb_option(
        &self,
        expiry: f64,
        bond_maturity: f64,
        strike: f64,
        option: OptionType,
    ) -> Result<f64, ModelError> {
        if !(0.0 <= expiry && expiry <= bond_maturity) {
            return Err(ModelError::InvalidInput(format!(
                "bond option needs 0 <= expiry <= maturity, got {} / {}",
                expiry, bond_maturity
            )));
        }
        let discount = self.discount(expiry)?;
        let forward = self.discount(bond_maturity)? / discount;
        let vol = self.volatility.fwd_bond_vol(0.0, expiry, bond_maturity)?;
        Ok(black(forward, strike, vol * vol, discount, option))
    }

    /// European option on a coupon bond paying `coupons[j]` at
    /// `payment_times[j]`.
    ///
    /// With one active factor this is Jamshidian's decomposition; with two,
    /// the first factor is integrated numerically and the second is handled
    /// conditionally in closed form. The outer integral runs over Gauss-
    /// Legendre panels refined towards the first-factor state at which the
    /// expected coupon bond equals the strike. A factor is active if it
    /// carries variance up to `expiry`.
    ///
    /// # Errors
    /// * `InvalidInput` - empty or mismatched schedule, payment before
    ///   expiry, negative coupons, non-positive strike
    /// * `Unsupported` - more than two active factors
    /// * `Solver` - the break-even state could not be bracketed
    pub fn cb_option(
        &self,
        expiry: f64,
        payment_times: &[f64],
        coupons: &[f64],
        strike: f64,
        option: OptionType,
    ) -> Result<f64, ModelError> {
        validate_coupon_bond(expiry, payment_times, coupons, strike)?;

        let discount = self.discount(expiry)?;
        let mut forwards = Vec::with_capacity(coupons.len());
        let mut loadings = Vec::with_capacity(coupons.len());
        for (&t, &c) in payment_times.iter().zip(coupons) {
            forwards.push(c * self.discount(t)? / discount);
            loadings.push(self.volatility.b(expiry, t)?);
        }

        let mut active = Vec::new();
        for i in 0..self.factors() {
            let variance = self.volatility.var(i, 0.0, expiry)?;
            if variance > 0.0 {
                active.push((i, variance));
            }
        }

        let solver = BrentSolver::new(SolverConfig::default());
        let undiscounted = match active.as_slice() {
            [] => option.intrinsic(forwards.iter().sum(), strike),
            [(i, variance)] => {
                let flows: Vec<ConditionalFlow> = forwards
                    .iter()
                    .zip(&loadings)
                    .map(|(&f, b)| (f, b[*i]))
                    .collect();
                conditional_price(&solver, &flows, *variance, strike, option)?
            }
            [(i1, v1), (i2, v2)] => {
                let rule = GaussLegendre::new(OUTER_RULE_ORDER)
                    .map_err(|e| ModelError::InvalidInput(e.to_string()))?;
                let sd1 = v1.sqrt();
                let first_factor = |y1: f64| -> Vec<ConditionalFlow> {
                    forwards
                        .iter()
                        .zip(&loadings)
                        .map(|(&f, b)| {
                            let b1 = b[*i1];
                            (f * (-0.5 * b1 * b1 * v1 - b1 * y1).exp(), b[*i2])
                        })
                        .collect()
                };

                // The conditional price bends sharply where the conditional
                // forward of the coupon bond crosses the strike.
                let expected_bond = |y1: f64| -> f64 {
                    first_factor(y1).iter().map(|&(w, _)| w).sum::<f64>() - strike
                };
                let centre = solver
                    .find_root_expanding(expected_bond, -sd1, sd1, BRACKET_EXPANSIONS)
                    .unwrap_or(0.0);
                debug!(centre, sd1, "two-factor coupon bond outer split");

                let range = OUTER_RANGE_SD * sd1;
                let edges = graded_edges(-range, range, sd1, centre, OUTER_GRADING_LEVELS);
                rule.integrate_panels(&edges, |y1| {
                    let density = norm_pdf(y1 / sd1) / sd1;
                    Ok::<f64, ModelError>(
                        density
                            * conditional_price(&solver, &first_factor(y1), *v2, strike, option)?,
                    )
                })?
            }
            _ => {
                return Err(ModelError::Unsupported(format!(
                    "coupon bond option with {} active factors",
                    active.len()
                )))
            }
        };
        Ok(discount * undiscounted)
    }

    /// European swaption exercising at `expiry` into a swap with fixed
    /// payments at `payment_times` (accruals measured from `expiry`).
    ///
    /// A payer swaption is a put on the coupon bond paying `K·δ_j` plus
    /// the principal, struck at par; a receiver swaption is the call.
    pub fn swaption(
        &self,
        expiry: f64,
        payment_times: &[f64],
        fixed_rate: f64,
        swaption: SwaptionType,
    ) -> Result<f64, ModelError> {
        let coupons = fixed_leg(expiry, payment_times, fixed_rate)?;
        let option = match swaption {
            SwaptionType::Payer => OptionType::Put,
            SwaptionType::Receiver => OptionType::Call,
        };
        self.cb_option(expiry, payment_times, &coupons, 1.0, option)
    }

    /// Caplet on the simple rate fixing at `reset` and paid at `payment`,
    /// unit notional.
    pub fn caplet(&self, reset: f64, payment: f64, strike: f64) -> Result<f64, ModelError> {
        self.capfloorlet(reset, payment, strike, OptionType::Put)
    }

    /// Floorlet on the simple rate fixing at `reset` and paid at `payment`.
    pub fn floorlet(&self, reset: f64, payment: f64, strike: f64) -> Result<f64, ModelError> {
        self.capfloorlet(reset, payment, strike, OptionType::Call)
    }

    fn capfloorlet(
        &self,
        reset: f64,
        payment: f64,
        strike: f64,
        bond_option: OptionType,
    ) -> Result<f64, ModelError> {
        let accrual = payment - reset;
        if accrual <= 0.0 {
            return Err(ModelError::InvalidInput(format!(
                "caplet payment {} not after reset {}",
                payment, reset
            )));
        }
        let scale = 1.0 + accrual * strike;
        Ok(scale * self.zcb_option(reset, payment, 1.0 / scale, bond_option)?)
    }

    /// European option on the spot exchange rate of `foreign` (units of
    /// this currency per unit of foreign currency).
    ///
    /// The forward exchange rate to `expiry` has volatility
    /// `σ_X - b_f(·, T) + b_d(·, T)`.
    pub fn fx_option(
        &self,
        foreign: &GaussianHjm,
        fx_volatility: &Arc<VolatilityFunction>,
        spot: f64,
        expiry: f64,
        strike: f64,
        option: OptionType,
    ) -> Result<f64, ModelError> {
        check_expiry(expiry)?;
        let expression = VolExpression::new()
            .instantaneous(1.0, Arc::clone(fx_volatility))
            .bond(-1.0, Arc::clone(&foreign.volatility), expiry)
            .bond(1.0, Arc::clone(&self.volatility), expiry);
        let variance = expression.variance(0.0, expiry)?;

        let discount = self.discount(expiry)?;
        let forward = spot * foreign.discount(expiry)? / discount;
        Ok(black(forward, strike, variance, discount, option))
    }

    /// European option on an asset of this currency.
    ///
    /// The forward asset price to `expiry` has volatility `σ_S + b(·, T)`.
    pub fn equity_option(
        &self,
        asset: &Asset,
        expiry: f64,
        strike: f64,
        option: OptionType,
    ) -> Result<f64, ModelError> {
        check_expiry(expiry)?;
        let variance = self.forward_expression(asset, expiry).variance(0.0, expiry)?;
        let discount = self.discount(expiry)?;
        Ok(black(
            asset.forward(expiry, discount),
            strike,
            variance,
            discount,
            option,
        ))
    }

    /// Option to exchange `rhs` for `lhs` at `expiry` (Margrabe).
    ///
    /// Only the quotient `S_lhs / S_rhs` matters, whose volatility is the
    /// difference of the two asset volatilities; the interest-rate
    /// volatility cancels.
    pub fn exchange_option(
        &self,
        lhs: &Asset,
        rhs: &Asset,
        expiry: f64,
    ) -> Result<f64, ModelError> {
        check_expiry(expiry)?;
        let ratio = VolatilityFunction::difference(
            VolatilityFunction::clone(lhs.volatility()),
            VolatilityFunction::clone(rhs.volatility()),
        )?;
        let variance = ratio.volproduct(0.0, expiry, &ratio)?.max(0.0);
        let discount = self.discount(expiry)?;
        Ok(black(
            lhs.forward(expiry, discount),
            rhs.forward(expiry, discount),
            variance,
            discount,
            OptionType::Call,
        ))
    }

    /// Quanto caplet: the foreign simple rate fixing at `reset` for
    /// `[reset, payment]`, paid in this currency at `payment`.
    pub fn quanto_caplet(
        &self,
        foreign: &GaussianHjm,
        fx_volatility: &Arc<VolatilityFunction>,
        reset: f64,
        payment: f64,
        strike: f64,
    ) -> Result<f64, ModelError> {
        let accrual = payment - reset;
        if accrual <= 0.0 {
            return Err(ModelError::InvalidInput(format!(
                "quanto caplet payment {} not after reset {}",
                payment, reset
            )));
        }
        check_expiry(reset)?;
        let forward = self.quanto_forward(foreign, fx_volatility, reset, payment)?;
        let vol = foreign.volatility.fwd_bond_vol(0.0, reset, payment)?;
        Ok(black(
            forward,
            1.0 + accrual * strike,
            vol * vol,
            self.discount(payment)?,
            OptionType::Call,
        ))
    }

    /// Differential swap: receive the foreign simple rate of each period of
    /// `schedule` and pay `fixed_rate`, both on a unit notional of this
    /// currency, paid in arrears.
    ///
    /// `schedule` holds `t_0 < t_1 < ... < t_n`; period `j` fixes at
    /// `t_{j-1}` and pays at `t_j`.
    pub fn diff_swap(
        &self,
        foreign: &GaussianHjm,
        fx_volatility: &Arc<VolatilityFunction>,
        schedule: &[f64],
        fixed_rate: f64,
    ) -> Result<f64, ModelError> {
        if schedule.len() < 2 {
            return Err(ModelError::InvalidInput(
                "differential swap needs at least one period".to_string(),
            ));
        }
        check_expiry(schedule[0])?;

        let mut value = 0.0;
        for period in schedule.windows(2) {
            let (reset, payment) = (period[0], period[1]);
            if payment <= reset {
                return Err(ModelError::InvalidInput(format!(
                    "schedule not increasing at {}",
                    payment
                )));
            }
            let forward = self.quanto_forward(foreign, fx_volatility, reset, payment)?;
            value += self.discount(payment)?
                * (forward - 1.0 - (payment - reset) * fixed_rate);
        }
        Ok(value)
    }

    /// `E[P_f(reset, reset) / P_f(reset, payment)]` under this currency's
    /// `payment`-forward measure.
    ///
    /// The foreign ratio is a martingale under the foreign forward measure
    /// with volatility `ν = b_f(·, payment) - b_f(·, reset)`; moving to the
    /// domestic forward measure adds the drift `-ν·σ_Z`, where `σ_Z` is the
    /// volatility of the forward exchange rate to `payment`.
    fn quanto_forward(
        &self,
        foreign: &GaussianHjm,
        fx_volatility: &Arc<VolatilityFunction>,
        reset: f64,
        payment: f64,
    ) -> Result<f64, ModelError> {
        let ratio = foreign.discount(reset)? / foreign.discount(payment)?;
        let nu = VolExpression::new()
            .bond(1.0, Arc::clone(&foreign.volatility), payment)
            .bond(-1.0, Arc::clone(&foreign.volatility), reset);
        let forward_fx = VolExpression::new()
            .instantaneous(1.0, Arc::clone(fx_volatility))
            .bond(-1.0, Arc::clone(&foreign.volatility), payment)
            .bond(1.0, Arc::clone(&self.volatility), payment);
        let adjustment = nu.inner_product(&forward_fx, 0.0, reset)?;
        Ok(ratio * (-adjustment).exp())
    }

    /// Volatility `σ_S + b(·, T)` of the forward price of `asset`.
    pub fn forward_expression(&self, asset: &Asset, maturity: f64) -> VolExpression {
        VolExpression::new()
            .instantaneous(1.0, Arc::clone(asset.volatility()))
            .bond(1.0, Arc::clone(&self.volatility), maturity)
    }
}

fn check_expiry(expiry: f64) -> Result<(), ModelError> {
    if !(expiry >= 0.0 && expiry.is_finite()) {
        return Err(ModelError::InvalidInput(format!(
            "invalid expiry {}",
            expiry
        )));
    }
    Ok(())
}

fn validate_coupon_bond(
    expiry: f64,
    payment_times: &[f64],
    coupons: &[f64],
    strike: f64,
) -> Result<(), ModelError> {
    check_expiry(expiry)?;
    if payment_times.is_empty() || payment_times.len() != coupons.len() {
        return Err(ModelError::InvalidInput(format!(
            "{} payment times for {} coupons",
            payment_times.len(),
            coupons.len()
        )));
    }
    let mut previous = expiry;
    for &t in payment_times {
        if t < previous {
            return Err(ModelError::InvalidInput(format!(
                "payment time {} before expiry or not increasing",
                t
            )));
        }
        previous = t;
    }
    if coupons.iter().any(|c| !(*c >= 0.0)) || coupons.iter().sum::<f64>() <= 0.0 {
        return Err(ModelError::InvalidInput(
            "coupons must be non-negative and not all zero".to_string(),
        ));
    }
    if !(strike > 0.0) {
        return Err(ModelError::InvalidInput(format!(
            "non-positive strike {}",
            strike
        )));
    }
    Ok(())
}

/// Coupons `K·δ_j` with the principal added to the last payment.
fn fixed_leg(expiry: f64, payment_times: &[f64], fixed_rate: f64) -> Result<Vec<f64>, ModelError> {
    if payment_times.is_empty() {
        return Err(ModelError::InvalidInput(
            "swaption needs at least one payment".to_string(),
        ));
    }
    let mut previous = expiry;
    let mut coupons: Vec<f64> = payment_times
        .iter()
        .map(|&t| {
            let accrual = t - previous;
            previous = t;
            fixed_rate * accrual
        })
        .collect();
    if let Some(last) = coupons.last_mut() {
        *last += 1.0;
    }
    Ok(coupons)
}

/// Undiscounted option on `Σ w_j exp(-½ B_j² V - B_j y)`, `y ~ N(0, V)`.
///
/// The sum decreases in `y` for non-negative loadings, so the option is
/// exercised on one side of the break-even state `y*`.
fn conditional_price(
    solver: &BrentSolver,
    flows: &[ConditionalFlow],
    variance: f64,
    strike: f64,
    option: OptionType,
) -> Result<f64, ModelError> {
    let sd = variance.sqrt();
    let bond = |y: f64| -> f64 {
        flows
            .iter()
            .map(|&(w, b)| w * (-0.5 * b * b * variance - b * y).exp())
            .sum::<f64>()
            - strike
    };
    let y_star = solver.find_root_expanding(bond, -sd, sd, BRACKET_EXPANSIONS)?;
    debug!(y_star, variance, "coupon bond break-even state");

    let exercised: f64 = flows
        .iter()
        .map(|&(w, b)| w * norm_cdf((y_star + b * variance) / sd))
        .sum();
    let call = exercised - strike * norm_cdf(y_star / sd);
    Ok(match option {
        OptionType::Call => call,
        // put = call - (E[bond] - K)
        OptionType::Put => {
            let unexercised: f64 = flows
                .iter()
                .map(|&(w, b)| w * norm_cdf(-(y_star + b * variance) / sd))
                .sum();
            strike * norm_cdf(-y_star / sd) - unexercised
        }
    })
}
