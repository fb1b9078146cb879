//! Multi-currency Gauss-Markov world.
//!
//! A world joins one domestic and any number of foreign [`Economy`]s with
//! one [`ExchangeRate`] per foreign economy, all driven by the same
//! Brownian factors. It simulates the joint state
//!
//! ```text
//! row                      state variable                 diffusion ψ
//! economy k, factor i      z_i^k = ∫ σ_i^k dW             σ_i^k
//! economy k, asset j       ln F_j(t,T)/F_j(0,T)           σ_S + b_k(·,T)
//! foreign economy k        ln G_k(t,T)/G_k(0,T)           σ_X - b_k(·,T) + b_0(·,T)
//! ```
//!
//! where `T` is the horizon of the timeline, `F` a terminal forward price
//! and `G` the terminal forward exchange rate. Rows are laid out economy by
//! economy (rate factors, then assets), followed by the exchange rates.
//!
//! ## Drifts
//!
//! Every state variable is driftless (rates) or a log-martingale (assets,
//! exchange rates) under its native measure: the foreign or domestic spot
//! measure for rate factors, the terminal forward measure of its own
//! currency for assets, the domestic terminal forward measure for exchange
//! rates. With `ν` the domestic-currency log-volatility of a numeraire, the
//! drift under numeraire `N` is
//!
//! ```text
//! μ = [log] -½⟨ψ,ψ⟩ + ⟨ψ, ν_N - ν_native⟩
//! ```
//!
//! integrated over each timeline step.
//!
//! ## Reentrancy
//!
//! A world owns its covariances, drifts, samplers and state matrix, and
//! every propagation overwrites them. It is not reentrant; clone it to
//! simulate on several threads.

mod error;
mod numeraire;
mod path;
mod reportable;

pub use error::WorldError;
pub use numeraire::{Numeraire, NumeraireRegistration};
pub use path::PathValues;
pub use reportable::{Reportable, ReportableKind};

use std::sync::Arc;

use hjm_models::economy::{Economy, ExchangeRate};
use hjm_models::volatility::{VolExpression, VolatilityError};
use nalgebra::DMatrix;
use tracing::{debug, warn};

use crate::mvn::MultivariateNormal;

/// One row of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StateVariable {
    Rate { economy: usize, factor: usize },
    Asset { economy: usize, asset: usize },
    Fx { economy: usize },
}

impl StateVariable {
    #[inline]
    fn is_log(&self) -> bool {
        !matches!(self, StateVariable::Rate { .. })
    }
}

/// Simulation engine for a multi-currency Gaussian HJM world.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use hjm_core::market_data::DiscountCurve;
/// use hjm_models::economy::{Economy, ExchangeRate};
/// use hjm_models::volatility::VolatilityFunction;
/// use hjm_pricing::world::{GaussMarkovWorld, Numeraire, ReportableKind};
///
/// let vol = |v: f64| Arc::new(VolatilityFunction::constant(vec![v, 0.0]).unwrap());
/// let domestic = Economy::new(vec![], vol(0.01), Arc::new(DiscountCurve::flat(0.03))).unwrap();
/// let foreign = Economy::new(vec![], vol(0.008), Arc::new(DiscountCurve::flat(0.01))).unwrap();
/// let fx = ExchangeRate::new(1.1, Arc::new(VolatilityFunction::constant(vec![0.0, 0.1]).unwrap()))
///     .unwrap();
///
/// let mut world = GaussMarkovWorld::new(vec![domestic, foreign], vec![fx]).unwrap();
/// assert_eq!(world.state_dimension(), 5);
/// assert_eq!(world.currency_start_index(), 4);
///
/// let fx_index = world.set_reporting(1, ReportableKind::TerminalForwardFx).unwrap();
/// world.set_timeline(&[0.0, 0.5, 1.0]).unwrap();
/// world.set_numeraire(Numeraire::ForeignRollingSpot(1)).unwrap();
///
/// // Two Brownian factors drive five state variables
/// assert_eq!(world.max_rank(), 2);
/// assert_eq!(fx_index, 0);
/// ```
#[derive(Debug, Clone)]
pub struct GaussMarkovWorld {
    economies: Vec<Economy>,
    exchange_rates: Vec<ExchangeRate>,
    layout: Vec<StateVariable>,
    economy_start: Vec<usize>,
    currency_start: usize,
    reportables: Vec<Reportable>,
    requested: Numeraire,
    registration: NumeraireRegistration,
    timeline: Vec<f64>,
    diffusions: Vec<VolExpression>,
    natives: Vec<VolExpression>,
    anchors: Vec<f64>,
    covariances: Vec<DMatrix<f64>>,
    samplers: Vec<MultivariateNormal>,
    max_rank: usize,
    drift: DMatrix<f64>,
    state: DMatrix<f64>,
    variates: Vec<f64>,
    increment: Vec<f64>,
}

impl GaussMarkovWorld {
    /// Builds a world from its economies (domestic first) and the exchange
    /// rates of the foreign economies, in economy order.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` without economies, or unless there is exactly
    ///   one exchange rate per foreign economy
    /// - `Volatility(FactorMismatch)` if economies or exchange rates
    ///   disagree on the factor count
    pub fn new(
        economies: Vec<Economy>,
        exchange_rates: Vec<ExchangeRate>,
    ) -> Result<Self, WorldError> {
        let Some(domestic) = economies.first() else {
            return Err(WorldError::DimensionMismatch {
                what: "economies",
                expected: 1,
                actual: 0,
            });
        };
        if exchange_rates.len() + 1 != economies.len() {
            return Err(WorldError::DimensionMismatch {
                what: "exchange rates",
                expected: economies.len() - 1,
                actual: exchange_rates.len(),
            });
        }

        let factors = domestic.factors();
        let foreign_factors = economies
            .iter()
            .map(Economy::factors)
            .chain(exchange_rates.iter().map(|x| x.volatility().factors()));
        for other in foreign_factors {
            if other != factors {
                return Err(VolatilityError::FactorMismatch {
                    lhs: factors,
                    rhs: other,
                }
                .into());
            }
        }

        let mut layout = Vec::new();
        let mut economy_start = Vec::with_capacity(economies.len());
        for (k, economy) in economies.iter().enumerate() {
            economy_start.push(layout.len());
            layout.extend((0..factors).map(|factor| StateVariable::Rate { economy: k, factor }));
            layout.extend(
                (0..economy.assets().len()).map(|asset| StateVariable::Asset { economy: k, asset }),
            );
        }
        let currency_start = layout.len();
        layout.extend((1..economies.len()).map(|economy| StateVariable::Fx { economy }));

        Ok(Self {
            economies,
            exchange_rates,
            layout,
            economy_start,
            currency_start,
            reportables: Vec::new(),
            requested: Numeraire::default(),
            registration: NumeraireRegistration::default(),
            timeline: Vec::new(),
            diffusions: Vec::new(),
            natives: Vec::new(),
            anchors: Vec::new(),
            covariances: Vec::new(),
            samplers: Vec::new(),
            max_rank: 0,
            drift: DMatrix::zeros(0, 0),
            state: DMatrix::zeros(0, 0),
            variates: Vec::new(),
            increment: Vec::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Economies, domestic first.
    #[inline]
    pub fn economies(&self) -> &[Economy] {
        &self.economies
    }

    /// Exchange rate of foreign economy `k` (1-based).
    #[inline]
    pub fn exchange_rate(&self, k: usize) -> Option<&ExchangeRate> {
        k.checked_sub(1).and_then(|i| self.exchange_rates.get(i))
    }

    /// Brownian factors shared by every economy.
    #[inline]
    pub fn factors(&self) -> usize {
        self.economies[0].factors()
    }

    /// Number of state variables.
    #[inline]
    pub fn state_dimension(&self) -> usize {
        self.layout.len()
    }

    /// First state row of economy `k`.
    #[inline]
    pub fn economy_start_index(&self, k: usize) -> Option<usize> {
        self.economy_start.get(k).copied()
    }

    /// First exchange-rate row.
    #[inline]
    pub fn currency_start_index(&self) -> usize {
        self.currency_start
    }

    /// Registered reportables, in index order.
    #[inline]
    pub fn reportables(&self) -> &[Reportable] {
        &self.reportables
    }

    /// Numeraire in force and the reportables it registered.
    #[inline]
    pub fn numeraire_registration(&self) -> NumeraireRegistration {
        self.registration
    }

    /// Numeraire in force, after any fall-back.
    #[inline]
    pub fn numeraire(&self) -> Numeraire {
        self.registration.numeraire
    }

    /// Current timeline; empty until [`set_timeline`](Self::set_timeline).
    #[inline]
    pub fn timeline(&self) -> &[f64] {
        &self.timeline
    }

    /// Last timeline point.
    #[inline]
    pub fn horizon(&self) -> Option<f64> {
        self.timeline.last().copied()
    }

    /// Largest sampler rank: driving variates needed per step.
    #[inline]
    pub fn max_rank(&self) -> usize {
        self.max_rank
    }

    /// Covariance of the state increments over timeline step `step`.
    #[inline]
    pub fn covariance(&self, step: usize) -> Option<&DMatrix<f64>> {
        self.covariances.get(step)
    }

    /// Sampler of timeline step `step`.
    #[inline]
    pub fn sampler(&self, step: usize) -> Option<&MultivariateNormal> {
        self.samplers.get(step)
    }

    /// `state × steps` drift matrix.
    #[inline]
    pub fn drift(&self) -> &DMatrix<f64> {
        &self.drift
    }

    /// `state × timeline points` state of the last propagated path.
    #[inline]
    pub fn state(&self) -> &DMatrix<f64> {
        &self.state
    }

    /// Value of the numeraire at time zero, in domestic currency.
    pub fn initial_numeraire(&self) -> f64 {
        match self.registration.numeraire {
            Numeraire::DomesticRollingSpot => 1.0,
            Numeraire::ForeignRollingSpot(k) => self.exchange_rates[k - 1].spot(),
            Numeraire::DomesticAsset(m) => self.economies[0].assets()[m].spot(),
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Registers a reportable and returns its index.
    ///
    /// Registering the same reportable again returns the existing index.
    ///
    /// # Errors
    ///
    /// `InvalidReportable` for an unknown currency or asset, an exchange
    /// rate of the domestic economy, or an invalid bond maturity.
    pub fn set_reporting(
        &mut self,
        currency: usize,
        kind: ReportableKind,
    ) -> Result<usize, WorldError> {
        let Some(economy) = self.economies.get(currency) else {
            return Err(WorldError::InvalidReportable(format!(
                "currency {} outside {} economies",
                currency,
                self.economies.len()
            )));
        };
        kind.validate_maturity()?;
        match kind {
            ReportableKind::Asset(j) if j >= economy.assets().len() => {
                return Err(WorldError::InvalidReportable(format!(
                    "asset {} outside {} assets of currency {}",
                    j,
                    economy.assets().len(),
                    currency
                )));
            }
            ReportableKind::TerminalForwardFx if currency == 0 => {
                return Err(WorldError::InvalidReportable(
                    "the domestic currency has no exchange rate".to_string(),
                ));
            }
            _ => {}
        }

        let reportable = Reportable::new(currency, kind);
        if let Some(index) = self.reportables.iter().position(|r| *r == reportable) {
            return Ok(index);
        }
        self.reportables.push(reportable);
        Ok(self.reportables.len() - 1)
    }

    /// Sets the timeline and rebuilds covariances, samplers and drifts.
    ///
    /// Every covariance depends on the horizon, so this must be re-run
    /// whenever the timeline changes.
    ///
    /// # Errors
    ///
    /// `InvalidTimeline` unless the timeline starts at 0, is strictly
    /// increasing and has at least two points; volatility, curve and
    /// sampler errors while assembling the step covariances. On error the
    /// previous timeline stays in force.
    pub fn set_timeline(&mut self, timeline: &[f64]) -> Result<(), WorldError> {
        validate_timeline(timeline)?;
        let horizon = timeline[timeline.len() - 1];
        let n = self.layout.len();

        let diffusions: Vec<VolExpression> = self
            .layout
            .iter()
            .map(|v| self.diffusion(*v, horizon))
            .collect();
        let natives: Vec<VolExpression> = self
            .layout
            .iter()
            .map(|v| self.native_expression(*v, horizon))
            .collect();
        let anchors = self
            .layout
            .iter()
            .map(|v| self.anchor(*v, horizon))
            .collect::<Result<Vec<_>, _>>()?;

        let mut covariances = Vec::with_capacity(timeline.len() - 1);
        let mut samplers = Vec::with_capacity(timeline.len() - 1);
        for window in timeline.windows(2) {
            let (t, dt) = (window[0], window[1] - window[0]);
            let mut covariance = DMatrix::zeros(n, n);
            for i in 0..n {
                for j in 0..=i {
                    let c = diffusions[i].inner_product(&diffusions[j], t, dt)?;
                    covariance[(i, j)] = c;
                    covariance[(j, i)] = c;
                }
            }
            samplers.push(MultivariateNormal::new(&covariance)?);
            covariances.push(covariance);
        }
        let max_rank = samplers.iter().map(MultivariateNormal::rank).max().unwrap_or(0);

        let drift = self.drift_matrix(
            self.registration.numeraire,
            timeline,
            &diffusions,
            &natives,
            &covariances,
        )?;

        self.timeline = timeline.to_vec();
        self.diffusions = diffusions;
        self.natives = natives;
        self.anchors = anchors;
        self.covariances = covariances;
        self.samplers = samplers;
        self.max_rank = max_rank;
        self.drift = drift;
        self.state = DMatrix::zeros(n, timeline.len());
        self.variates = vec![0.0; max_rank];
        self.increment = vec![0.0; n];

        if let Numeraire::DomesticAsset(m) = self.registration.numeraire {
            self.registration = self.register_asset_numeraire(m)?;
        }

        debug!(
            points = timeline.len(),
            horizon,
            state = n,
            max_rank,
            "timeline rebuilt"
        );
        Ok(())
    }

    /// Selects the numeraire and rebuilds the drifts.
    ///
    /// A domestic asset numeraire registers the asset and, once the
    /// timeline is set, the domestic bond maturing at the horizon; their
    /// indices are returned. An asset index outside the domestic assets
    /// falls back to the domestic rolling spot with a warning. Before the
    /// timeline is set, the drifts are built by
    /// [`set_timeline`](Self::set_timeline).
    ///
    /// # Errors
    ///
    /// `InvalidNumeraire` for a foreign index that is not a foreign
    /// economy; volatility errors while assembling drifts. On error the
    /// previous numeraire stays in force.
    pub fn set_numeraire(
        &mut self,
        numeraire: Numeraire,
    ) -> Result<NumeraireRegistration, WorldError> {
        let resolved = self.resolve_numeraire(numeraire)?;

        if !self.timeline.is_empty() {
            self.drift = self.drift_matrix(
                resolved,
                &self.timeline,
                &self.diffusions,
                &self.natives,
                &self.covariances,
            )?;
        }
        self.requested = numeraire;
        self.registration = match resolved {
            Numeraire::DomesticAsset(m) => self.register_asset_numeraire(m)?,
            other => NumeraireRegistration {
                numeraire: other,
                asset: None,
                bond: None,
            },
        };

        debug!(numeraire = ?resolved, "drifts rebuilt");
        Ok(self.registration)
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Propagates the state along the timeline.
    ///
    /// `x` holds independent standard normals, one row per timeline step
    /// and at least [`max_rank`](Self::max_rank) columns. Each step adds
    /// the drift and the correlated increment to the previous state.
    ///
    /// # Errors
    ///
    /// `TimelineNotSet`, or `InsufficientRandoms` if `x` has too few rows
    /// or columns.
    pub fn propagate_state_variables(&mut self, x: &DMatrix<f64>) -> Result<(), WorldError> {
        if self.timeline.is_empty() {
            return Err(WorldError::TimelineNotSet);
        }
        let steps = self.samplers.len();
        if x.nrows() < steps || x.ncols() < self.max_rank {
            return Err(WorldError::InsufficientRandoms {
                steps,
                rank: self.max_rank,
                rows: x.nrows(),
                cols: x.ncols(),
            });
        }

        for step in 0..steps {
            for (r, variate) in self.variates.iter_mut().enumerate() {
                *variate = x[(step, r)];
            }
            self.samplers[step].transform(&self.variates, &mut self.increment)?;
            for (row, increment) in self.increment.iter().enumerate() {
                self.state[(row, step + 1)] =
                    self.state[(row, step)] + self.drift[(row, step)] + increment;
            }
        }
        Ok(())
    }

    /// Propagates one path and reports every reportable and the numeraire
    /// at every timeline point into `out`, resizing it if needed.
    ///
    /// # Errors
    ///
    /// Propagation errors, or model errors while pricing a bond.
    pub fn simulate_path(&mut self, x: &DMatrix<f64>, out: &mut PathValues) -> Result<(), WorldError> {
        self.propagate_state_variables(x)?;
        out.ensure_shape(self.reportables.len(), self.timeline.len());
        let (values, numeraire) = out.buffers_mut();
        self.report(values, numeraire)
    }

    /// Path generation entry point for payoff evaluators.
    ///
    /// Re-runs [`set_timeline`](Self::set_timeline) and
    /// [`set_numeraire`](Self::set_numeraire) only when their arguments
    /// changed, then propagates `x` and writes the reportables
    /// (`reportables × points`) and the numeraire (`points`).
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` for buffers of the wrong shape, and the errors
    /// of the steps above.
    pub fn generate(
        &mut self,
        values: &mut DMatrix<f64>,
        numeraire_values: &mut [f64],
        x: &DMatrix<f64>,
        timeline: &[f64],
        numeraire: Numeraire,
    ) -> Result<(), WorldError> {
        if self.timeline.as_slice() != timeline {
            self.set_timeline(timeline)?;
        }
        if self.requested != numeraire {
            self.set_numeraire(numeraire)?;
        }
        self.propagate_state_variables(x)?;
        self.report(values, numeraire_values)
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    fn report(&self, values: &mut DMatrix<f64>, numeraire: &mut [f64]) -> Result<(), WorldError> {
        let points = self.timeline.len();
        if values.shape() != (self.reportables.len(), points) {
            return Err(WorldError::DimensionMismatch {
                what: "reported values",
                expected: self.reportables.len() * points,
                actual: values.len(),
            });
        }
        if numeraire.len() != points {
            return Err(WorldError::DimensionMismatch {
                what: "numeraire values",
                expected: points,
                actual: numeraire.len(),
            });
        }

        let horizon = self.timeline[points - 1];
        let rolling_economy = match self.registration.numeraire {
            Numeraire::ForeignRollingSpot(k) => k,
            _ => 0,
        };
        let mut rolling = 1.0;
        for (point, &t) in self.timeline.iter().enumerate() {
            for (index, reportable) in self.reportables.iter().enumerate() {
                values[(index, point)] = self.reportable_value(reportable, point, t)?;
            }
            numeraire[point] = self.numeraire_value(point, t, horizon, rolling)?;
            if let Some(&next) = self.timeline.get(point + 1) {
                rolling /= self.bond(rolling_economy, point, t, next - t)?;
            }
        }
        Ok(())
    }

    fn reportable_value(
        &self,
        reportable: &Reportable,
        point: usize,
        t: f64,
    ) -> Result<f64, WorldError> {
        let currency = reportable.currency;
        match reportable.kind {
            ReportableKind::Asset(j) => Ok(self.lognormal_value(self.asset_row(currency, j), point)),
            ReportableKind::FixedMaturityBond(maturity) => {
                if t >= maturity {
                    Ok(1.0)
                } else {
                    self.bond(currency, point, t, maturity - t)
                }
            }
            ReportableKind::TerminalForwardFx => Ok(self.lognormal_value(self.fx_row(currency), point)),
            ReportableKind::RollingBond(ttm) => self.bond(currency, point, t, ttm),
        }
    }

    fn numeraire_value(
        &self,
        point: usize,
        t: f64,
        horizon: f64,
        rolling: f64,
    ) -> Result<f64, WorldError> {
        match self.registration.numeraire {
            Numeraire::DomesticRollingSpot => Ok(rolling),
            Numeraire::ForeignRollingSpot(k) => {
                // X_k(t) = G_k(t,T) · P_0(t,T) / P_k(t,T)
                let forward_fx = self.lognormal_value(self.fx_row(k), point);
                let spot_fx = forward_fx * self.bond(0, point, t, horizon - t)?
                    / self.bond(k, point, t, horizon - t)?;
                Ok(spot_fx * rolling)
            }
            Numeraire::DomesticAsset(m) => {
                // S(t)·e^{qt} = F(t,T) · P(t,T) · e^{qT}
                let asset = &self.economies[0].assets()[m];
                let forward = self.lognormal_value(self.asset_row(0, m), point);
                let carry = (asset.dividend_yield() * horizon).exp();
                Ok(forward * self.bond(0, point, t, horizon - t)? * carry)
            }
        }
    }

    /// Zero-coupon bond of economy `k` at timeline point `point`.
    fn bond(&self, k: usize, point: usize, t: f64, ttm: f64) -> Result<f64, WorldError> {
        let n = self.layout.len();
        let start = point * n + self.economy_start[k];
        let z = &self.state.as_slice()[start..start + self.factors()];
        Ok(self.economies[k].model().bond(z, t, ttm)?)
    }

    #[inline]
    fn lognormal_value(&self, row: usize, point: usize) -> f64 {
        self.anchors[row] * self.state[(row, point)].exp()
    }

    #[inline]
    fn asset_row(&self, k: usize, j: usize) -> usize {
        self.economy_start[k] + self.factors() + j
    }

    #[inline]
    fn fx_row(&self, k: usize) -> usize {
        self.currency_start + k - 1
    }

    // ========================================================================
    // Measure Algebra
    // ========================================================================

    /// Domestic-currency log-volatility of economy `k`'s bank account.
    fn spot_expression(&self, k: usize) -> VolExpression {
        match self.exchange_rate(k) {
            Some(fx) => VolExpression::new().instantaneous(1.0, Arc::clone(fx.volatility())),
            None => VolExpression::new(),
        }
    }

    /// Domestic-currency log-volatility of economy `k`'s zero-coupon bond
    /// maturing at `maturity`.
    fn bond_expression(&self, k: usize, maturity: f64) -> VolExpression {
        self.spot_expression(k).bond(
            -1.0,
            Arc::clone(self.economies[k].rate_volatility()),
            maturity,
        )
    }

    fn diffusion(&self, variable: StateVariable, horizon: f64) -> VolExpression {
        match variable {
            StateVariable::Rate { economy, factor } => VolExpression::new().instantaneous(
                1.0,
                Arc::clone(&self.economies[economy].component_volatilities()[factor]),
            ),
            StateVariable::Asset { economy, asset } => {
                let economy = &self.economies[economy];
                economy
                    .model()
                    .forward_expression(&economy.assets()[asset], horizon)
            }
            StateVariable::Fx { economy } => VolExpression::new()
                .instantaneous(1.0, Arc::clone(self.exchange_rates[economy - 1].volatility()))
                .bond(
                    -1.0,
                    Arc::clone(self.economies[economy].rate_volatility()),
                    horizon,
                )
                .bond(1.0, Arc::clone(self.economies[0].rate_volatility()), horizon),
        }
    }

    /// Log-volatility of the numeraire under which `variable` is a
    /// martingale.
    fn native_expression(&self, variable: StateVariable, horizon: f64) -> VolExpression {
        match variable {
            StateVariable::Rate { economy, .. } => self.spot_expression(economy),
            StateVariable::Asset { economy, .. } => self.bond_expression(economy, horizon),
            StateVariable::Fx { .. } => self.bond_expression(0, horizon),
        }
    }

    /// Log-volatility of `numeraire` over the step ending at `next`.
    fn numeraire_expression(&self, numeraire: Numeraire, next: f64) -> VolExpression {
        match numeraire {
            Numeraire::DomesticRollingSpot => self.bond_expression(0, next),
            Numeraire::ForeignRollingSpot(k) => self.bond_expression(k, next),
            Numeraire::DomesticAsset(m) => VolExpression::new()
                .instantaneous(1.0, Arc::clone(self.economies[0].assets()[m].volatility())),
        }
    }

    /// Time-zero value `F(0,T)` or `G(0,T)` of a log state variable.
    fn anchor(&self, variable: StateVariable, horizon: f64) -> Result<f64, WorldError> {
        Ok(match variable {
            StateVariable::Rate { .. } => 0.0,
            StateVariable::Asset { economy, asset } => {
                let economy = &self.economies[economy];
                economy.assets()[asset].forward(horizon, economy.discount(horizon)?)
            }
            StateVariable::Fx { economy } => {
                self.exchange_rates[economy - 1].spot()
                    * self.economies[economy].discount(horizon)?
                    / self.economies[0].discount(horizon)?
            }
        })
    }

    fn drift_matrix(
        &self,
        numeraire: Numeraire,
        timeline: &[f64],
        diffusions: &[VolExpression],
        natives: &[VolExpression],
        covariances: &[DMatrix<f64>],
    ) -> Result<DMatrix<f64>, WorldError> {
        let n = self.layout.len();
        let mut drift = DMatrix::zeros(n, timeline.len() - 1);
        for (step, window) in timeline.windows(2).enumerate() {
            let (t, dt) = (window[0], window[1] - window[0]);
            let target = self.numeraire_expression(numeraire, window[1]);
            for (row, variable) in self.layout.iter().enumerate() {
                let change = target.clone().minus(&natives[row]);
                let mut mu = diffusions[row].inner_product(&change, t, dt)?;
                if variable.is_log() {
                    mu -= 0.5 * covariances[step][(row, row)];
                }
                drift[(row, step)] = mu;
            }
        }
        Ok(drift)
    }

    fn resolve_numeraire(&self, numeraire: Numeraire) -> Result<Numeraire, WorldError> {
        match numeraire {
            Numeraire::ForeignRollingSpot(k) if k == 0 || k >= self.economies.len() => {
                Err(WorldError::InvalidNumeraire(format!(
                    "foreign economy {} outside 1..{}",
                    k,
                    self.economies.len()
                )))
            }
            Numeraire::DomesticAsset(m) if m >= self.economies[0].assets().len() => {
                warn!(
                    asset = m,
                    assets = self.economies[0].assets().len(),
                    "asset numeraire out of range, falling back to the domestic rolling spot"
                );
                Ok(Numeraire::DomesticRollingSpot)
            }
            other => Ok(other),
        }
    }

    fn register_asset_numeraire(&mut self, m: usize) -> Result<NumeraireRegistration, WorldError> {
        let asset = self.set_reporting(0, ReportableKind::Asset(m))?;
        let bond = match self.horizon() {
            Some(horizon) => Some(self.set_reporting(0, ReportableKind::FixedMaturityBond(horizon))?),
            None => None,
        };
        Ok(NumeraireRegistration {
            numeraire: Numeraire::DomesticAsset(m),
            asset: Some(asset),
            bond,
        })
    }
}

fn validate_timeline(timeline: &[f64]) -> Result<(), WorldError> {
    if timeline.len() < 2 {
        return Err(WorldError::InvalidTimeline(format!(
            "{} points, at least 2 required",
            timeline.len()
        )));
    }
    if timeline[0] != 0.0 {
        return Err(WorldError::InvalidTimeline(format!(
            "starts at {} instead of 0",
            timeline[0]
        )));
    }
    if timeline.iter().any(|t| !t.is_finite()) {
        return Err(WorldError::InvalidTimeline("non-finite point".to_string()));
    }
    if let Some(w) = timeline.windows(2).find(|w| w[1] <= w[0]) {
        return Err(WorldError::InvalidTimeline(format!(
            "not strictly increasing at {} -> {}",
            w[0], w[1]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hjm_core::market_data::DiscountCurve;
    use hjm_models::economy::Asset;
    use hjm_models::volatility::VolatilityFunction;

    fn constant(levels: Vec<f64>) -> Arc<VolatilityFunction> {
        Arc::new(VolatilityFunction::constant(levels).unwrap())
    }

    fn two_currency_world() -> GaussMarkovWorld {
        let domestic = Economy::new(
            vec![Asset::new("EQ", 100.0, 0.01, constant(vec![0.05, 0.2])).unwrap()],
            constant(vec![0.01, 0.0]),
            Arc::new(DiscountCurve::flat(0.03)),
        )
        .unwrap();
        let foreign = Economy::new(
            vec![],
            constant(vec![0.004, 0.006]),
            Arc::new(DiscountCurve::flat(0.01)),
        )
        .unwrap();
        let fx = ExchangeRate::new(1.25, constant(vec![0.02, -0.1])).unwrap();
        GaussMarkovWorld::new(vec![domestic, foreign], vec![fx]).unwrap()
    }

    // ========================================================================
    // Construction Tests
    // ========================================================================

    #[test]
    fn test_layout_indices() {
        let world = two_currency_world();
        assert_eq!(world.state_dimension(), 2 + 1 + 2 + 1);
        assert_eq!(world.economy_start_index(0), Some(0));
        assert_eq!(world.economy_start_index(1), Some(3));
        assert_eq!(world.economy_start_index(2), None);
        assert_eq!(world.currency_start_index(), 5);
        assert!(world.exchange_rate(0).is_none());
        assert_relative_eq!(world.exchange_rate(1).unwrap().spot(), 1.25);
    }

    #[test]
    fn test_rejects_bad_construction() {
        assert!(matches!(
            GaussMarkovWorld::new(vec![], vec![]),
            Err(WorldError::DimensionMismatch { .. })
        ));

        let economy = |levels: Vec<f64>| {
            Economy::new(vec![], constant(levels), Arc::new(DiscountCurve::flat(0.02))).unwrap()
        };
        assert!(matches!(
            GaussMarkovWorld::new(vec![economy(vec![0.01]), economy(vec![0.01])], vec![]),
            Err(WorldError::DimensionMismatch { .. })
        ));

        let fx = ExchangeRate::new(1.0, constant(vec![0.1])).unwrap();
        assert!(matches!(
            GaussMarkovWorld::new(vec![economy(vec![0.01]), economy(vec![0.01, 0.0])], vec![fx]),
            Err(WorldError::Volatility(VolatilityError::FactorMismatch { .. }))
        ));
    }

    #[test]
    fn test_rejects_bad_timelines() {
        let mut world = two_currency_world();
        for timeline in [
            vec![0.0],
            vec![0.5, 1.0],
            vec![0.0, 1.0, 1.0],
            vec![0.0, 2.0, 1.0],
            vec![0.0, f64::NAN],
        ] {
            assert!(matches!(
                world.set_timeline(&timeline),
                Err(WorldError::InvalidTimeline(_))
            ));
        }
        assert!(world.timeline().is_empty());
    }

    // ========================================================================
    // Reporting Tests
    // ========================================================================

    #[test]
    fn test_set_reporting_is_idempotent() {
        let mut world = two_currency_world();
        let a = world.set_reporting(0, ReportableKind::Asset(0)).unwrap();
        let b = world.set_reporting(1, ReportableKind::RollingBond(0.5)).unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(world.set_reporting(0, ReportableKind::Asset(0)).unwrap(), 0);
        assert_eq!(world.reportables().len(), 2);
    }

    #[test]
    fn test_set_reporting_rejects_unknown_targets() {
        let mut world = two_currency_world();
        assert!(world.set_reporting(2, ReportableKind::RollingBond(1.0)).is_err());
        assert!(world.set_reporting(0, ReportableKind::Asset(1)).is_err());
        assert!(world.set_reporting(0, ReportableKind::TerminalForwardFx).is_err());
        assert!(world
            .set_reporting(1, ReportableKind::FixedMaturityBond(-1.0))
            .is_err());
    }

    #[test]
    fn test_zero_variates_report_forwards() {
        let mut world = two_currency_world();
        let eq = world.set_reporting(0, ReportableKind::Asset(0)).unwrap();
        let fx = world.set_reporting(1, ReportableKind::TerminalForwardFx).unwrap();
        let bond = world.set_reporting(0, ReportableKind::FixedMaturityBond(0.5)).unwrap();
        world.set_timeline(&[0.0, 0.5, 1.0]).unwrap();

        let mut path = PathValues::new(0, 0);
        let x = DMatrix::zeros(2, world.max_rank());
        world.simulate_path(&x, &mut path).unwrap();

        // Time zero: forwards and the initial curve
        assert_relative_eq!(
            path.value(eq, 0),
            100.0 * (-0.01_f64).exp() / (-0.03_f64).exp(),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            path.value(fx, 0),
            1.25 * (-0.01_f64).exp() / (-0.03_f64).exp(),
            max_relative = 1e-12
        );
        assert_relative_eq!(path.value(bond, 0), (-0.015_f64).exp(), max_relative = 1e-12);
        // Matured bond reports one
        assert_eq!(path.value(bond, 1), 1.0);
        assert_eq!(path.value(bond, 2), 1.0);
        assert_eq!(path.numeraire(0), 1.0);
    }

    // ========================================================================
    // Numeraire Tests
    // ========================================================================

    #[test]
    fn test_asset_numeraire_registers_asset_and_bond() {
        let mut world = two_currency_world();
        world.set_timeline(&[0.0, 1.0, 2.0]).unwrap();
        let registration = world.set_numeraire(Numeraire::DomesticAsset(0)).unwrap();
        assert_eq!(registration.numeraire, Numeraire::DomesticAsset(0));
        assert_eq!(registration.asset, Some(0));
        assert_eq!(registration.bond, Some(1));
        assert_eq!(
            world.reportables()[1].kind,
            ReportableKind::FixedMaturityBond(2.0)
        );
        assert_relative_eq!(world.initial_numeraire(), 100.0);

        // A longer horizon registers the new horizon bond
        world.set_timeline(&[0.0, 3.0]).unwrap();
        assert_eq!(world.numeraire_registration().bond, Some(2));
    }

    #[test]
    fn test_asset_numeraire_out_of_range_falls_back() {
        let mut world = two_currency_world();
        world.set_timeline(&[0.0, 1.0]).unwrap();
        let registration = world.set_numeraire(Numeraire::DomesticAsset(5)).unwrap();
        assert_eq!(registration.numeraire, Numeraire::DomesticRollingSpot);
        assert_eq!(registration.asset, None);
        assert!(world.reportables().is_empty());
    }

    #[test]
    fn test_foreign_numeraire_out_of_range_fails() {
        let mut world = two_currency_world();
        world.set_timeline(&[0.0, 1.0]).unwrap();
        world.set_numeraire(Numeraire::ForeignRollingSpot(1)).unwrap();
        for k in [0, 2] {
            assert!(matches!(
                world.set_numeraire(Numeraire::ForeignRollingSpot(k)),
                Err(WorldError::InvalidNumeraire(_))
            ));
        }
        assert_eq!(world.numeraire(), Numeraire::ForeignRollingSpot(1));
        assert_relative_eq!(world.initial_numeraire(), 1.25);
    }

    #[test]
    fn test_numeraire_before_timeline() {
        let mut world = two_currency_world();
        let registration = world.set_numeraire(Numeraire::DomesticAsset(0)).unwrap();
        assert_eq!(registration.bond, None);
        world.set_timeline(&[0.0, 1.0]).unwrap();
        assert_eq!(world.numeraire_registration().bond, Some(1));
    }

    #[test]
    fn test_drift_of_rate_factor_under_domestic_spot_measure() {
        // Domestic rolling spot over one step: ν_N - ν_native = -b(·,T),
        // so the drift of z is -∫ σ b(s,T) ds = -v²(T t' - t'^2/2) over [0,T]
        let economy = Economy::new(
            vec![],
            constant(vec![0.01]),
            Arc::new(DiscountCurve::flat(0.02)),
        )
        .unwrap();
        let mut world = GaussMarkovWorld::new(vec![economy], vec![]).unwrap();
        world.set_timeline(&[0.0, 2.0]).unwrap();
        assert_relative_eq!(world.drift()[(0, 0)], -1e-4 * 2.0, max_relative = 1e-12);
    }

    // ========================================================================
    // Propagation Tests
    // ========================================================================

    #[test]
    fn test_propagation_requires_timeline_and_variates() {
        let mut world = two_currency_world();
        let x = DMatrix::zeros(1, 2);
        assert!(matches!(
            world.propagate_state_variables(&x),
            Err(WorldError::TimelineNotSet)
        ));

        world.set_timeline(&[0.0, 1.0, 2.0]).unwrap();
        assert!(matches!(
            world.propagate_state_variables(&x),
            Err(WorldError::InsufficientRandoms { .. })
        ));
        let narrow = DMatrix::zeros(2, 1);
        assert!(matches!(
            world.propagate_state_variables(&narrow),
            Err(WorldError::InsufficientRandoms { .. })
        ));
    }

    #[test]
    fn test_propagation_accumulates_drift() {
        let mut world = two_currency_world();
        world.set_timeline(&[0.0, 0.5, 1.0]).unwrap();
        let x = DMatrix::zeros(2, world.max_rank());
        world.propagate_state_variables(&x).unwrap();
        let state = world.state();
        for row in 0..world.state_dimension() {
            assert_eq!(state[(row, 0)], 0.0);
            assert_relative_eq!(
                state[(row, 2)],
                world.drift()[(row, 0)] + world.drift()[(row, 1)],
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_generate_checks_buffers() {
        let mut world = two_currency_world();
        world.set_reporting(0, ReportableKind::Asset(0)).unwrap();
        world.set_timeline(&[0.0, 1.0]).unwrap();
        let x = DMatrix::zeros(1, world.max_rank());
        let mut values = DMatrix::zeros(1, 2);
        let mut numeraire = vec![0.0; 2];
        world
            .generate(&mut values, &mut numeraire, &x, &[0.0, 1.0], Numeraire::ForeignRollingSpot(1))
            .unwrap();
        assert_eq!(world.numeraire(), Numeraire::ForeignRollingSpot(1));
        assert_relative_eq!(numeraire[0], 1.25, max_relative = 1e-12);

        let mut short = vec![0.0; 1];
        assert!(matches!(
            world.generate(&mut values, &mut short, &x, &[0.0, 1.0], Numeraire::ForeignRollingSpot(1)),
            Err(WorldError::DimensionMismatch { .. })
        ));
    }
}
