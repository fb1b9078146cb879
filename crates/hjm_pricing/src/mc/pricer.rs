//! Parallel Monte Carlo estimator over world paths.

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::debug;

use super::config::{Batch, MonteCarloConfig};
use crate::rng::PricerRng;
use crate::world::{GaussMarkovWorld, PathValues, WorldError};

/// Monte Carlo estimate with its standard error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct McEstimate {
    /// Sample mean.
    pub mean: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    /// Number of paths.
    pub paths: usize,
}

impl McEstimate {
    /// Whether `value` lies within `k` standard errors of the mean.
    #[inline]
    pub fn contains(&self, value: f64, k: f64) -> bool {
        (self.mean - value).abs() <= k * self.std_error
    }
}

/// Running sums of one batch.
#[derive(Clone, Copy, Debug, Default)]
struct Moments {
    sum: f64,
    sum_sq: f64,
    count: usize,
}

impl Moments {
    #[inline]
    fn add(&mut self, x: f64) {
        self.sum += x;
        self.sum_sq += x * x;
        self.count += 1;
    }

    #[inline]
    fn merge(self, other: Moments) -> Moments {
        Moments {
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
            count: self.count + other.count,
        }
    }

    fn estimate(&self) -> McEstimate {
        let n = self.count as f64;
        let mean = self.sum / n;
        let std_error = if self.count > 1 {
            let variance = ((self.sum_sq - n * mean * mean) / (n - 1.0)).max(0.0);
            (variance / n).sqrt()
        } else {
            0.0
        };
        McEstimate {
            mean,
            std_error,
            paths: self.count,
        }
    }
}

/// Monte Carlo estimator over a [`GaussMarkovWorld`].
///
/// Each batch of paths is simulated on its own clone of the world with its
/// own random stream.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use hjm_core::market_data::DiscountCurve;
/// use hjm_models::economy::Economy;
/// use hjm_models::volatility::VolatilityFunction;
/// use hjm_pricing::mc::{MonteCarloConfig, WorldPricer};
/// use hjm_pricing::world::{GaussMarkovWorld, ReportableKind};
///
/// let rates = Arc::new(VolatilityFunction::constant(vec![0.01]).unwrap());
/// let economy = Economy::new(vec![], rates, Arc::new(DiscountCurve::flat(0.02))).unwrap();
/// let mut world = GaussMarkovWorld::new(vec![economy], vec![]).unwrap();
/// let bond = world.set_reporting(0, ReportableKind::FixedMaturityBond(3.0)).unwrap();
/// world.set_timeline(&[0.0, 1.0]).unwrap();
///
/// let config = MonteCarloConfig::builder().n_paths(2_000).seed(3).build().unwrap();
/// let estimate = WorldPricer::new(config)
///     .price_discounted(&world, |path| path.terminal(bond))
///     .unwrap();
///
/// // The discounted bond reproduces today's curve
/// assert!(estimate.contains((-0.06_f64).exp(), 4.0));
/// ```
#[derive(Clone, Debug)]
pub struct WorldPricer {
    config: MonteCarloConfig,
}

impl WorldPricer {
    /// Creates an estimator.
    #[inline]
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Estimates `E[payoff(path)]` under the world's numeraire measure.
    ///
    /// # Errors
    ///
    /// `TimelineNotSet` if the world has no timeline, or the first path
    /// error of any batch.
    pub fn estimate<F>(&self, world: &GaussMarkovWorld, payoff: F) -> Result<McEstimate, WorldError>
    where
        F: Fn(&PathValues) -> f64 + Send + Sync,
    {
        if world.timeline().is_empty() {
            return Err(WorldError::TimelineNotSet);
        }
        let seed = self.config.seed().unwrap_or_else(rand::random);
        let n_paths = self.config.n_paths();
        let n_batches = self.config.n_batches();
        debug!(n_paths, n_batches, seed, "monte carlo estimate");

        let batches = self
            .config
            .batches()
            .collect::<Vec<Batch>>()
            .into_par_iter()
            .map(|batch| simulate_batch(world, seed, batch, &payoff))
            .collect::<Result<Vec<_>, _>>()?;

        let total = batches
            .into_iter()
            .fold(Moments::default(), Moments::merge);
        Ok(total.estimate())
    }

    /// Estimates the time-zero domestic value `N(0)·E[payoff / N(T)]` of a
    /// payoff in domestic currency paid at the horizon.
    ///
    /// # Errors
    ///
    /// As [`estimate`](Self::estimate).
    pub fn price_discounted<F>(
        &self,
        world: &GaussMarkovWorld,
        payoff: F,
    ) -> Result<McEstimate, WorldError>
    where
        F: Fn(&PathValues) -> f64 + Send + Sync,
    {
        let initial = world.initial_numeraire();
        let deflated = self.estimate(world, |path| payoff(path) / path.terminal_numeraire())?;
        Ok(McEstimate {
            mean: initial * deflated.mean,
            std_error: initial * deflated.std_error,
            paths: deflated.paths,
        })
    }
}

fn simulate_batch<F>(
    world: &GaussMarkovWorld,
    seed: u64,
    batch: Batch,
    payoff: &F,
) -> Result<Moments, WorldError>
where
    F: Fn(&PathValues) -> f64,
{
    let mut world = world.clone();
    let mut rng = PricerRng::for_stream(seed, batch.stream);
    let steps = world.timeline().len() - 1;
    let mut x = DMatrix::zeros(steps, world.max_rank());
    let mut path = PathValues::new(world.reportables().len(), world.timeline().len());

    let mut moments = Moments::default();
    for _ in 0..batch.paths {
        rng.fill_normal(x.as_mut_slice());
        world.simulate_path(&x, &mut path)?;
        moments.add(payoff(&path));
    }
    Ok(moments)
}
