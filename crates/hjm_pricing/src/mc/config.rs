//! Path budget of a world estimate and its split into batches.
//!
//! A batch is the unit of parallel work: one clone of the world, one random
//! stream and a run of consecutive paths. The split depends only on the
//! path count and batch size, so a seeded estimate is reproducible on any
//! number of threads.

use super::error::ConfigError;

/// Largest path budget accepted.
pub const MAX_PATHS: usize = 10_000_000;

/// Paths simulated by one worker on one world clone.
pub const DEFAULT_BATCH_SIZE: usize = 4_096;

/// One batch of an estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Batch {
    /// Random stream of the batch, equal to its position.
    pub stream: u64,
    /// Paths simulated in the batch.
    pub paths: usize,
}

/// Path budget, batch size and seed of a [`WorldPricer`](super::WorldPricer).
///
/// # Examples
///
/// ```rust
/// use hjm_pricing::mc::MonteCarloConfig;
///
/// let config = MonteCarloConfig::builder()
///     .n_paths(10_250)
///     .batch_size(500)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.n_batches(), 21);
/// assert_eq!(config.batch(20).unwrap().paths, 250);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonteCarloConfig {
    n_paths: usize,
    batch_size: usize,
    seed: Option<u64>,
}

impl MonteCarloConfig {
    /// Starts a builder.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Total number of paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Paths per full batch.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches; only the last one may be partial.
    #[inline]
    pub fn n_batches(&self) -> usize {
        self.n_paths.div_ceil(self.batch_size)
    }

    /// Seed shared by all batch streams, drawn from entropy when absent.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Batch at `index`, or `None` past the last batch.
    pub fn batch(&self, index: usize) -> Option<Batch> {
        let start = index.checked_mul(self.batch_size)?;
        if start >= self.n_paths {
            return None;
        }
        Some(Batch {
            stream: index as u64,
            paths: self.batch_size.min(self.n_paths - start),
        })
    }

    /// All batches in stream order.
    pub fn batches(&self) -> impl Iterator<Item = Batch> + '_ {
        (0..self.n_batches()).filter_map(move |index| self.batch(index))
    }

    /// Checks the path budget and batch size.
    ///
    /// # Errors
    ///
    /// - `NoPaths` or `TooManyPaths` for a budget outside `1..=MAX_PATHS`
    /// - `EmptyBatch` for a zero batch size
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_paths == 0 {
            return Err(ConfigError::NoPaths);
        }
        if self.n_paths > MAX_PATHS {
            return Err(ConfigError::TooManyPaths {
                paths: self.n_paths,
                max: MAX_PATHS,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        Ok(())
    }
}

/// Builder for [`MonteCarloConfig`]; the path budget is required.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_paths: Option<usize>,
    batch_size: Option<usize>,
    seed: Option<u64>,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of simulated paths (required).
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Defaults to [`DEFAULT_BATCH_SIZE`].
    #[inline]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Sets the random seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// `MissingPathCount` without a path budget, otherwise as
    /// [`MonteCarloConfig::validate`].
    pub fn build(self) -> Result<MonteCarloConfig, ConfigError> {
        let config = MonteCarloConfig {
            n_paths: self.n_paths.ok_or(ConfigError::MissingPathCount)?,
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Builder
    // ========================================

    #[test]
    fn test_defaults() {
        let config = MonteCarloConfig::builder().n_paths(10_000).build().unwrap();
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.n_batches(), 3);
        assert_eq!(config.seed(), None);
    }

    #[test]
    fn test_path_budget_bounds() {
        assert_eq!(
            MonteCarloConfig::builder().n_paths(0).build(),
            Err(ConfigError::NoPaths)
        );
        assert_eq!(
            MonteCarloConfig::builder().n_paths(MAX_PATHS + 1).build(),
            Err(ConfigError::TooManyPaths {
                paths: MAX_PATHS + 1,
                max: MAX_PATHS
            })
        );
        assert!(MonteCarloConfig::builder().n_paths(MAX_PATHS).build().is_ok());
    }

    #[test]
    fn test_empty_batch_rejected() {
        let result = MonteCarloConfig::builder().n_paths(1000).batch_size(0).build();
        assert_eq!(result, Err(ConfigError::EmptyBatch));
    }

    #[test]
    fn test_missing_path_count() {
        let result = MonteCarloConfig::builder().seed(1).build();
        assert_eq!(result, Err(ConfigError::MissingPathCount));
    }

    // ========================================
    // Batches
    // ========================================

    #[test]
    fn test_batches_cover_budget() {
        let config = MonteCarloConfig::builder()
            .n_paths(1001)
            .batch_size(100)
            .build()
            .unwrap();
        let batches: Vec<Batch> = config.batches().collect();
        assert_eq!(batches.len(), 11);
        assert_eq!(batches.iter().map(|b| b.paths).sum::<usize>(), 1001);
        assert_eq!(batches[10], Batch { stream: 10, paths: 1 });
        assert!(batches.iter().enumerate().all(|(i, b)| b.stream == i as u64));
        assert_eq!(config.batch(11), None);
    }

    #[test]
    fn test_single_batch_when_budget_fits() {
        let config = MonteCarloConfig::builder()
            .n_paths(300)
            .batch_size(500)
            .build()
            .unwrap();
        assert_eq!(config.batches().collect::<Vec<_>>(), vec![Batch { stream: 0, paths: 300 }]);
    }
}
