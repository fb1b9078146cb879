//! Pseudo-random number generator wrapper for world simulations.
//!
//! This module provides [`PricerRng`], a seeded PRNG wrapper that offers
//! reproducible random number generation with batch operations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Multiplier spreading stream indices across the seed space.
const STREAM_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;

/// Monte Carlo random number generator.
///
/// Provides seeded, reproducible random number generation with batch
/// operations for uniform and normal distributions.
///
/// # Examples
///
/// ```rust
/// use hjm_pricing::rng::PricerRng;
///
/// let mut rng = PricerRng::from_seed(42);
///
/// let u: f64 = rng.gen_uniform();
/// let n: f64 = rng.gen_normal();
/// assert!((0.0..1.0).contains(&u));
/// assert!(n.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct PricerRng {
    /// The underlying PRNG instance.
    inner: StdRng,
    /// The seed used for initialisation (stored for reproducibility tracking).
    seed: u64,
}

impl PricerRng {
    /// Creates a new RNG instance initialised with the given seed.
    ///
    /// The same seed always produces the same sequence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hjm_pricing::rng::PricerRng;
    ///
    /// let mut rng1 = PricerRng::from_seed(12345);
    /// let mut rng2 = PricerRng::from_seed(12345);
    ///
    /// assert_eq!(rng1.gen_uniform(), rng2.gen_uniform());
    /// ```
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates the generator of stream `stream` under master seed `seed`.
    ///
    /// Used to give each batch of paths its own sequence, so results do not
    /// depend on which worker thread simulates the batch.
    #[inline]
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        Self::from_seed(seed ^ stream.wrapping_add(1).wrapping_mul(STREAM_SPACING))
    }

    /// Returns the seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generates a single uniform random value in [0, 1).
    #[inline]
    pub fn gen_uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Generates a single standard normal variate (mean=0, std=1).
    ///
    /// Uses the Ziggurat algorithm via `rand_distr::StandardNormal`.
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Fills the buffer with uniform random values in [0, 1).
    ///
    /// Empty buffers are handled gracefully (no operation).
    #[inline]
    pub fn fill_uniform(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.inner.gen();
        }
    }

    /// Fills the buffer with standard normal variates.
    ///
    /// Empty buffers are handled gracefully (no operation).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hjm_pricing::rng::PricerRng;
    ///
    /// let mut rng = PricerRng::from_seed(42);
    /// let mut buffer = vec![0.0; 10_000];
    /// rng.fill_normal(&mut buffer);
    ///
    /// let mean: f64 = buffer.iter().sum::<f64>() / buffer.len() as f64;
    /// assert!(mean.abs() < 0.05);
    /// ```
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}
