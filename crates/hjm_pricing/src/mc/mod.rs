//! Monte Carlo estimation over a [`GaussMarkovWorld`](crate::world::GaussMarkovWorld).
//!
//! # Architecture
//!
//! ```text
//! WorldPricer
//! ├── MonteCarloConfig   (paths, batch size, seed)
//! └── per batch, in parallel
//!     ├── world clone    (instance-local scratch)
//!     ├── PricerRng      (independent stream per batch)
//!     └── PathValues     (reused path buffer)
//! ```
//!
//! Batches are seeded from the configured seed and the batch index, so an
//! estimate does not depend on the number of worker threads.

mod config;
mod error;
mod pricer;

pub use config::{Batch, MonteCarloConfig, MonteCarloConfigBuilder, DEFAULT_BATCH_SIZE, MAX_PATHS};
pub use error::ConfigError;
pub use pricer::{McEstimate, WorldPricer};
