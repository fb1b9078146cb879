//! # Random Number Generation
//!
//! Seeded pseudo-random numbers for the driving variates of world
//! simulations.
//!
//! ## Design Rationale
//!
//! - **Reproducibility**: every generator is seeded, and parallel batches
//!   draw from independent streams derived from one master seed
//! - **Efficiency**: batch fills write into caller-owned `&mut [f64]`
//!   buffers, so the path loop does not allocate
//!
//! ## Usage Example
//!
//! ```rust
//! use hjm_pricing::rng::PricerRng;
//!
//! let mut rng = PricerRng::from_seed(12345);
//!
//! let mut variates = vec![0.0; 8];
//! rng.fill_normal(&mut variates);
//! assert!(variates.iter().all(|x| x.is_finite()));
//! ```

mod prng;

pub use prng::PricerRng;
