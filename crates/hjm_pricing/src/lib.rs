//! # hjm_pricing (L3: Simulation)
//!
//! Joint simulation of interest rates, assets and exchange rates in a
//! multi-currency Gaussian HJM world, and Monte Carlo estimation on top of
//! it.
//!
//! This crate provides:
//! - [`rng`]: seeded pseudo-random normals for the driving variates
//! - [`mvn`]: multivariate normal sampler built from a covariance matrix
//! - [`world`]: [`GaussMarkovWorld`](world::GaussMarkovWorld), the
//!   covariance, drift and path engine with its reportables and numeraires
//! - [`mc`]: configuration and the parallel [`WorldPricer`](mc::WorldPricer)
//!
//! ## Workflow
//!
//! ```rust
//! use std::sync::Arc;
//! use hjm_core::market_data::DiscountCurve;
//! use hjm_models::economy::{Asset, Economy};
//! use hjm_models::volatility::VolatilityFunction;
//! use hjm_pricing::mc::{MonteCarloConfig, WorldPricer};
//! use hjm_pricing::world::{GaussMarkovWorld, Numeraire, ReportableKind};
//!
//! let rates = Arc::new(VolatilityFunction::constant(vec![0.01]).unwrap());
//! let equity = Asset::new(
//!     "EQ",
//!     100.0,
//!     0.0,
//!     Arc::new(VolatilityFunction::constant(vec![0.2]).unwrap()),
//! )
//! .unwrap();
//! let economy = Economy::new(vec![equity], rates, Arc::new(DiscountCurve::flat(0.03))).unwrap();
//!
//! let mut world = GaussMarkovWorld::new(vec![economy], vec![]).unwrap();
//! let equity = world.set_reporting(0, ReportableKind::Asset(0)).unwrap();
//! world.set_timeline(&[0.0, 1.0]).unwrap();
//! world.set_numeraire(Numeraire::DomesticRollingSpot).unwrap();
//!
//! let config = MonteCarloConfig::builder().n_paths(1_000).seed(7).build().unwrap();
//! let estimate = WorldPricer::new(config)
//!     .price_discounted(&world, |path| path.terminal(equity))
//!     .unwrap();
//! assert!((estimate.mean - 100.0).abs() < 5.0 * estimate.std_error);
//! ```
//!
//! ## Design Principles
//!
//! - **Instance-local scratch**: a world owns its covariances, drifts,
//!   samplers and state matrix; it is not reentrant, and parallel
//!   simulation gives every worker its own clone
//! - **Explicit registration**: reportables and numeraire side effects are
//!   returned to the caller as stable indices
//! - **Reproducibility**: path batches are seeded deterministically from
//!   the configured seed, independent of thread scheduling

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod mc;
pub mod mvn;
pub mod rng;
pub mod world;
