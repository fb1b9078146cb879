//! Root-finding solvers.
//!
//! - [`BrentSolver`]: bracketing method without derivative requirement,
//!   used for break-even states in coupon bond options
//! - [`SolverConfig`]: tolerance and iteration budget
//!
//! ```
//! use hjm_core::math::solvers::{BrentSolver, SolverConfig};
//!
//! let solver = BrentSolver::new(SolverConfig::default());
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```

mod brent;
mod config;

pub use brent::BrentSolver;
pub use config::SolverConfig;
