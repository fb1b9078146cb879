//! # hjm_core: Numerical Foundation for the Gaussian HJM Engine
//!
//! ## Layer 1 (Foundation) Role
//!
//! hjm_core is the bottom layer of the workspace and provides:
//! - Error types: `PricingError`, `SolverError` (`types::error`)
//! - Initial discount curves: `YieldCurve`, `FlatCurve`, `InterpolatedCurve`,
//!   `DiscountCurve` (`market_data::curves`)
//! - Standard normal distribution helpers (`math::distributions`)
//! - Brent root search (`math::solvers`)
//! - Gauss-Legendre quadrature (`math::quadrature`)
//!
//! ## Dependencies
//!
//! Layer 1 has no dependencies on other hjm_* crates:
//! - thiserror: Error derivation
//! - statrs: Complementary error function
//! - nalgebra: Symmetric eigen decomposition for quadrature nodes
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use hjm_core::market_data::curves::{FlatCurve, YieldCurve};
//! use hjm_core::math::distributions::norm_cdf;
//!
//! let curve = FlatCurve::new(0.03);
//! let df = curve.discount_factor(1.0).unwrap();
//! assert!((df - (-0.03_f64).exp()).abs() < 1e-15);
//!
//! assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for curve interpolation settings

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
