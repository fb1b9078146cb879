//! Closed-form prices in the Gaussian HJM model.
//!
//! - [`GaussianHjm`]: single-currency model built from one interest-rate
//!   volatility and one initial discount curve; bonds, bond options,
//!   swaptions, caplets, and the cross-currency and equity formulas that
//!   need a second economy or an asset
//! - [`black`]: discounted Black formula every closed form reduces to
//!
//! All variances are assembled from the volatility integrals of
//! [`crate::volatility`], so each formula holds for every volatility shape
//! that supports the integrals it needs.

mod black;
mod gaussian_hjm;

pub use black::{black, OptionType, SwaptionType};
pub use gaussian_hjm::GaussianHjm;
