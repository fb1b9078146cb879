//! # hjm_models (L2: Models)
//!
//! Deterministic volatility functions and the closed-form analytics of the
//! Gaussian Heath/Jarrow/Morton model.
//!
//! This crate provides:
//! - [`volatility`]: the closed family of volatility functions (constant,
//!   exponentially decaying, piecewise constant, difference) and the
//!   mediator resolving every pairwise integral identity
//! - [`analytical`]: `GaussianHjm`, single-currency closed forms for bonds,
//!   bond options, swaptions, caplets and the cross-currency and equity
//!   options expressed through the mediator
//! - [`economy`]: traded assets, exchange rates and per-currency economies
//!
//! ## Design Principles
//!
//! - **Closed enum dispatch**: every supported pair of volatility shapes is
//!   an explicit match arm, so the set of closed forms is enumerable
//! - **Shared ownership of inputs**: volatility functions and curves are
//!   held behind `Arc` so economies and models share them without copying
//! - **Fail fast**: unsupported pairings, factor mismatches and
//!   extrapolation surface as errors and are never retried

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod economy;
pub mod error;
pub mod volatility;

pub use error::ModelError;
