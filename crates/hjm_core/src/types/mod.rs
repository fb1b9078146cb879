//! Core error types shared by every layer.
//!
//! # Re-exports
//!
//! [`PricingError`] and [`SolverError`] from `error`.

pub mod error;

pub use error::{PricingError, SolverError};
