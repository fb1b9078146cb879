//! Market data: initial discount curves.
//!
//! The Gaussian HJM engine consumes exactly one piece of market data per
//! currency, the time-0 discount curve `D(t)`. Curves are exposed through
//! the [`YieldCurve`] trait and the [`DiscountCurve`] enum for static
//! dispatch.

pub mod curves;
pub mod error;

pub use curves::{CurveInterpolation, DiscountCurve, FlatCurve, InterpolatedCurve, YieldCurve};
pub use error::MarketDataError;
