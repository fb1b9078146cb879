//! Initial discount curves.
//!
//! - [`YieldCurve`]: discount factor, zero rate and forward rate contract
//! - [`FlatCurve`]: constant continuously compounded rate
//! - [`InterpolatedCurve`]: pillar-based curve, linear in zero rates or
//!   log-linear in discount factors
//! - [`DiscountCurve`]: enum wrapper used by the models for static dispatch

mod curve_enum;
mod flat;
mod interpolated;
mod traits;

pub use curve_enum::DiscountCurve;
pub use flat::FlatCurve;
pub use interpolated::{CurveInterpolation, InterpolatedCurve};
pub use traits::YieldCurve;
