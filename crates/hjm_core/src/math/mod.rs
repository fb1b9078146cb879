//! Numerical primitives used by the closed-form models.
//!
//! - [`distributions`]: standard normal density and distribution function
//! - [`solvers`]: bracketing root search
//! - [`quadrature`]: Gauss-Legendre integration over graded panels

pub mod distributions;
pub mod quadrature;
pub mod solvers;
