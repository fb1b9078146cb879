//! Gauss-Legendre quadrature on finite intervals.
//!
//! Nodes and weights are computed with the Golub-Welsch algorithm: the
//! nodes are the eigenvalues of the symmetric tridiagonal Jacobi matrix of
//! the Legendre polynomials, and each weight is twice the squared first
//! component of the corresponding normalised eigenvector.

use nalgebra::{DMatrix, SymmetricEigen};

use crate::types::PricingError;

/// Gauss-Legendre rule for `∫ f(x) dx` over `[a, b]`.
///
/// An `n`-point rule integrates polynomials up to degree `2n - 1` exactly.
/// Integrands with kinks should be split at the kink, see
/// [`GaussLegendre::integrate_panels`].
///
/// # Example
///
/// ```
/// use hjm_core::math::quadrature::GaussLegendre;
///
/// let rule = GaussLegendre::new(8).unwrap();
/// // ∫_0^2 x^3 dx = 4
/// let integral = rule.integrate(0.0, 2.0, |x| x * x * x);
/// assert!((integral - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaussLegendre {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendre {
    /// Build an `order`-point rule on `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// `PricingError::InvalidInput` if `order` is zero.
    pub fn new(order: usize) -> Result<Self, PricingError> {
        if order == 0 {
            return Err(PricingError::InvalidInput(
                "Gauss-Legendre order must be positive".to_string(),
            ));
        }

        let jacobi = DMatrix::from_fn(order, order, |i, j| {
            if i + 1 == j || j + 1 == i {
                let k = i.max(j) as f64;
                k / (4.0 * k * k - 1.0).sqrt()
            } else {
                0.0
            }
        });
        let eigen = SymmetricEigen::new(jacobi);

        let mut pairs: Vec<(f64, f64)> = (0..order)
            .map(|k| {
                (
                    eigen.eigenvalues[k],
                    2.0 * eigen.eigenvectors[(0, k)].powi(2),
                )
            })
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (nodes, weights) = pairs.into_iter().unzip();
        Ok(Self { nodes, weights })
    }

    /// Nodes on `[-1, 1]` in increasing order.
    #[inline]
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Weights on `[-1, 1]`, summing to two.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of points.
    #[inline]
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Approximate `∫_a^b f(x) dx`.
    pub fn integrate<F>(&self, a: f64, b: f64, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let (mid, half) = (0.5 * (a + b), 0.5 * (b - a));
        half * self
            .nodes
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| w * f(mid + half * x))
            .sum::<f64>()
    }

    /// Approximate `∫ f(x) dx` over consecutive panels `[edges[k], edges[k+1]]`
    /// for a fallible integrand.
    pub fn integrate_panels<F, E>(&self, edges: &[f64], f: F) -> Result<f64, E>
    where
        F: Fn(f64) -> Result<f64, E>,
    {
        let mut total = 0.0;
        for panel in edges.windows(2) {
            let (mid, half) = (0.5 * (panel[0] + panel[1]), 0.5 * (panel[1] - panel[0]));
            for (&x, &w) in self.nodes.iter().zip(&self.weights) {
                total += half * w * f(mid + half * x)?;
            }
        }
        Ok(total)
    }
}

/// Panel edges covering `[lo, hi]` in steps of at most `step`, refined
/// geometrically towards `centre` down to `step · 2^-levels`.
///
/// A kink at `centre` then falls on a panel edge, and features of any
/// width above the finest level are resolved by panels of matching size.
pub fn graded_edges(lo: f64, hi: f64, step: f64, centre: f64, levels: u32) -> Vec<f64> {
    let mut edges = vec![lo, hi];
    let panels = ((hi - lo) / step).ceil().max(1.0) as usize;
    edges.extend((1..panels).map(|k| lo + (hi - lo) * k as f64 / panels as f64));

    if lo < centre && centre < hi {
        edges.push(centre);
        let mut width = step;
        for _ in 0..=levels {
            for edge in [centre - width, centre + width] {
                if lo < edge && edge < hi {
                    edges.push(edge);
                }
            }
            width *= 0.5;
        }
    }

    edges.sort_by(f64::total_cmp);
    edges.dedup();
    edges
}
