//! Multivariate normal sampling from a covariance matrix.
//!
//! The covariance of one timeline step is decomposed once as
//! `C = Σ_r λ_r e_r e_rᵀ`. Independent standard normals `z` are mapped to
//! correlated increments by
//!
//! ```text
//! x = Σ_{r < rank} √λ_r · e_r · z_r
//! ```
//!
//! Eigenvalues are kept in descending order and those below the rank
//! tolerance are dropped, so a singular covariance (e.g. a deterministic
//! state variable) consumes only `rank` variates. The rank is bounded by
//! the dimension, not by the number of Brownian factors: state variables
//! whose loadings differ in shape over a step span more directions.

mod error;

pub use error::SamplerError;

use nalgebra::{DMatrix, SymmetricEigen};

/// Eigenvalues below this fraction of the largest count as zero.
pub const RANK_TOLERANCE: f64 = 1e-12;

/// Eigenvalues below `-NEGATIVE_TOLERANCE · max(1, λ_max)` are rejected.
pub const NEGATIVE_TOLERANCE: f64 = 1e-9;

/// Sampler of `N(0, C)` built from a covariance matrix `C`.
///
/// # Examples
///
/// ```rust
/// use nalgebra::DMatrix;
/// use hjm_pricing::mvn::MultivariateNormal;
///
/// // Perfectly correlated pair: rank one
/// let cov = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
/// let mvn = MultivariateNormal::new(&cov).unwrap();
/// assert_eq!(mvn.rank(), 1);
///
/// let mut out = [0.0; 2];
/// mvn.transform(&[1.0], &mut out).unwrap();
/// assert!((out[1] - 2.0 * out[0]).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct MultivariateNormal {
    dim: usize,
    eigenvalues: Vec<f64>,
    /// `dim × rank`, column r is `√λ_r · e_r`.
    loadings: DMatrix<f64>,
}

impl MultivariateNormal {
    /// Decomposes `covariance`.
    ///
    /// The matrix is symmetrised before decomposition.
    ///
    /// # Errors
    ///
    /// - `NotSquare` for a non-square matrix
    /// - `NonFinite` if an entry is NaN or infinite
    /// - `NotPositiveSemiDefinite` if an eigenvalue is materially negative
    pub fn new(covariance: &DMatrix<f64>) -> Result<Self, SamplerError> {
        let (rows, cols) = covariance.shape();
        if rows != cols {
            return Err(SamplerError::NotSquare { rows, cols });
        }
        if covariance.iter().any(|c| !c.is_finite()) {
            return Err(SamplerError::NonFinite);
        }
        if rows == 0 {
            return Ok(Self {
                dim: 0,
                eigenvalues: Vec::new(),
                loadings: DMatrix::zeros(0, 0),
            });
        }

        let symmetric = (covariance + covariance.transpose()) * 0.5;
        let eigen = SymmetricEigen::new(symmetric);

        let mut order: Vec<usize> = (0..rows).collect();
        order.sort_by(|&i, &j| eigen.eigenvalues[j].total_cmp(&eigen.eigenvalues[i]));
        let eigenvalues: Vec<f64> = order.iter().map(|&i| eigen.eigenvalues[i]).collect();

        let largest = eigenvalues[0].max(0.0);
        let smallest = eigenvalues[rows - 1];
        if smallest < -NEGATIVE_TOLERANCE * largest.max(1.0) {
            return Err(SamplerError::NotPositiveSemiDefinite {
                eigenvalue: smallest,
            });
        }

        let rank = eigenvalues
            .iter()
            .take_while(|&&lambda| lambda > RANK_TOLERANCE * largest && lambda > 0.0)
            .count();

        let mut loadings = DMatrix::zeros(rows, rank);
        for (r, &i) in order.iter().take(rank).enumerate() {
            let scale = eigenvalues[r].sqrt();
            for row in 0..rows {
                loadings[(row, r)] = scale * eigen.eigenvectors[(row, i)];
            }
        }

        Ok(Self {
            dim: rows,
            eigenvalues,
            loadings,
        })
    }

    /// Dimension of the distribution.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of independent variates a draw consumes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.loadings.ncols()
    }

    /// Eigenvalues of the covariance, in descending order.
    #[inline]
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Maps independent standard normals `z` to a correlated draw in `out`.
    ///
    /// Only the first [`rank`](Self::rank) entries of `z` are read.
    ///
    /// # Errors
    ///
    /// `InsufficientVariates` if `z` is shorter than the rank,
    /// `DimensionMismatch` if `out` does not have the distribution's
    /// dimension.
    pub fn transform(&self, z: &[f64], out: &mut [f64]) -> Result<(), SamplerError> {
        let rank = self.rank();
        if z.len() < rank {
            return Err(SamplerError::InsufficientVariates {
                required: rank,
                provided: z.len(),
            });
        }
        if out.len() != self.dim {
            return Err(SamplerError::DimensionMismatch {
                expected: self.dim,
                actual: out.len(),
            });
        }
        for (row, value) in out.iter_mut().enumerate() {
            *value = (0..rank).map(|r| self.loadings[(row, r)] * z[r]).sum();
        }
        Ok(())
    }
}
