//! Values reported along one simulated path.

use nalgebra::DMatrix;

/// Reportables and numeraire along one path.
///
/// `values` is `reportables × timeline points`; row `r` holds the
/// reportable registered under index `r`. The numeraire is in domestic
/// currency.
#[derive(Debug, Clone)]
pub struct PathValues {
    values: DMatrix<f64>,
    numeraire: Vec<f64>,
}

impl PathValues {
    /// Zeroed buffers for `reportables` quantities over `points` timeline
    /// points.
    pub fn new(reportables: usize, points: usize) -> Self {
        Self {
            values: DMatrix::zeros(reportables, points),
            numeraire: vec![0.0; points],
        }
    }

    /// Number of timeline points.
    #[inline]
    pub fn points(&self) -> usize {
        self.numeraire.len()
    }

    /// Number of reportables.
    #[inline]
    pub fn reportables(&self) -> usize {
        self.values.nrows()
    }

    /// Value of reportable `index` at timeline point `point`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn value(&self, index: usize, point: usize) -> f64 {
        self.values[(index, point)]
    }

    /// Value of reportable `index` at the horizon.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or the buffers are empty.
    #[inline]
    pub fn terminal(&self, index: usize) -> f64 {
        self.values[(index, self.points() - 1)]
    }

    /// Numeraire at timeline point `point`.
    #[inline]
    pub fn numeraire(&self, point: usize) -> f64 {
        self.numeraire[point]
    }

    /// Numeraire at the horizon.
    #[inline]
    pub fn terminal_numeraire(&self) -> f64 {
        self.numeraire[self.points() - 1]
    }

    /// All reported values.
    #[inline]
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Numeraire at every timeline point.
    #[inline]
    pub fn numeraire_values(&self) -> &[f64] {
        &self.numeraire
    }

    pub(crate) fn ensure_shape(&mut self, reportables: usize, points: usize) {
        if self.values.shape() != (reportables, points) {
            self.values = DMatrix::zeros(reportables, points);
        }
        if self.numeraire.len() != points {
            self.numeraire = vec![0.0; points];
        }
    }

    pub(crate) fn buffers_mut(&mut self) -> (&mut DMatrix<f64>, &mut [f64]) {
        (&mut self.values, &mut self.numeraire)
    }
}
