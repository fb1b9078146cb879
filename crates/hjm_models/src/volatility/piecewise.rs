//! Piecewise constant volatility.

use super::constant::{isolate, validate_levels};
use super::error::VolatilityError;

/// Relative slack when checking query intervals against the last break
/// point, so that accumulated timeline arithmetic does not trip the
/// extrapolation check.
const DOMAIN_SLACK: f64 = 1e-12;

/// Volatility constant on each segment `[t_k, t_{k+1})` of a timeline.
///
/// Every integral walks the segments overlapping the query interval and
/// accumulates the constant-level result per segment. Queries outside
/// `[t_0, t_n]` fail with [`VolatilityError::Extrapolation`].
///
/// # Example
///
/// ```
/// use hjm_models::volatility::VolatilityFunction;
///
/// let vol = VolatilityFunction::piecewise(
///     vec![0.0, 1.0, 3.0],
///     vec![vec![0.01], vec![0.02]],
/// )
/// .unwrap();
///
/// let integral = vol.integral(0.5, 1.0).unwrap();
/// assert!((integral[0] - (0.5 * 0.01 + 0.5 * 0.02)).abs() < 1e-15);
/// assert!(vol.integral(2.0, 2.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseConstantVol {
    breakpoints: Vec<f64>,
    levels: Vec<Vec<f64>>,
    /// Σ_i v_{k,i}² per segment k, computed at construction.
    sum_squares: Vec<f64>,
}

impl PiecewiseConstantVol {
    /// Construct from `n + 1` strictly increasing break points and `n` level
    /// rows of equal length.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for unsorted break points, a row count that does
    /// not match the segment count, ragged rows or non-finite levels.
    pub fn new(breakpoints: Vec<f64>, levels: Vec<Vec<f64>>) -> Result<Self, VolatilityError> {
        if breakpoints.len() < 2 {
            return Err(VolatilityError::InvalidParameter(
                "at least two break points are required".to_string(),
            ));
        }
        if breakpoints.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(VolatilityError::InvalidParameter(
                "break points must be strictly increasing".to_string(),
            ));
        }
        if levels.len() != breakpoints.len() - 1 {
            return Err(VolatilityError::InvalidParameter(format!(
                "{} level rows for {} segments",
                levels.len(),
                breakpoints.len() - 1
            )));
        }
        let factors = levels[0].len();
        for row in &levels {
            validate_levels(row)?;
            if row.len() != factors {
                return Err(VolatilityError::InvalidParameter(format!(
                    "segment with {} factors, expected {}",
                    row.len(),
                    factors
                )));
            }
        }

        let sum_squares = levels
            .iter()
            .map(|row| row.iter().map(|v| v * v).sum())
            .collect();
        Ok(Self {
            breakpoints,
            levels,
            sum_squares,
        })
    }

    /// Break points `t_0 < … < t_n`.
    #[inline]
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    /// Level rows, one per segment.
    #[inline]
    pub fn levels(&self) -> &[Vec<f64>] {
        &self.levels
    }

    /// Number of factors.
    #[inline]
    pub fn factors(&self) -> usize {
        self.levels[0].len()
    }

    /// First break point.
    #[inline]
    pub fn start(&self) -> f64 {
        self.breakpoints[0]
    }

    /// Last break point.
    #[inline]
    pub fn end(&self) -> f64 {
        self.breakpoints[self.breakpoints.len() - 1]
    }

    fn extrapolation(&self, t: f64) -> VolatilityError {
        VolatilityError::Extrapolation {
            t,
            start: self.start(),
            end: self.end(),
        }
    }

    fn check_range(&self, from: f64, to: f64) -> Result<(), VolatilityError> {
        let slack = DOMAIN_SLACK * self.end().abs().max(1.0);
        if from < self.start() - slack {
            return Err(self.extrapolation(from));
        }
        if to > self.end() + slack {
            return Err(self.extrapolation(to));
        }
        Ok(())
    }

    /// Segment containing `s` (right-continuous; `t_n` maps to the last).
    fn segment_index(&self, s: f64) -> usize {
        let n = self.levels.len();
        self.breakpoints
            .partition_point(|&b| b <= s)
            .saturating_sub(1)
            .min(n - 1)
    }

    /// Segments overlapping `[from, to]` as `(index, overlap length)`.
    fn overlaps(&self, from: f64, to: f64) -> Result<Vec<(usize, f64, f64)>, VolatilityError> {
        self.check_range(from, to)?;
        let to = to.min(self.end());
        let from = from.max(self.start());
        if to <= from {
            return Ok(Vec::new());
        }
        let first = self.segment_index(from);
        let mut pieces = Vec::new();
        for k in first..self.levels.len() {
            let lo = self.breakpoints[k].max(from);
            let hi = self.breakpoints[k + 1].min(to);
            if hi > lo {
                pieces.push((k, lo, hi));
            }
            if self.breakpoints[k + 1] >= to {
                break;
            }
        }
        Ok(pieces)
    }

    /// Level row in force at time `s`.
    pub fn level_at(&self, s: f64) -> Result<&[f64], VolatilityError> {
        self.check_range(s, s)?;
        Ok(&self.levels[self.segment_index(s)])
    }

    /// Cached Σ_i v_i² of segment `k`.
    #[inline]
    pub fn sum_squares(&self, k: usize) -> f64 {
        self.sum_squares[k]
    }

    pub(crate) fn integral(&self, t: f64, dt: f64) -> Result<Vec<f64>, VolatilityError> {
        let mut total = vec![0.0; self.factors()];
        for (k, lo, hi) in self.overlaps(t, t + dt)? {
            for (acc, v) in total.iter_mut().zip(&self.levels[k]) {
                *acc += v * (hi - lo);
            }
        }
        Ok(total)
    }

    pub(crate) fn forward_rate_variance(
        &self,
        t: f64,
        maturity: f64,
    ) -> Result<Vec<f64>, VolatilityError> {
        let mut total = vec![0.0; self.factors()];
        for (k, lo, hi) in self.overlaps(t, maturity)? {
            for (acc, v) in total.iter_mut().zip(&self.levels[k]) {
                *acc += v * v * (hi - lo);
            }
        }
        Ok(total)
    }

    pub(crate) fn maturity_loading(&self, t1: f64, t2: f64) -> Vec<f64> {
        vec![t2 - t1; self.factors()]
    }

    /// ```text
    /// ln A(t,T) = -½ (T - t) Σ_k S_k [(T + t)(s1 - s0) - (s1² - s0²)]
    /// ```
    /// over the segments `[s0, s1]` covering `[0, t]`.
    pub(crate) fn a(&self, t: f64, maturity: f64) -> Result<f64, VolatilityError> {
        let mut exponent = 0.0;
        for (k, s0, s1) in self.overlaps(0.0, t)? {
            exponent +=
                self.sum_squares[k] * ((maturity + t) * (s1 - s0) - (s1 * s1 - s0 * s0));
        }
        Ok((-0.5 * (maturity - t) * exponent).exp())
    }

    pub(crate) fn b(&self, t: f64, maturity: f64) -> Vec<f64> {
        vec![maturity - t; self.factors()]
    }

    pub(crate) fn var(&self, i: usize, t: f64, dt: f64) -> Result<f64, VolatilityError> {
        Ok(self
            .overlaps(t, t + dt)?
            .into_iter()
            .map(|(k, lo, hi)| self.levels[k][i] * self.levels[k][i] * (hi - lo))
            .sum())
    }

    pub(crate) fn covar_dw(&self, i: usize, t: f64, dt: f64) -> Result<f64, VolatilityError> {
        Ok(self
            .overlaps(t, t + dt)?
            .into_iter()
            .map(|(k, lo, hi)| self.levels[k][i] * (hi - lo))
            .sum())
    }

    /// Level row if `[t, maturity]` lies inside a single segment.
    pub(crate) fn constant_level(&self, t: f64, maturity: f64) -> Option<Vec<f64>> {
        match self.overlaps(t, maturity) {
            Ok(pieces) if pieces.len() == 1 => Some(self.levels[pieces[0].0].clone()),
            Ok(pieces) if pieces.is_empty() => self.level_at(t).ok().map(<[f64]>::to_vec),
            _ => None,
        }
    }

    pub(crate) fn segments(&self, t: f64, dt: f64) -> Result<Vec<f64>, VolatilityError> {
        let end = t + dt;
        self.check_range(t, end)?;
        let mut points = vec![t];
        points.extend(self.breakpoints.iter().copied().filter(|&b| b > t && b < end));
        points.push(end);
        Ok(points)
    }

    pub(crate) fn component(&self, i: usize) -> Self {
        let levels: Vec<Vec<f64>> = self.levels.iter().map(|row| isolate(row, i)).collect();
        let sum_squares = levels.iter().map(|row| row[i] * row[i]).collect();
        Self {
            breakpoints: self.breakpoints.clone(),
            levels,
            sum_squares,
        }
    }

    /// Blend with another piecewise function: `(1 - w)·self + w·other`.
    ///
    /// The result lives on the merged break points. Segments covered by
    /// only one operand pass through unchanged; a gap covered by neither is
    /// an extrapolation error.
    ///
    /// # Errors
    ///
    /// * `FactorMismatch` - different factor counts
    /// * `Extrapolation` - the two domains are disjoint with a gap between
    pub fn interpolate(&self, other: &Self, w: f64) -> Result<Self, VolatilityError> {
        if self.factors() != other.factors() {
            return Err(VolatilityError::FactorMismatch {
                lhs: self.factors(),
                rhs: other.factors(),
            });
        }

        let mut points: Vec<f64> = self
            .breakpoints
            .iter()
            .chain(&other.breakpoints)
            .copied()
            .collect();
        points.sort_by(f64::total_cmp);
        points.dedup();

        let covers = |f: &Self, lo: f64, hi: f64| lo >= f.start() && hi <= f.end();
        let mut levels = Vec::with_capacity(points.len() - 1);
        for piece in points.windows(2) {
            let (lo, hi) = (piece[0], piece[1]);
            let mid = 0.5 * (lo + hi);
            let row = match (covers(self, lo, hi), covers(other, lo, hi)) {
                (true, true) => self.levels[self.segment_index(mid)]
                    .iter()
                    .zip(&other.levels[other.segment_index(mid)])
                    .map(|(v1, v2)| (1.0 - w) * v1 + w * v2)
                    .collect(),
                (true, false) => self.levels[self.segment_index(mid)].clone(),
                (false, true) => other.levels[other.segment_index(mid)].clone(),
                (false, false) => {
                    return Err(VolatilityError::Extrapolation {
                        t: lo,
                        start: self.start().min(other.start()),
                        end: self.end().max(other.end()),
                    })
                }
            };
            levels.push(row);
        }

        Self::new(points, levels)
    }
}
