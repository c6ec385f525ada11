//! Analytic Hierarchy Process: pairwise comparisons to criterion weights.

use tracing::warn;

use crate::criteria::CRITERIA;
use crate::error::{EngineError, Result};

/// Relative tolerance on `m[i][j] * m[j][i] == 1` when loading a whole
/// matrix; seed matrices are usually typed with three decimals (0.333).
const RECIPROCAL_TOL: f64 = 5e-3;

/// Square comparison matrix with a unit diagonal and reciprocal off-diagonal cells.
///
/// Cells are `None` while unset. The only mutator is `set`, which writes a
/// cell and its mirror together, so the reciprocal invariant never lapses.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseMatrix {
    cells: [[Option<f64>; CRITERIA]; CRITERIA],
}

impl Default for PairwiseMatrix {
    fn default() -> Self { Self::identity() }
}

fn check_value(i: usize, j: usize, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::InvalidMatrix(format!("cell ({i}, {j}) must be positive and finite, got {value}")));
    }
    Ok(())
}

impl PairwiseMatrix {
    /// All criteria equally important.
    pub fn identity() -> Self {
        Self { cells: [[Some(1.0); CRITERIA]; CRITERIA] }
    }

    /// Load a complete matrix, checking the diagonal and reciprocal invariants.
    pub fn from_rows(rows: [[f64; CRITERIA]; CRITERIA]) -> Result<Self> {
        for i in 0..CRITERIA {
            if rows[i][i] != 1.0 {
                return Err(EngineError::InvalidMatrix(format!("diagonal cell ({i}, {i}) is {}, expected 1", rows[i][i])));
            }
            for j in 0..CRITERIA {
                check_value(i, j, rows[i][j])?;
                let product = rows[i][j] * rows[j][i];
                if (product - 1.0).abs() > RECIPROCAL_TOL {
                    return Err(EngineError::InvalidMatrix(format!(
                        "cells ({i}, {j}) = {} and ({j}, {i}) = {} are not reciprocal", rows[i][j], rows[j][i],
                    )));
                }
            }
        }
        Ok(Self { cells: rows.map(|row| row.map(Some)) })
    }

    #[inline] pub fn get(&self, i: usize, j: usize) -> Option<f64> { self.cells[i][j] }

    /// Set cell `(i, j)` and its mirror `(j, i)` in one step.
    ///
    /// Diagonal cells stay 1 whatever is passed. `None` clears both cells.
    /// Zero, negative and non-finite values are rejected and leave the matrix untouched.
    pub fn set(&mut self, i: usize, j: usize, value: Option<f64>) -> Result<()> {
        if i >= CRITERIA || j >= CRITERIA {
            return Err(EngineError::InvalidMatrix(format!("cell ({i}, {j}) is outside the {CRITERIA}x{CRITERIA} matrix")));
        }
        if i == j {
            self.cells[i][i] = Some(1.0);
            return Ok(());
        }

        let (forward, mirror) = match value {
            Some(v) => {
                check_value(i, j, v).inspect_err(|e| warn!("rejected pairwise edit: {e}"))?;
                (Some(v), Some(1.0 / v))
            }
            None => (None, None),
        };
        self.cells[i][j] = forward;
        self.cells[j][i] = mirror;
        Ok(())
    }

    /// True if every cell holds a value.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// Row-major copy of the matrix, unset cells as `None`.
    pub fn rows(&self) -> [[Option<f64>; CRITERIA]; CRITERIA] { self.cells }
}

/// Non-negative criterion weights summing to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightVector([f64; CRITERIA]);

impl WeightVector {
    /// Wrap raw weights, which must be non-negative and sum to 1 within 1e-3.
    pub fn new(weights: [f64; CRITERIA]) -> Result<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::InvalidMatrix(format!("weights must be non-negative and finite: {weights:?}")));
        }
        let sum = weights.iter().sum::<f64>();
        if (sum - 1.0).abs() > 1e-3 {
            return Err(EngineError::InvalidMatrix(format!("weights sum to {sum}, expected 1")));
        }
        Ok(Self(weights))
    }

    /// Equal weight for every criterion.
    pub fn uniform() -> Self { Self([1.0 / CRITERIA as f64; CRITERIA]) }

    #[inline] pub fn as_array(&self) -> &[f64; CRITERIA] { &self.0 }

    #[inline] pub fn get(&self, i: usize) -> f64 { self.0[i] }

    #[inline] pub fn sum(&self) -> f64 { self.0.iter().sum() }

    /// Weights rounded to `decimals` places, as shown in the weight table.
    pub fn rounded(&self, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        Self(self.0.map(|w| (w * scale).round() / scale))
    }
}

/// Geometric-mean priority vector of a complete pairwise matrix.
///
/// Incomplete matrices are rejected rather than treating unset cells as 0,
/// which would silently zero that criterion's weight.
pub fn compute_weights(matrix: &PairwiseMatrix) -> Result<WeightVector> {
    let mut means = [0.0; CRITERIA];
    for (i, mean) in means.iter_mut().enumerate() {
        let mut product = 1.0;
        for j in 0..CRITERIA {
            let value = matrix.get(i, j)
                .ok_or_else(|| EngineError::InvalidMatrix(format!("cell ({i}, {j}) is unset")))?;
            check_value(i, j, value)?;
            product *= value;
        }
        *mean = product.powf(1.0 / CRITERIA as f64);
    }

    let total = means.iter().sum::<f64>();
    Ok(WeightVector(means.map(|m| m / total)))
}
