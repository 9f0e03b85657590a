//! Dense row-major feature matrix.

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_cols: usize,
    data:   Vec<f64>,
}

impl FeatureMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> PipelineResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(PipelineError::DimensionMismatch {
                    what: "columns",
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self { n_rows, n_cols, data })
    }

    pub fn n_rows(&self) -> usize { self.n_rows }
    pub fn n_cols(&self) -> usize { self.n_cols }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols + col]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_rows).map(move |i| self.get(i, col))
    }

    /// Copy the given rows, in the given order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.n_cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            n_rows: indices.len(),
            n_cols: self.n_cols,
            data,
        }
    }

    /// Apply `f(col, value)` to every cell.
    pub fn map_columns(&self, f: impl Fn(usize, f64) -> f64) -> Self {
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(k, &v)| f(k % self.n_cols.max(1), v))
            .collect();
        Self {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            data,
        }
    }
}

/// Gather `values[i]` for each index.
pub fn select<T: Copy>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i]).collect()
}
