use crate::{
    error::{PipelineError, PipelineResult},
    features::FeatureMatrix,
};
use serde::{Deserialize, Serialize};

/// Per-column standardization learned from one matrix and reapplied to
/// others. Zero-variance columns are centered but not scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean:  Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &FeatureMatrix) -> PipelineResult<Self> {
        if x.n_rows() == 0 {
            return Err(PipelineError::EmptyInput {
                what: "scaler fit matrix".into(),
            });
        }
        let n = x.n_rows() as f64;
        let mut mean = Vec::with_capacity(x.n_cols());
        let mut scale = Vec::with_capacity(x.n_cols());
        for j in 0..x.n_cols() {
            let m = x.column(j).sum::<f64>() / n;
            let var = x.column(j).map(|v| (v - m).powi(2)).sum::<f64>() / n;
            let sd = var.sqrt();
            mean.push(m);
            scale.push(if sd > f64::EPSILON { sd } else { 1.0 });
        }
        Ok(Self { mean, scale })
    }

    pub fn transform(&self, x: &FeatureMatrix) -> PipelineResult<FeatureMatrix> {
        if x.n_cols() != self.mean.len() {
            return Err(PipelineError::DimensionMismatch {
                what: "scaler columns",
                expected: self.mean.len(),
                actual: x.n_cols(),
            });
        }
        Ok(x.map_columns(|j, v| (v - self.mean[j]) / self.scale[j]))
    }

    pub fn mean(&self) -> &[f64] { &self.mean }
    pub fn scale(&self) -> &[f64] { &self.scale }
}
