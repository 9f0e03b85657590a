//! Binary logistic regression fitted by batch gradient descent.
//!
//! Objective (per unit of sample weight):
//!
//!   L(w, b) = (1/W) Σ s_i · logloss(y_i, σ(w·x_i + b)) + ||w||² / (2·C·W)
//!
//! which has the same minimizer as the usual C-scaled form. The intercept
//! is not penalized. The solver runs at most `max_iter` steps and keeps
//! the lowest-loss iterate, so hitting the cap degrades to "best so far"
//! rather than an error.

use crate::{
    config::{ClassWeight, ModelConfig},
    error::{PipelineError, PipelineResult},
    features::FeatureMatrix,
    types::Label,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept:    f64,
}

/// How the solver finished.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub iterations: usize,
    pub converged:  bool,
    pub final_loss: f64,
}

impl LogisticModel {
    pub fn decision(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    /// P(y = 1) for every row.
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Vec<f64> {
        x.rows().map(|row| sigmoid(self.decision(row))).collect()
    }

    /// Fit on `x` / `y`. Both classes must be present.
    pub fn fit(
        x: &FeatureMatrix,
        y: &[Label],
        config: &ModelConfig,
    ) -> PipelineResult<(Self, FitReport)> {
        let n = x.n_rows();
        let d = x.n_cols();
        if n == 0 {
            return Err(PipelineError::EmptyInput {
                what: "logistic regression training set".into(),
            });
        }
        if y.len() != n {
            return Err(PipelineError::DimensionMismatch {
                what: "labels",
                expected: n,
                actual: y.len(),
            });
        }

        let weights = sample_weights(y, config.class_weight)?;
        let total_weight: f64 = weights.iter().sum();
        let l2 = 1.0 / (config.c * total_weight);

        let mut model = LogisticModel {
            coefficients: vec![0.0; d],
            intercept:    0.0,
        };
        let mut best = model.clone();
        let mut best_loss = f64::INFINITY;
        let mut converged = false;
        let mut iterations = 0;

        for iter in 0..config.max_iter {
            iterations = iter + 1;

            let mut grad_w = vec![0.0; d];
            let mut grad_b = 0.0;
            let mut loss = 0.0;
            for (i, row) in x.rows().enumerate() {
                let z = model.decision(row);
                let label = f64::from(y[i]);
                loss += weights[i] * (softplus(z) - label * z);
                let err = weights[i] * (sigmoid(z) - label);
                grad_b += err;
                for (g, xv) in grad_w.iter_mut().zip(row) {
                    *g += err * xv;
                }
            }
            let penalty: f64 = model.coefficients.iter().map(|w| w * w).sum();
            loss = loss / total_weight + 0.5 * l2 * penalty;

            grad_b /= total_weight;
            for (g, w) in grad_w.iter_mut().zip(&model.coefficients) {
                *g = *g / total_weight + l2 * w;
            }

            if loss < best_loss {
                best_loss = loss;
                best = model.clone();
            }

            let max_grad = grad_w.iter().fold(grad_b.abs(), |m, g| m.max(g.abs()));
            if max_grad < config.tolerance {
                converged = true;
                break;
            }

            model.intercept -= config.learning_rate * grad_b;
            for (w, g) in model.coefficients.iter_mut().zip(&grad_w) {
                *w -= config.learning_rate * g;
            }
        }

        if !converged {
            log::warn!(
                "logistic regression did not converge in {} iterations; keeping best iterate (loss={best_loss:.6})",
                config.max_iter
            );
        }

        Ok((
            best,
            FitReport {
                iterations,
                converged,
                final_loss: best_loss,
            },
        ))
    }
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// ln(1 + e^z) without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn sample_weights(y: &[Label], scheme: ClassWeight) -> PipelineResult<Vec<f64>> {
    let n = y.len() as f64;
    let positives = y.iter().filter(|&&l| l == 1).count();
    let negatives = y.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(PipelineError::SingleClass {
            present: u8::from(positives > 0),
        });
    }
    Ok(match scheme {
        ClassWeight::Uniform => vec![1.0; y.len()],
        ClassWeight::Balanced => {
            let w_pos = n / (2.0 * positives as f64);
            let w_neg = n / (2.0 * negatives as f64);
            y.iter().map(|&l| if l == 1 { w_pos } else { w_neg }).collect()
        }
    })
}
