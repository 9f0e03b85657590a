//! Train/test splitting and cross-validation.

use crate::{
    classifier::BinaryClassifier,
    error::{PipelineError, PipelineResult},
    features::{select, FeatureMatrix},
    metrics::accuracy,
    rng::StageRng,
    types::Label,
};
use serde::{Deserialize, Serialize};

/// Row indices of each partition. Every row appears in exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test:  Vec<usize>,
}

/// Stratified shuffle split: each class is shuffled independently and
/// `round(n_class * test_fraction)` of its rows go to the test partition,
/// so both partitions keep the overall positive rate.
pub fn stratified_split(
    labels: &[Label],
    test_fraction: f64,
    rng: &mut StageRng,
) -> PipelineResult<TrainTestSplit> {
    if labels.is_empty() {
        return Err(PipelineError::EmptyInput {
            what: "labels to split".into(),
        });
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for class in [0, 1] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        rng.shuffle(&mut members);
        let n_test = (members.len() as f64 * test_fraction).round() as usize;
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }
    // Interleave classes so partitions are not label-sorted.
    rng.shuffle(&mut train);
    rng.shuffle(&mut test);

    Ok(TrainTestSplit { train, test })
}

/// Stratified K-fold without shuffling: each class's rows, in table
/// order, are dealt into contiguous chunks, the first `len % k` chunks
/// one row larger.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    /// (train_indices, test_indices) for each fold.
    pub fn split(&self, labels: &[Label]) -> PipelineResult<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "StratifiedKFold needs at least 2 splits, got {}",
                self.n_splits
            )));
        }
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for class in [0, 1] {
            let members: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &l)| l == class)
                .map(|(i, _)| i)
                .collect();
            // Fewer members than folds would leave some test folds empty.
            if members.len() < self.n_splits {
                return Err(PipelineError::InvalidConfig(format!(
                    "StratifiedKFold with {} splits needs at least that many rows of class {class}, got {}",
                    self.n_splits,
                    members.len()
                )));
            }
            let size = members.len() / self.n_splits;
            let remainder = members.len() % self.n_splits;
            let mut start = 0;
            for (k, fold) in folds.iter_mut().enumerate() {
                let end = start + size + usize::from(k < remainder);
                fold.extend_from_slice(&members[start..end]);
                start = end;
            }
        }
        for fold in &mut folds {
            fold.sort_unstable();
        }

        Ok((0..self.n_splits)
            .map(|k| {
                let train = folds
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != k)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                (train, folds[k].clone())
            })
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidation {
    pub fold_scores: Vec<f64>,
    pub mean:        f64,
    /// Population standard deviation of the fold scores.
    pub std:         f64,
}

/// Accuracy of a freshly fitted model on every fold.
pub fn cross_validate_accuracy<C, F>(
    x: &FeatureMatrix,
    y: &[Label],
    folds: StratifiedKFold,
    fit: F,
) -> PipelineResult<CrossValidation>
where
    C: BinaryClassifier,
    F: Fn(&FeatureMatrix, &[Label]) -> PipelineResult<C>,
{
    let mut fold_scores = Vec::new();
    for (k, (train_idx, test_idx)) in folds.split(y)?.into_iter().enumerate() {
        let model = fit(&x.select_rows(&train_idx), &select(y, &train_idx))?;
        let predicted = model.predict(&x.select_rows(&test_idx))?;
        let score = accuracy(&predicted, &select(y, &test_idx));
        log::debug!("cv fold {k}: accuracy={score:.4}");
        fold_scores.push(score);
    }

    let n = fold_scores.len() as f64;
    let mean = fold_scores.iter().sum::<f64>() / n;
    let std = (fold_scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
    Ok(CrossValidation { fold_scores, mean, std })
}
