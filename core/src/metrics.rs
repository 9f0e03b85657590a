//! Binary classification metrics.

use crate::types::{Label, CLASS_NAMES};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Fraction of predictions equal to the truth. 0.0 for empty input.
pub fn accuracy(predicted: &[Label], truth: &[Label]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    correct as f64 / truth.len() as f64
}

/// Rows are the true class, columns the predicted class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative:  usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive:  usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(predicted: &[Label], truth: &[Label]) -> Self {
        let mut cm = ConfusionMatrix {
            true_negative:  0,
            false_positive: 0,
            false_negative: 0,
            true_positive:  0,
        };
        for (&p, &t) in predicted.iter().zip(truth) {
            match (t, p) {
                (0, 0) => cm.true_negative += 1,
                (0, _) => cm.false_positive += 1,
                (_, 0) => cm.false_negative += 1,
                _      => cm.true_positive += 1,
            }
        }
        cm
    }

    /// `[[tn, fp], [fn, tp]]`.
    pub fn as_grid(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negative, self.false_positive],
            [self.false_negative, self.true_positive],
        ]
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }
}

/// Area under the ROC curve via the rank-sum statistic.
/// Tied scores share their average rank. Returns 0.5 if either class
/// is absent.
pub fn roc_auc(scores: &[f64], truth: &[Label]) -> f64 {
    let n_pos = truth.iter().filter(|&&t| t == 1).count();
    let n_neg = truth.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // Ranks are 1-based; the tie group i..=j shares the mean.
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            ranks[k] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = truth
        .iter()
        .zip(&ranks)
        .filter(|&(&t, _)| t == 1)
        .map(|(_, r)| r)
        .sum();
    let n_pos = n_pos as f64;
    (pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub false_positive_rate: f64,
    pub true_positive_rate:  f64,
    /// Scores >= threshold are called positive at this point.
    pub threshold:           f64,
}

/// ROC curve points from (0, 0) to (1, 1), one per distinct score.
pub fn roc_curve(scores: &[f64], truth: &[Label]) -> Vec<RocPoint> {
    let n_pos = truth.iter().filter(|&&t| t == 1).count().max(1) as f64;
    let n_neg = truth.iter().filter(|&&t| t == 0).count().max(1) as f64;

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut points = vec![RocPoint {
        false_positive_rate: 0.0,
        true_positive_rate:  0.0,
        threshold:           f64::INFINITY,
    }];
    let (mut tp, mut fp) = (0usize, 0usize);
    for (k, &idx) in order.iter().enumerate() {
        if truth[idx] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_tie = order
            .get(k + 1)
            .map_or(true, |&next| scores[next] != scores[idx]);
        if last_of_tie {
            points.push(RocPoint {
                false_positive_rate: fp as f64 / n_neg,
                true_positive_rate:  tp as f64 / n_pos,
                threshold:           scores[idx],
            });
        }
    }
    points
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

/// Per-class precision / recall / F1 with macro and weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Indexed by label.
    pub classes:      [ClassMetrics; 2],
    pub accuracy:     f64,
    pub macro_avg:    ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn new(predicted: &[Label], truth: &[Label]) -> Self {
        let cm = ConfusionMatrix::from_predictions(predicted, truth);
        let grid = cm.as_grid();
        let classes = [0usize, 1].map(|c| {
            let other = 1 - c;
            let tp = grid[c][c] as f64;
            let predicted_c = tp + grid[other][c] as f64;
            let actual_c = tp + grid[c][other] as f64;
            let precision = ratio(tp, predicted_c);
            let recall = ratio(tp, actual_c);
            ClassMetrics {
                precision,
                recall,
                f1: ratio(2.0 * precision * recall, precision + recall),
                support: actual_c as usize,
            }
        });

        let total = classes[0].support + classes[1].support;
        let macro_avg = ClassMetrics {
            precision: (classes[0].precision + classes[1].precision) / 2.0,
            recall:    (classes[0].recall + classes[1].recall) / 2.0,
            f1:        (classes[0].f1 + classes[1].f1) / 2.0,
            support:   total,
        };
        let weighted = |f: fn(&ClassMetrics) -> f64| {
            ratio(
                classes.iter().map(|m| f(m) * m.support as f64).sum(),
                total as f64,
            )
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall:    weighted(|m| m.recall),
            f1:        weighted(|m| m.f1),
            support:   total,
        };

        Self {
            classes,
            accuracy: accuracy(predicted, truth),
            macro_avg,
            weighted_avg,
        }
    }

    /// Fixed-width text table.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:>14} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support");
        let _ = writeln!(out);
        for (name, m) in CLASS_NAMES.iter().zip(&self.classes) {
            let _ = writeln!(out, "{name:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}", m.precision, m.recall, m.f1, m.support);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{:>14} {:>10} {:>10} {:>10.2} {:>10}", "accuracy", "", "", self.accuracy, self.macro_avg.support);
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            let _ = writeln!(out, "{name:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}", m.precision, m.recall, m.f1, m.support);
        }
        out
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}
