//! Shared primitive types used across the entire pipeline.

/// A stable, unique customer identifier (`CUST-NNNNN`).
pub type CustomerId = String;

/// A binary outcome label. 1 = churned, 0 = retained.
pub type Label = u8;

/// Human-readable class names, indexed by label.
pub const CLASS_NAMES: [&str; 2] = ["Retained", "Churned"];

/// Round to two decimal places (currency amounts).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean; `None` for an empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Fraction of positive labels; 0.0 for an empty input.
pub fn positive_rate(labels: &[Label]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    labels.iter().filter(|&&l| l == 1).count() as f64 / labels.len() as f64
}
