//! Descriptive statistics over the generated table.
//!
//! Read-only: nothing computed here feeds later stages. The runner
//! renders the EDA chart grid from an `EdaReport`.

use crate::{
    customer::CustomerRecord,
    error::{PipelineError, PipelineResult},
    types::Label,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TENURE_HISTOGRAM_BINS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub count:  usize,
    pub mean:   f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std:    f64,
    pub min:    f64,
    pub max:    f64,
}

impl ColumnStats {
    fn of(column: &str, values: &[f64]) -> Self {
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        Self {
            column: column.to_string(),
            count: n,
            mean,
            std,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Churn rate of one group of a categorical or discrete column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRate {
    pub group:      String,
    pub customers:  usize,
    pub churned:    usize,
    pub churn_rate: f64,
}

/// Equal-width histogram over a shared range, counted per outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitHistogram {
    /// `bins + 1` edges.
    pub edges:    Vec<f64>,
    pub retained: Vec<usize>,
    pub churned:  Vec<usize>,
}

/// Box-plot summary with 1.5 × IQR whiskers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1:            f64,
    pub median:        f64,
    pub q3:            f64,
    pub upper_whisker: f64,
    pub outliers:      Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdaReport {
    pub rows:             usize,
    pub columns:          usize,
    pub retained:         usize,
    pub churned:          usize,
    pub churn_rate:       f64,
    pub column_stats:     Vec<ColumnStats>,
    pub by_contract:      Vec<GroupRate>,
    pub by_num_products:  Vec<GroupRate>,
    pub by_support_calls: Vec<GroupRate>,
    pub tenure_histogram: SplitHistogram,
    /// Indexed by label.
    pub charges_box:      [BoxSummary; 2],
    /// Leading rows of the table, for the console preview.
    pub preview:          Vec<CustomerRecord>,
}

/// Numeric columns of the base table, in CSV order.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "Tenure",
    "MonthlyCharges",
    "TotalCharges",
    "NumProducts",
    "SupportCalls",
    "SeniorCitizen",
    "Partner",
    "Churn",
];

/// Number of CSV columns in the base table.
pub const BASE_COLUMN_COUNT: usize = 12;

fn numeric_value(c: &CustomerRecord, column: &str) -> f64 {
    match column {
        "Tenure"         => f64::from(c.tenure),
        "MonthlyCharges" => c.monthly_charges,
        "TotalCharges"   => c.total_charges,
        "NumProducts"    => f64::from(c.num_products),
        "SupportCalls"   => f64::from(c.support_calls),
        "SeniorCitizen"  => f64::from(c.senior_citizen),
        "Partner"        => f64::from(c.partner),
        _                => f64::from(c.churn),
    }
}

pub fn describe(customers: &[CustomerRecord], preview_rows: usize) -> PipelineResult<EdaReport> {
    if customers.is_empty() {
        return Err(PipelineError::EmptyInput {
            what: "table to describe".into(),
        });
    }
    let churned = customers.iter().filter(|c| c.churned()).count();

    let column_stats = NUMERIC_COLUMNS
        .iter()
        .map(|&col| {
            let values: Vec<f64> = customers.iter().map(|c| numeric_value(c, col)).collect();
            ColumnStats::of(col, &values)
        })
        .collect();

    let charges_by = |label: Label| -> Vec<f64> {
        customers
            .iter()
            .filter(|c| c.churn == label)
            .map(|c| c.monthly_charges)
            .collect()
    };

    Ok(EdaReport {
        rows: customers.len(),
        columns: BASE_COLUMN_COUNT,
        retained: customers.len() - churned,
        churned,
        churn_rate: churned as f64 / customers.len() as f64,
        column_stats,
        by_contract: group_rates(customers, |c| c.contract.label().to_string()),
        by_num_products: group_rates(customers, |c| c.num_products),
        by_support_calls: group_rates(customers, |c| c.support_calls),
        tenure_histogram: split_histogram(
            customers,
            |c| f64::from(c.tenure),
            TENURE_HISTOGRAM_BINS,
        ),
        charges_box: [box_summary(&charges_by(0)), box_summary(&charges_by(1))],
        preview: customers.iter().take(preview_rows).cloned().collect(),
    })
}

/// Churn rate per distinct key, in key order.
pub fn group_rates<K, F>(customers: &[CustomerRecord], key: F) -> Vec<GroupRate>
where
    K: Ord + ToString,
    F: Fn(&CustomerRecord) -> K,
{
    let mut groups: BTreeMap<K, (usize, usize)> = BTreeMap::new();
    for c in customers {
        let entry = groups.entry(key(c)).or_default();
        entry.0 += 1;
        entry.1 += usize::from(c.churned());
    }
    groups
        .into_iter()
        .map(|(k, (n, churned))| GroupRate {
            group: k.to_string(),
            customers: n,
            churned,
            churn_rate: churned as f64 / n as f64,
        })
        .collect()
}

pub fn split_histogram<F>(customers: &[CustomerRecord], value: F, bins: usize) -> SplitHistogram
where
    F: Fn(&CustomerRecord) -> f64,
{
    let bins = bins.max(1);
    let values: Vec<f64> = customers.iter().map(&value).collect();
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };
    let edges = (0..=bins).map(|k| lo + width * k as f64).collect();

    let mut retained = vec![0; bins];
    let mut churned = vec![0; bins];
    for (c, v) in customers.iter().zip(&values) {
        // The last bin is closed on the right.
        let bin = (((v - lo) / width) as usize).min(bins - 1);
        if c.churned() {
            churned[bin] += 1;
        } else {
            retained[bin] += 1;
        }
    }
    SplitHistogram { edges, retained, churned }
}

/// Linear-interpolated quantile of sorted data, `q` in [0, 1].
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn box_summary(values: &[f64]) -> BoxSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    BoxSummary {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    }
}
