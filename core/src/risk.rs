//! Population risk scoring.
//!
//! This stage:
//!   1. Encodes every customer with the run's shared encoder
//!   2. Scores the whole population with the fitted classifier
//!   3. Buckets each probability into a three-tier risk segment
//!   4. Aggregates per segment and ranks the High Risk tail
//!
//! The scored population includes the rows the classifier was trained
//! on, so these are in-sample risk scores and read optimistic. They are
//! reported as such (`ScoredCustomer::in_sample`), not corrected.

use crate::{
    classifier::BinaryClassifier,
    config::RiskThresholds,
    customer::{Contract, CustomerRecord},
    encoding::CategoricalEncoder,
    error::{PipelineError, PipelineResult},
    types::{mean, CustomerId, Label},
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskSegment {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskSegment {
    pub const ALL: [RiskSegment; 3] = [Self::Low, Self::Medium, Self::High];

    /// Each tier includes its lower bound: [0, medium) Low,
    /// [medium, high) Medium, [high, 1] High.
    pub fn classify(probability: f64, t: &RiskThresholds) -> Self {
        if probability >= t.high {
            Self::High
        } else if probability >= t.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low    => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High   => "High Risk",
        }
    }
}

impl fmt::Display for RiskSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCustomer {
    pub customer_id:       CustomerId,
    pub tenure:            u32,
    pub monthly_charges:   f64,
    pub contract:          Contract,
    pub support_calls:     u32,
    pub churn:             Label,
    pub churn_probability: f64,
    pub risk_segment:      RiskSegment,
    /// True when the classifier saw this row during training.
    pub in_sample:         bool,
}

/// Score every customer. `training_rows` are the indices the classifier
/// was fitted on; they are flagged, not excluded.
pub fn score_population<C: BinaryClassifier>(
    customers: &[CustomerRecord],
    encoder: &CategoricalEncoder,
    classifier: &C,
    thresholds: &RiskThresholds,
    training_rows: &[usize],
) -> PipelineResult<Vec<ScoredCustomer>> {
    let encoded = encoder.encode_table(customers)?;
    let probabilities = classifier.predict_proba(&encoded.features)?;
    if probabilities.len() != customers.len() {
        return Err(PipelineError::DimensionMismatch {
            what: "scored rows",
            expected: customers.len(),
            actual: probabilities.len(),
        });
    }

    let mut trained = vec![false; customers.len()];
    for &i in training_rows {
        if let Some(flag) = trained.get_mut(i) {
            *flag = true;
        }
    }

    Ok(customers
        .iter()
        .zip(probabilities)
        .zip(trained)
        .map(|((c, p), in_sample)| ScoredCustomer {
            customer_id:       c.customer_id.clone(),
            tenure:            c.tenure,
            monthly_charges:   c.monthly_charges,
            contract:          c.contract,
            support_calls:     c.support_calls,
            churn:             c.churn,
            churn_probability: p,
            risk_segment:      RiskSegment::classify(p, thresholds),
            in_sample,
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub segment:              RiskSegment,
    pub customers:            usize,
    /// `None` for an empty segment.
    pub avg_churn_probability: Option<f64>,
    pub avg_monthly_charge:   Option<f64>,
    pub avg_tenure:           Option<f64>,
}

/// One row per segment, Low → High, including empty segments.
pub fn summarize_segments(scored: &[ScoredCustomer]) -> Vec<SegmentSummary> {
    RiskSegment::ALL
        .iter()
        .map(|&segment| {
            let members: Vec<&ScoredCustomer> =
                scored.iter().filter(|s| s.risk_segment == segment).collect();
            let avg = |f: fn(&ScoredCustomer) -> f64| {
                mean(&members.iter().map(|s| f(s)).collect::<Vec<_>>())
            };
            SegmentSummary {
                segment,
                customers:             members.len(),
                avg_churn_probability: avg(|s| s.churn_probability),
                avg_monthly_charge:    avg(|s| s.monthly_charges),
                avg_tenure:            avg(|s| f64::from(s.tenure)),
            }
        })
        .collect()
}

pub fn count_in_segment(scored: &[ScoredCustomer], segment: RiskSegment) -> usize {
    scored.iter().filter(|s| s.risk_segment == segment).count()
}

/// Export row for the at-risk list. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRiskCustomer {
    #[serde(rename = "CustomerID")]
    pub customer_id:       CustomerId,
    #[serde(rename = "Tenure")]
    pub tenure:            u32,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges:   f64,
    #[serde(rename = "Contract")]
    pub contract:          Contract,
    #[serde(rename = "SupportCalls")]
    pub support_calls:     u32,
    #[serde(rename = "ChurnProbability")]
    pub churn_probability: f64,
}

/// The `limit` highest-probability High Risk customers, descending.
/// Equal probabilities fall back to customer id order.
pub fn top_at_risk(scored: &[ScoredCustomer], limit: usize) -> Vec<AtRiskCustomer> {
    let mut high: Vec<&ScoredCustomer> = scored
        .iter()
        .filter(|s| s.risk_segment == RiskSegment::High)
        .collect();
    high.sort_by(|a, b| {
        b.churn_probability
            .partial_cmp(&a.churn_probability)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    high.into_iter()
        .take(limit)
        .map(|s| AtRiskCustomer {
            customer_id:       s.customer_id.clone(),
            tenure:            s.tenure,
            monthly_charges:   s.monthly_charges,
            contract:          s.contract,
            support_calls:     s.support_calls,
            churn_probability: s.churn_probability,
        })
        .collect()
}
