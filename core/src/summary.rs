//! Machine-readable run summary, written as `run_summary.json`.

use crate::{
    classifier::FeatureCoefficient,
    cohort::ChargeBucketRate,
    config::PipelineConfig,
    engine::PipelineOutcome,
    error::PipelineResult,
    event::EventLogEntry,
    impact::ImpactEstimate,
    logistic::FitReport,
    metrics::{ClassificationReport, ConfusionMatrix},
    model_selection::CrossValidation,
    risk::SegmentSummary,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at:     DateTime<Utc>,
    pub version:          String,
    pub config:           PipelineConfig,
    pub customers:        usize,
    pub churn_rate:       f64,
    pub train_size:       usize,
    pub test_size:        usize,
    pub accuracy:         f64,
    pub roc_auc:          f64,
    pub confusion:        ConfusionMatrix,
    pub report:           ClassificationReport,
    pub cross_validation: CrossValidation,
    pub fit_report:       FitReport,
    pub coefficients:     Vec<FeatureCoefficient>,
    pub intercept:        f64,
    pub charge_buckets:   Vec<ChargeBucketRate>,
    pub risk_segments:    Vec<SegmentSummary>,
    /// Risk scores were computed on rows that include the training set.
    pub in_sample_scores: bool,
    pub impact:           ImpactEstimate,
    pub events:           Vec<EventLogEntry>,
}

impl RunSummary {
    pub fn from_outcome(outcome: &PipelineOutcome, generated_at: DateTime<Utc>) -> Self {
        let eval = &outcome.evaluation;
        Self {
            generated_at,
            version:          env!("CARGO_PKG_VERSION").to_string(),
            config:           outcome.config.clone(),
            customers:        outcome.customers.len(),
            churn_rate:       outcome.eda.churn_rate,
            train_size:       outcome.split.train.len(),
            test_size:        outcome.split.test.len(),
            accuracy:         eval.accuracy,
            roc_auc:          eval.roc_auc,
            confusion:        eval.confusion,
            report:           eval.report.clone(),
            cross_validation: eval.cross_validation.clone(),
            fit_report:       *outcome.classifier.fit_report(),
            coefficients:     eval.coefficients.clone(),
            intercept:        outcome.classifier.intercept(),
            charge_buckets:   outcome.charge_buckets.clone(),
            risk_segments:    outcome.segments.clone(),
            in_sample_scores: outcome.scored.iter().any(|s| s.in_sample),
            impact:           outcome.impact.clone(),
            events:           outcome.events.clone(),
        }
    }

    pub fn to_json(&self) -> PipelineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
