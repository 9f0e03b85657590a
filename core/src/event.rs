//! The pipeline event log.
//!
//! Each stage appends exactly one event when it completes. The log is
//! the run's audit trail and is written into `run_summary.json`.

use serde::{Deserialize, Serialize};

/// Every event a pipeline run can emit, in stage order.
/// Variants are appended only, never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunInitialized {
        seed:      u64,
        customers: usize,
    },
    DatasetGenerated {
        rows:       usize,
        churned:    usize,
        churn_rate: f64,
    },
    EdaCompleted {
        numeric_columns: usize,
    },
    FeaturesEncoded {
        features:   usize,
        categories: usize,
    },
    SplitCompleted {
        train:            usize,
        test:             usize,
        train_churn_rate: f64,
        test_churn_rate:  f64,
    },
    ModelFitted {
        iterations: usize,
        converged:  bool,
        final_loss: f64,
    },
    ModelEvaluated {
        accuracy: f64,
        roc_auc:  f64,
    },
    CrossValidated {
        folds: usize,
        mean:  f64,
        std:   f64,
    },
    CohortsComputed {
        cells: usize,
    },
    PopulationScored {
        low:    usize,
        medium: usize,
        high:   usize,
    },
    ImpactEstimated {
        saved_customers:      usize,
        annual_revenue_saved: f64,
    },
}

impl PipelineEvent {
    /// Stable snake_case name, matching the serialized `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }   => "run_initialized",
            Self::DatasetGenerated { .. } => "dataset_generated",
            Self::EdaCompleted { .. }     => "eda_completed",
            Self::FeaturesEncoded { .. }  => "features_encoded",
            Self::SplitCompleted { .. }   => "split_completed",
            Self::ModelFitted { .. }      => "model_fitted",
            Self::ModelEvaluated { .. }   => "model_evaluated",
            Self::CrossValidated { .. }   => "cross_validated",
            Self::CohortsComputed { .. }  => "cohorts_computed",
            Self::PopulationScored { .. } => "population_scored",
            Self::ImpactEstimated { .. }  => "impact_estimated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub seq:   usize,
    pub stage: String,
    pub event: PipelineEvent,
}
