//! The churn classifier: standard scaling followed by logistic regression.

use crate::{
    config::ModelConfig,
    encoding::FEATURE_NAMES,
    error::PipelineResult,
    features::FeatureMatrix,
    logistic::{FitReport, LogisticModel},
    metrics::{accuracy, roc_auc, roc_curve, ClassificationReport, ConfusionMatrix, RocPoint},
    model_selection::CrossValidation,
    scaler::StandardScaler,
    types::Label,
};
use serde::{Deserialize, Serialize};

/// The contract every fitted binary model fulfills.
pub trait BinaryClassifier {
    /// P(churn) for every row, each in [0, 1].
    fn predict_proba(&self, x: &FeatureMatrix) -> PipelineResult<Vec<f64>>;

    /// Hard labels. The default calls a row positive when its
    /// probability exceeds 0.5, so labels are monotone in probability.
    fn predict(&self, x: &FeatureMatrix) -> PipelineResult<Vec<Label>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnClassifier {
    scaler:     StandardScaler,
    model:      LogisticModel,
    fit_report: FitReport,
}

impl ChurnClassifier {
    /// Learn scaling statistics from `x`, then fit the model on the
    /// scaled matrix.
    pub fn fit(x: &FeatureMatrix, y: &[Label], config: &ModelConfig) -> PipelineResult<Self> {
        let scaler = StandardScaler::fit(x)?;
        let scaled = scaler.transform(x)?;
        let (model, fit_report) = LogisticModel::fit(&scaled, y, config)?;
        log::debug!(
            "classifier fit: {} rows, {} iterations, converged={}",
            x.n_rows(),
            fit_report.iterations,
            fit_report.converged
        );
        Ok(Self { scaler, model, fit_report })
    }

    pub fn fit_report(&self) -> &FitReport {
        &self.fit_report
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Coefficients on the standardized features, named.
    pub fn coefficients(&self) -> Vec<FeatureCoefficient> {
        FEATURE_NAMES
            .iter()
            .zip(&self.model.coefficients)
            .map(|(name, &value)| FeatureCoefficient {
                feature: name.to_string(),
                value,
            })
            .collect()
    }

    pub fn intercept(&self) -> f64 {
        self.model.intercept
    }
}

impl BinaryClassifier for ChurnClassifier {
    fn predict_proba(&self, x: &FeatureMatrix) -> PipelineResult<Vec<f64>> {
        let scaled = self.scaler.transform(x)?;
        Ok(self.model.predict_proba(&scaled))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCoefficient {
    pub feature: String,
    pub value:   f64,
}

/// Held-out evaluation plus the cross-validation stability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub accuracy:         f64,
    pub roc_auc:          f64,
    pub confusion:        ConfusionMatrix,
    pub report:           ClassificationReport,
    pub roc_curve:        Vec<RocPoint>,
    pub coefficients:     Vec<FeatureCoefficient>,
    pub cross_validation: CrossValidation,
}

impl ModelEvaluation {
    pub fn on_holdout<C: BinaryClassifier>(
        model: &C,
        x_test: &FeatureMatrix,
        y_test: &[Label],
        coefficients: Vec<FeatureCoefficient>,
        cross_validation: CrossValidation,
    ) -> PipelineResult<Self> {
        let predicted = model.predict(x_test)?;
        let proba = model.predict_proba(x_test)?;
        Ok(Self {
            accuracy: accuracy(&predicted, y_test),
            roc_auc: roc_auc(&proba, y_test),
            confusion: ConfusionMatrix::from_predictions(&predicted, y_test),
            report: ClassificationReport::new(&predicted, y_test),
            roc_curve: roc_curve(&proba, y_test),
            coefficients,
            cross_validation,
        })
    }
}
