use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Generator ──────────────────────────────────────────────────────

/// Linear churn propensity weights used to synthesize labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PropensityWeights {
    pub intercept:       f64,
    pub tenure:          f64,
    pub monthly_charges: f64,
    pub num_products:    f64,
    pub support_calls:   f64,
    pub month_to_month:  f64,
    pub two_year:        f64,
    pub fiber_optic:     f64,
    pub senior_citizen:  f64,
    pub noise_std:       f64,
    pub floor:           f64,
    pub ceiling:         f64,
}

impl Default for PropensityWeights {
    fn default() -> Self {
        Self {
            intercept:       0.30,
            tenure:          -0.004,
            monthly_charges: 0.002,
            num_products:    -0.03,
            support_calls:   0.04,
            month_to_month:  0.15,
            two_year:        -0.08,
            fiber_optic:     0.10,
            senior_citizen:  0.05,
            noise_std:       0.05,
            floor:           0.02,
            ceiling:         0.95,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub tenure_min:            u32,
    pub tenure_max:            u32,
    pub charge_min:            f64,
    pub charge_max:            f64,
    /// Multiplicative noise on TotalCharges: U(1 - n, 1 + n).
    pub total_charge_noise:    f64,
    pub products_min:          u32,
    pub products_max:          u32,
    pub support_calls_mean:    f64,
    /// Month-to-Month, One Year, Two Year.
    pub contract_weights:      [f64; 3],
    /// DSL, Fiber Optic, No.
    pub internet_weights:      [f64; 3],
    pub senior_probability:    f64,
    pub partner_probability:   f64,
    pub propensity:            PropensityWeights,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tenure_min:          1,
            tenure_max:          72,
            charge_min:          20.0,
            charge_max:          120.0,
            total_charge_noise:  0.15,
            products_min:        1,
            products_max:        5,
            support_calls_mean:  2.0,
            contract_weights:    [0.55, 0.25, 0.20],
            internet_weights:    [0.35, 0.45, 0.20],
            senior_probability:  0.16,
            partner_probability: 0.48,
            propensity:          PropensityWeights::default(),
        }
    }
}

// ── Classifier ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every sample weighs 1.
    Uniform,
    /// Weight n / (2 * n_class) so both classes contribute equally.
    Balanced,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub max_iter:      usize,
    /// Stop once every gradient component is below this.
    pub tolerance:     f64,
    pub learning_rate: f64,
    /// Inverse L2 regularization strength.
    pub c:             f64,
    pub class_weight:  ClassWeight,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_iter:      1000,
            tolerance:     1e-4,
            learning_rate: 0.5,
            c:             1.0,
            class_weight:  ClassWeight::Balanced,
        }
    }
}

// ── Risk scoring ───────────────────────────────────────────────────

/// Lower bounds (inclusive) of the Medium and High risk tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskThresholds {
    pub medium: f64,
    pub high:   f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { medium: 0.35, high: 0.60 }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub seed:                  u64,
    pub customers:             usize,
    pub test_fraction:         f64,
    pub cv_folds:              usize,
    pub retention_improvement: f64,
    pub at_risk_export_size:   usize,
    pub preview_rows:          usize,
    pub generator:             GeneratorConfig,
    pub model:                 ModelConfig,
    pub risk:                  RiskThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            customers:             5000,
            test_fraction:         0.20,
            cv_folds:              5,
            retention_improvement: 0.12,
            at_risk_export_size:   20,
            preview_rows:          5,
            generator:             GeneratorConfig::default(),
            model:                 ModelConfig::default(),
            risk:                  RiskThresholds::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with a small population for use in tests.
    pub fn default_test() -> Self {
        Self {
            customers: 1000,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        let g = &self.generator;
        if self.customers == 0 {
            return Err(invalid("customers must be > 0"));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(invalid(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.cv_folds < 2 {
            return Err(invalid(format!("cv_folds must be >= 2, got {}", self.cv_folds)));
        }
        if self.cv_folds > self.customers {
            return Err(invalid(format!(
                "cv_folds ({}) cannot exceed customers ({})",
                self.cv_folds, self.customers
            )));
        }
        if g.tenure_min > g.tenure_max || g.products_min > g.products_max {
            return Err(invalid("integer ranges must have min <= max"));
        }
        if !(g.charge_min < g.charge_max) {
            return Err(invalid("charge_min must be < charge_max"));
        }
        if g.contract_weights.iter().chain(&g.internet_weights).any(|w| *w < 0.0) {
            return Err(invalid("category weights must be non-negative"));
        }
        let p = &g.propensity;
        if !(0.0 <= p.floor && p.floor <= p.ceiling && p.ceiling <= 1.0) {
            return Err(invalid("propensity clip bounds must satisfy 0 <= floor <= ceiling <= 1"));
        }
        if !(0.0 < self.risk.medium && self.risk.medium < self.risk.high && self.risk.high <= 1.0) {
            return Err(invalid("risk thresholds must satisfy 0 < medium < high <= 1"));
        }
        if self.model.max_iter == 0 || self.model.learning_rate <= 0.0 || self.model.c <= 0.0 {
            return Err(invalid("model max_iter, learning_rate and c must be positive"));
        }
        if !(0.0..=1.0).contains(&self.retention_improvement) {
            return Err(invalid("retention_improvement must be in [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> PipelineError {
    PipelineError::InvalidConfig(msg.into())
}
