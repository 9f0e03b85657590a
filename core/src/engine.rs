//! The pipeline engine.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Generate the customer table     (Generator slot)
//!   2. Describe it                     (no randomness)
//!   3. Fit the encoder, encode, split  (Split slot)
//!   4. Fit and evaluate the classifier, cross-validate
//!   5. Cohort matrix and charge buckets
//!   6. Score the population, summarize segments, rank at-risk rows
//!   7. Estimate revenue impact
//!
//! RULES:
//!   - Every stage takes borrowed inputs and returns new values.
//!   - All randomness flows through the RngBank.
//!   - Every completed stage appends one event to the log.

use crate::{
    classifier::{ChurnClassifier, ModelEvaluation},
    cohort::{churn_by_charge_bucket, ChargeBucketRate, CohortMatrix},
    config::PipelineConfig,
    customer::{labels, CustomerRecord},
    eda::{describe, EdaReport, NUMERIC_COLUMNS},
    encoding::{CategoricalEncoder, FEATURE_NAMES},
    error::PipelineResult,
    event::{EventLogEntry, PipelineEvent},
    features::select,
    generator::CustomerGenerator,
    impact::{estimate_impact, ImpactEstimate},
    model_selection::{cross_validate_accuracy, stratified_split, StratifiedKFold, TrainTestSplit},
    risk::{
        count_in_segment, score_population, summarize_segments, top_at_risk, AtRiskCustomer,
        RiskSegment, ScoredCustomer, SegmentSummary,
    },
    rng::{RngBank, StageSlot},
    types::{mean, positive_rate},
};

pub struct ChurnPipeline {
    config:   PipelineConfig,
    rng_bank: RngBank,
    events:   Vec<EventLogEntry>,
}

/// Everything a run produces. The runner renders and writes from this.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub config:         PipelineConfig,
    pub customers:      Vec<CustomerRecord>,
    pub eda:            EdaReport,
    pub encoder:        CategoricalEncoder,
    pub split:          TrainTestSplit,
    pub classifier:     ChurnClassifier,
    pub evaluation:     ModelEvaluation,
    pub cohorts:        CohortMatrix,
    pub charge_buckets: Vec<ChargeBucketRate>,
    pub scored:         Vec<ScoredCustomer>,
    pub segments:       Vec<SegmentSummary>,
    pub at_risk:        Vec<AtRiskCustomer>,
    pub impact:         ImpactEstimate,
    pub events:         Vec<EventLogEntry>,
}

impl ChurnPipeline {
    /// Validates `config` before anything runs.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self {
            rng_bank: RngBank::new(config.seed),
            config,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn record(&mut self, stage: &str, event: PipelineEvent) {
        log::debug!("[{stage}] {}", event.type_name());
        self.events.push(EventLogEntry {
            seq: self.events.len(),
            stage: stage.to_string(),
            event,
        });
    }

    /// Run every stage once, in order.
    pub fn run(mut self) -> PipelineResult<PipelineOutcome> {
        let cfg = self.config.clone();
        self.record(
            "engine",
            PipelineEvent::RunInitialized {
                seed: cfg.seed,
                customers: cfg.customers,
            },
        );

        // 1. Generate
        let mut gen_rng = self.rng_bank.for_stage(StageSlot::Generator);
        let customers = CustomerGenerator::new(&cfg.generator).generate(cfg.customers, &mut gen_rng)?;
        let y_all = labels(&customers);
        let churned = y_all.iter().filter(|&&l| l == 1).count();
        log::info!(
            "generated {} customers, churn rate {:.2}%",
            customers.len(),
            100.0 * positive_rate(&y_all)
        );
        self.record(
            "generator",
            PipelineEvent::DatasetGenerated {
                rows: customers.len(),
                churned,
                churn_rate: positive_rate(&y_all),
            },
        );

        // 2. Describe
        let eda = describe(&customers, cfg.preview_rows)?;
        log::info!("eda: {} numeric columns summarized", eda.column_stats.len());
        self.record(
            "eda",
            PipelineEvent::EdaCompleted {
                numeric_columns: NUMERIC_COLUMNS.len(),
            },
        );

        // 3. Encode and split
        let encoder = CategoricalEncoder::fit(&customers)?;
        let table = encoder.encode_table(&customers)?;
        self.record(
            "encoder",
            PipelineEvent::FeaturesEncoded {
                features: FEATURE_NAMES.len(),
                categories: encoder.mappings().iter().map(|m| m.labels.len()).sum(),
            },
        );

        let mut split_rng = self.rng_bank.for_stage(StageSlot::Split);
        let split = stratified_split(&table.labels, cfg.test_fraction, &mut split_rng)?;
        let x_train = table.features.select_rows(&split.train);
        let y_train = select(&table.labels, &split.train);
        let x_test = table.features.select_rows(&split.test);
        let y_test = select(&table.labels, &split.test);
        log::info!("split: {} train / {} test", split.train.len(), split.test.len());
        self.record(
            "split",
            PipelineEvent::SplitCompleted {
                train: split.train.len(),
                test: split.test.len(),
                train_churn_rate: positive_rate(&y_train),
                test_churn_rate: positive_rate(&y_test),
            },
        );

        // 4. Fit, evaluate, cross-validate
        let classifier = ChurnClassifier::fit(&x_train, &y_train, &cfg.model)?;
        let report = *classifier.fit_report();
        self.record(
            "classifier",
            PipelineEvent::ModelFitted {
                iterations: report.iterations,
                converged: report.converged,
                final_loss: report.final_loss,
            },
        );

        let cross_validation = cross_validate_accuracy(
            &table.features,
            &table.labels,
            StratifiedKFold::new(cfg.cv_folds),
            |x, y| ChurnClassifier::fit(x, y, &cfg.model),
        )?;
        let evaluation = ModelEvaluation::on_holdout(
            &classifier,
            &x_test,
            &y_test,
            classifier.coefficients(),
            cross_validation,
        )?;
        log::info!(
            "model: accuracy {:.4}, roc-auc {:.4}, cv {:.4} ± {:.4}",
            evaluation.accuracy,
            evaluation.roc_auc,
            evaluation.cross_validation.mean,
            evaluation.cross_validation.std
        );
        self.record(
            "evaluation",
            PipelineEvent::ModelEvaluated {
                accuracy: evaluation.accuracy,
                roc_auc: evaluation.roc_auc,
            },
        );
        self.record(
            "cross_validation",
            PipelineEvent::CrossValidated {
                folds: evaluation.cross_validation.fold_scores.len(),
                mean: evaluation.cross_validation.mean,
                std: evaluation.cross_validation.std,
            },
        );

        // 5. Cohorts
        let cohorts = CohortMatrix::build(&customers);
        let charge_buckets = churn_by_charge_bucket(&customers);
        log::info!("cohorts: {} populated cells", cohorts.cells.len());
        self.record(
            "cohort",
            PipelineEvent::CohortsComputed {
                cells: cohorts.cells.len(),
            },
        );

        // 6. Score the whole population
        let scored = score_population(&customers, &encoder, &classifier, &cfg.risk, &split.train)?;
        let segments = summarize_segments(&scored);
        let at_risk = top_at_risk(&scored, cfg.at_risk_export_size);
        let high = count_in_segment(&scored, RiskSegment::High);
        log::info!("scored {} customers, {high} high risk (in-sample)", scored.len());
        self.record(
            "risk",
            PipelineEvent::PopulationScored {
                low: count_in_segment(&scored, RiskSegment::Low),
                medium: count_in_segment(&scored, RiskSegment::Medium),
                high,
            },
        );

        // 7. Impact
        let charges: Vec<f64> = customers.iter().map(|c| c.monthly_charges).collect();
        let impact = estimate_impact(high, mean(&charges).unwrap_or(0.0), cfg.retention_improvement);
        log::info!(
            "impact: {} customers saved, ${:.2} annual revenue",
            impact.saved_customers,
            impact.annual_revenue_saved
        );
        self.record(
            "impact",
            PipelineEvent::ImpactEstimated {
                saved_customers: impact.saved_customers,
                annual_revenue_saved: impact.annual_revenue_saved,
            },
        );

        Ok(PipelineOutcome {
            config: cfg,
            customers,
            eda,
            encoder,
            split,
            classifier,
            evaluation,
            cohorts,
            charge_buckets,
            scored,
            segments,
            at_risk,
            impact,
            events: self.events,
        })
    }
}
