//! End-to-end: run every stage on a small population and write the
//! artifacts the runner writes.

use chrono::Utc;
use churnlab_core::{
    config::PipelineConfig,
    engine::{ChurnPipeline, PipelineOutcome},
    event::PipelineEvent,
    export::{write_at_risk_csv, write_customers_csv, AT_RISK_FILE, CUSTOMER_DATA_FILE},
    risk::RiskSegment,
    summary::RunSummary,
};
use std::fs::{self, File};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn run_small() -> PipelineOutcome {
    let _ = env_logger::builder().is_test(true).try_init();
    ChurnPipeline::new(PipelineConfig::default_test())
        .unwrap()
        .run()
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn pipeline_runs_end_to_end() {
    let outcome = run_small();

    assert_eq!(outcome.customers.len(), 1000);
    assert_eq!(outcome.split.train.len() + outcome.split.test.len(), 1000);
    assert!((0.0..=1.0).contains(&outcome.evaluation.accuracy));
    assert!(outcome.evaluation.roc_auc > 0.5);
    assert_eq!(outcome.evaluation.coefficients.len(), 10);
    assert_eq!(outcome.evaluation.cross_validation.fold_scores.len(), 5);
    assert_eq!(outcome.segments.len(), RiskSegment::ALL.len());
    assert_eq!(outcome.impact.high_risk_count, outcome.segments[2].customers);
    assert_eq!(
        outcome.impact.saved_customers,
        (outcome.impact.high_risk_count as f64 * 0.12).floor() as usize
    );
}

#[test]
fn event_log_records_each_stage_in_order() {
    let outcome = run_small();
    let names: Vec<&str> = outcome.events.iter().map(|e| e.event.type_name()).collect();
    assert_eq!(
        names,
        vec![
            "run_initialized",
            "dataset_generated",
            "eda_completed",
            "features_encoded",
            "split_completed",
            "model_fitted",
            "model_evaluated",
            "cross_validated",
            "cohorts_computed",
            "population_scored",
            "impact_estimated",
        ]
    );
    assert!(outcome.events.iter().enumerate().all(|(i, e)| e.seq == i));
    assert!(matches!(
        outcome.events[0].event,
        PipelineEvent::RunInitialized { seed: 42, customers: 1000 }
    ));
}

#[test]
fn artifacts_are_written() {
    let outcome = run_small();
    let dir = tempfile::tempdir().unwrap();

    let data_path = dir.path().join(CUSTOMER_DATA_FILE);
    write_customers_csv(File::create(&data_path).unwrap(), &outcome.customers).unwrap();
    let data = fs::read_to_string(&data_path).unwrap();
    assert_eq!(data.lines().count(), 1001);
    assert!(data.starts_with("CustomerID,Tenure,MonthlyCharges"));

    let risk_path = dir.path().join(AT_RISK_FILE);
    write_at_risk_csv(File::create(&risk_path).unwrap(), &outcome.at_risk).unwrap();
    let risk = fs::read_to_string(&risk_path).unwrap();
    let mut lines = risk.lines();
    assert_eq!(
        lines.next(),
        Some("CustomerID,Tenure,MonthlyCharges,Contract,SupportCalls,ChurnProbability")
    );
    assert_eq!(lines.count(), outcome.at_risk.len());
}

#[test]
fn empty_at_risk_export_keeps_its_header() {
    let mut buf = Vec::new();
    write_at_risk_csv(&mut buf, &[]).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "CustomerID,Tenure,MonthlyCharges,Contract,SupportCalls,ChurnProbability\n"
    );
}

/// Raising the high threshold out of reach leaves no one to export.
#[test]
fn run_without_high_risk_customers_still_writes_header() {
    let mut config = PipelineConfig::default_test();
    config.customers = 300;
    config.risk.high = 1.0;
    let outcome = ChurnPipeline::new(config).unwrap().run().unwrap();
    assert!(outcome.at_risk.is_empty());

    let mut buf = Vec::new();
    write_at_risk_csv(&mut buf, &outcome.at_risk).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("CustomerID,"));
}

#[test]
fn run_summary_marks_scores_in_sample() {
    let outcome = run_small();
    let summary = RunSummary::from_outcome(&outcome, Utc::now());
    assert!(summary.in_sample_scores);
    assert_eq!(summary.customers, 1000);
    assert_eq!(summary.events.len(), outcome.events.len());

    let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
    assert_eq!(json["in_sample_scores"], true);
    assert_eq!(json["config"]["seed"], 42);
    assert_eq!(json["events"][0]["event"]["type"], "run_initialized");
    assert_eq!(json["risk_segments"][2]["segment"], "High Risk");
    assert_eq!(
        json["charge_buckets"].as_array().unwrap().len(),
        outcome.charge_buckets.len()
    );
    assert_eq!(summary.charge_buckets, outcome.charge_buckets);
}
