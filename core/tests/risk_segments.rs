use churnlab_core::{
    config::{PipelineConfig, RiskThresholds},
    customer::Contract,
    engine::ChurnPipeline,
    risk::{count_in_segment, summarize_segments, top_at_risk, RiskSegment, ScoredCustomer},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn scored(id: &str, p: f64) -> ScoredCustomer {
    ScoredCustomer {
        customer_id:       id.to_string(),
        tenure:            12,
        monthly_charges:   80.0,
        contract:          Contract::MonthToMonth,
        support_calls:     3,
        churn:             1,
        churn_probability: p,
        risk_segment:      RiskSegment::classify(p, &RiskThresholds::default()),
        in_sample:         false,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Each tier includes its lower bound.
#[test]
fn segment_boundaries() {
    let t = RiskThresholds::default();
    assert_eq!(RiskSegment::classify(0.0, &t), RiskSegment::Low);
    assert_eq!(RiskSegment::classify(0.34999, &t), RiskSegment::Low);
    assert_eq!(RiskSegment::classify(0.35, &t), RiskSegment::Medium);
    assert_eq!(RiskSegment::classify(0.59999, &t), RiskSegment::Medium);
    assert_eq!(RiskSegment::classify(0.60, &t), RiskSegment::High);
    assert_eq!(RiskSegment::classify(1.0, &t), RiskSegment::High);
}

#[test]
fn segment_labels_match_report_names() {
    assert_eq!(RiskSegment::Low.to_string(), "Low Risk");
    assert_eq!(RiskSegment::Medium.to_string(), "Medium Risk");
    assert_eq!(RiskSegment::High.to_string(), "High Risk");
}

#[test]
fn at_risk_export_is_capped_and_descending() {
    let population: Vec<ScoredCustomer> = (0..50)
        .map(|i| scored(&format!("CUST-{i:05}"), 0.2 + 0.015 * i as f64))
        .collect();
    let high = count_in_segment(&population, RiskSegment::High);
    let top = top_at_risk(&population, 20);

    assert_eq!(top.len(), high.min(20));
    assert!(top.windows(2).all(|w| w[0].churn_probability > w[1].churn_probability));
    assert!(top.iter().all(|r| r.churn_probability >= 0.60));
}

#[test]
fn at_risk_export_shorter_than_cap_when_few_are_high() {
    let population = vec![scored("CUST-00000", 0.9), scored("CUST-00001", 0.5), scored("CUST-00002", 0.7)];
    let top = top_at_risk(&population, 20);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].customer_id, "CUST-00000");
}

#[test]
fn equal_probabilities_fall_back_to_id_order() {
    let population = vec![scored("CUST-00009", 0.8), scored("CUST-00003", 0.8)];
    let top = top_at_risk(&population, 20);
    assert_eq!(top[0].customer_id, "CUST-00003");
}

#[test]
fn summary_lists_every_segment_even_when_empty() {
    let population = vec![scored("CUST-00000", 0.1), scored("CUST-00001", 0.2)];
    let summary = summarize_segments(&population);

    assert_eq!(summary.len(), 3);
    assert_eq!(summary[0].segment, RiskSegment::Low);
    assert_eq!(summary[0].customers, 2);
    assert!((summary[0].avg_churn_probability.unwrap() - 0.15).abs() < 1e-12);
    assert_eq!(summary[2].customers, 0);
    assert!(summary[2].avg_monthly_charge.is_none());
}

/// The scored population includes the training rows; they are flagged.
#[test]
fn population_scores_flag_training_rows() {
    let outcome = ChurnPipeline::new(PipelineConfig::default_test())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(outcome.scored.len(), outcome.customers.len());
    let flagged = outcome.scored.iter().filter(|s| s.in_sample).count();
    assert_eq!(flagged, outcome.split.train.len());
    for &i in &outcome.split.test {
        assert!(!outcome.scored[i].in_sample);
    }

    let total: usize = outcome.segments.iter().map(|s| s.customers).sum();
    assert_eq!(total, outcome.customers.len());
    assert_eq!(
        outcome.at_risk.len(),
        count_in_segment(&outcome.scored, RiskSegment::High).min(20)
    );
}
