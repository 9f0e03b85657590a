use churnlab_core::impact::estimate_impact;

#[test]
fn revenue_estimate_for_reference_inputs() {
    let impact = estimate_impact(500, 70.00, 0.12);
    assert_eq!(impact.saved_customers, 60);
    assert!((impact.monthly_revenue_saved - 4200.00).abs() < 1e-9);
    assert!((impact.annual_revenue_saved - 50400.00).abs() < 1e-9);
}

#[test]
fn saved_customers_round_down() {
    // 37 × 0.12 = 4.44
    assert_eq!(estimate_impact(37, 50.0, 0.12).saved_customers, 4);
    assert_eq!(estimate_impact(8, 50.0, 0.12).saved_customers, 0);
}

#[test]
fn no_high_risk_customers_means_no_revenue() {
    let impact = estimate_impact(0, 72.5, 0.12);
    assert_eq!(impact.saved_customers, 0);
    assert_eq!(impact.annual_revenue_saved, 0.0);
}
