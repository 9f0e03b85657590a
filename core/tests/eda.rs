use churnlab_core::{
    config::GeneratorConfig,
    customer::{Contract, CustomerRecord},
    eda::{box_summary, describe, group_rates, TENURE_HISTOGRAM_BINS},
    generator::CustomerGenerator,
    rng::{RngBank, StageSlot},
};

fn population(seed: u64, n: usize) -> Vec<CustomerRecord> {
    let config = GeneratorConfig::default();
    let mut rng = RngBank::new(seed).for_stage(StageSlot::Generator);
    CustomerGenerator::new(&config).generate(n, &mut rng).unwrap()
}

#[test]
fn describe_reports_shape_and_churn_counts() {
    let customers = population(42, 1000);
    let report = describe(&customers, 5).unwrap();

    assert_eq!(report.rows, 1000);
    assert_eq!(report.columns, 12);
    assert_eq!(report.retained + report.churned, 1000);
    assert!((report.churn_rate - report.churned as f64 / 1000.0).abs() < 1e-12);
    assert_eq!(report.preview.len(), 5);
    assert_eq!(report.preview[0], customers[0]);
}

#[test]
fn column_stats_use_sample_deviation() {
    let customers = population(3, 4);
    let report = describe(&customers, 0).unwrap();
    let tenure = report.column_stats.iter().find(|s| s.column == "Tenure").unwrap();

    let values: Vec<f64> = customers.iter().map(|c| f64::from(c.tenure)).collect();
    let mean = values.iter().sum::<f64>() / 4.0;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
    assert!((tenure.mean - mean).abs() < 1e-12);
    assert!((tenure.std - var.sqrt()).abs() < 1e-12);
    assert_eq!(tenure.count, 4);
    assert_eq!(tenure.min, values.iter().copied().fold(f64::INFINITY, f64::min));
}

#[test]
fn contract_groups_are_sorted_and_complete() {
    let customers = population(42, 2000);
    let groups = group_rates(&customers, |c| c.contract.label().to_string());
    let names: Vec<&str> = groups.iter().map(|g| g.group.as_str()).collect();
    assert_eq!(names, vec!["Month-to-Month", "One Year", "Two Year"]);

    let mtm = customers.iter().filter(|c| c.contract == Contract::MonthToMonth);
    let expected = mtm.clone().filter(|c| c.churned()).count() as f64 / mtm.count() as f64;
    assert!((groups[0].churn_rate - expected).abs() < 1e-12);
}

#[test]
fn tenure_histogram_counts_every_customer() {
    let customers = population(42, 1000);
    let hist = describe(&customers, 0).unwrap().tenure_histogram;

    assert_eq!(hist.edges.len(), TENURE_HISTOGRAM_BINS + 1);
    let retained: usize = hist.retained.iter().sum();
    let churned: usize = hist.churned.iter().sum();
    assert_eq!(retained + churned, customers.len());
    assert_eq!(churned, customers.iter().filter(|c| c.churned()).count());
}

#[test]
fn box_summary_orders_quartiles() {
    let customers = population(42, 1000);
    let charges: Vec<f64> = customers.iter().map(|c| c.monthly_charges).collect();
    let b = box_summary(&charges);
    assert!(b.lower_whisker <= b.q1 && b.q1 <= b.median);
    assert!(b.median <= b.q3 && b.q3 <= b.upper_whisker);
    // Uniform charges have no 1.5 × IQR outliers.
    assert!(b.outliers.is_empty());
}

#[test]
fn describing_nothing_is_an_error() {
    assert!(describe(&[], 5).is_err());
}
