use churnlab_core::{
    cohort::{churn_by_charge_bucket, ChargeBucket, CohortMatrix, TenureBucket},
    config::GeneratorConfig,
    customer::{Contract, CustomerRecord},
    generator::CustomerGenerator,
    rng::{RngBank, StageSlot},
};

fn population(seed: u64, n: usize) -> Vec<CustomerRecord> {
    let config = GeneratorConfig::default();
    let mut rng = RngBank::new(seed).for_stage(StageSlot::Generator);
    CustomerGenerator::new(&config).generate(n, &mut rng).unwrap()
}

#[test]
fn tenure_buckets_are_right_closed() {
    assert_eq!(TenureBucket::of(0), None);
    assert_eq!(TenureBucket::of(1), Some(TenureBucket::UpTo12));
    assert_eq!(TenureBucket::of(12), Some(TenureBucket::UpTo12));
    assert_eq!(TenureBucket::of(13), Some(TenureBucket::UpTo24));
    assert_eq!(TenureBucket::of(72), Some(TenureBucket::UpTo72));
    assert_eq!(TenureBucket::of(73), None);
    assert_eq!(TenureBucket::UpTo36.label(), "25-36m");
}

#[test]
fn charge_buckets_are_right_closed() {
    assert_eq!(ChargeBucket::of(20.0), Some(ChargeBucket::Low));
    assert_eq!(ChargeBucket::of(40.0), Some(ChargeBucket::Low));
    assert_eq!(ChargeBucket::of(40.01), Some(ChargeBucket::Medium));
    assert_eq!(ChargeBucket::of(100.0), Some(ChargeBucket::High));
    assert_eq!(ChargeBucket::of(120.0), Some(ChargeBucket::Premium));
    assert_eq!(ChargeBucket::of(0.0), None);
}

/// Every cell's rate equals a direct count over the table.
#[test]
fn cohort_rates_match_manual_counts() {
    let customers = population(42, 3000);
    let matrix = CohortMatrix::build(&customers);

    for bucket in TenureBucket::ALL {
        for contract in Contract::ALL {
            let members: Vec<&CustomerRecord> = customers
                .iter()
                .filter(|c| TenureBucket::of(c.tenure) == Some(bucket) && c.contract == contract)
                .collect();
            let rate = matrix.rate(bucket, contract);
            if members.is_empty() {
                assert!(rate.is_none());
                continue;
            }
            let expected = members.iter().filter(|c| c.churned()).count() as f64 / members.len() as f64;
            let rate = rate.unwrap();
            assert!(
                (rate - expected).abs() < 1e-12,
                "{} × {}: {rate} vs {expected}",
                bucket.label(),
                contract
            );
        }
    }

    let covered: usize = matrix.cells.iter().map(|c| c.customers).sum();
    assert_eq!(covered, customers.len());
}

#[test]
fn empty_cells_are_absent() {
    let customers: Vec<CustomerRecord> = population(1, 200)
        .into_iter()
        .filter(|c| c.contract == Contract::OneYear)
        .collect();
    let matrix = CohortMatrix::build(&customers);
    assert!(matrix.cells.iter().all(|c| c.contract == Contract::OneYear));
    assert!(matrix.rate(TenureBucket::UpTo12, Contract::TwoYear).is_none());
}

#[test]
fn charge_bucket_rates_cover_the_table() {
    let customers = population(42, 2000);
    let rates = churn_by_charge_bucket(&customers);
    assert_eq!(rates.len(), ChargeBucket::ALL.len());
    let covered: usize = rates.iter().map(|r| r.customers).sum();
    assert_eq!(covered, customers.len());
    assert!(rates.iter().all(|r| (0.0..=1.0).contains(&r.churn_rate)));
}
