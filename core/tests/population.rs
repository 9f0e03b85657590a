use churnlab_core::{
    config::GeneratorConfig,
    customer::{Contract, CustomerRecord},
    generator::CustomerGenerator,
    rng::{RngBank, StageSlot},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn population(seed: u64, n: usize) -> Vec<CustomerRecord> {
    let config = GeneratorConfig::default();
    let mut rng = RngBank::new(seed).for_stage(StageSlot::Generator);
    CustomerGenerator::new(&config).generate(n, &mut rng).unwrap()
}

fn churn_rate_for(customers: &[CustomerRecord], contract: Contract) -> f64 {
    let members: Vec<_> = customers.iter().filter(|c| c.contract == contract).collect();
    members.iter().filter(|c| c.churned()).count() as f64 / members.len() as f64
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn every_column_stays_in_bounds() {
    let customers = population(42, 5000);
    assert_eq!(customers.len(), 5000);

    for c in &customers {
        assert!((1..=72).contains(&c.tenure), "tenure={} out of [1,72]", c.tenure);
        assert!(
            (20.0..=120.0).contains(&c.monthly_charges),
            "monthly_charges={} out of [20,120]",
            c.monthly_charges
        );
        assert!((1..=5).contains(&c.num_products), "num_products={}", c.num_products);
        assert!(c.senior_citizen <= 1 && c.partner <= 1 && c.churn <= 1);

        // Total is monthly × tenure × U(0.85, 1.15), rounded to cents.
        let base = c.monthly_charges * f64::from(c.tenure);
        assert!(
            c.total_charges >= base * 0.85 - 0.01 && c.total_charges <= base * 1.15 + 0.01,
            "total_charges={} outside noise band around {base}",
            c.total_charges
        );
        assert_eq!(c.monthly_charges, (c.monthly_charges * 100.0).round() / 100.0);
    }
}

#[test]
fn ids_are_zero_padded_row_indices() {
    let customers = population(1, 12);
    assert_eq!(customers[0].customer_id, "CUST-00000");
    assert_eq!(customers[11].customer_id, "CUST-00011");
}

#[test]
fn month_to_month_churns_more_than_two_year() {
    let customers = population(42, 5000);
    let mtm = churn_rate_for(&customers, Contract::MonthToMonth);
    let two_year = churn_rate_for(&customers, Contract::TwoYear);
    assert!(
        mtm > two_year,
        "Month-to-Month churn {mtm:.3} should exceed Two Year churn {two_year:.3}"
    );
}

/// Average propensity under the default weights is about 0.40.
#[test]
fn overall_churn_rate_is_plausible() {
    let customers = population(42, 5000);
    let rate = customers.iter().filter(|c| c.churned()).count() as f64 / customers.len() as f64;
    assert!((0.25..0.55).contains(&rate), "churn rate {rate:.3} implausible");
}

#[test]
fn contract_mix_follows_weights() {
    let customers = population(9, 5000);
    let share = customers
        .iter()
        .filter(|c| c.contract == Contract::MonthToMonth)
        .count() as f64
        / customers.len() as f64;
    assert!((share - 0.55).abs() < 0.03, "Month-to-Month share {share:.3}");
}

#[test]
fn zero_customers_is_an_error() {
    let config = GeneratorConfig::default();
    let mut rng = RngBank::new(42).for_stage(StageSlot::Generator);
    assert!(CustomerGenerator::new(&config).generate(0, &mut rng).is_err());
}
