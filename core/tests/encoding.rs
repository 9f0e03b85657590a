//! One encoder, fitted once, encodes both the training rows and the
//! scoring rows. These tests pin that mapping down.

use churnlab_core::{
    config::GeneratorConfig,
    customer::{Contract, CustomerRecord, InternetService, PaymentMethod},
    encoding::{CategoricalEncoder, CATEGORICAL_COLUMNS, FEATURE_NAMES},
    error::PipelineError,
    features::select,
    generator::CustomerGenerator,
    model_selection::stratified_split,
    rng::{RngBank, StageSlot},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn customer(contract: Contract, payment: PaymentMethod, internet: InternetService) -> CustomerRecord {
    CustomerRecord {
        customer_id:      "CUST-00000".into(),
        tenure:           10,
        monthly_charges:  55.5,
        total_charges:    560.0,
        num_products:     2,
        support_calls:    1,
        contract,
        payment_method:   payment,
        internet_service: internet,
        senior_citizen:   0,
        partner:          1,
        churn:            0,
    }
}

fn population(seed: u64, n: usize) -> Vec<CustomerRecord> {
    let config = GeneratorConfig::default();
    let mut rng = RngBank::new(seed).for_stage(StageSlot::Generator);
    CustomerGenerator::new(&config).generate(n, &mut rng).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn codes_follow_sorted_labels() {
    let customers = population(42, 1000);
    let encoder = CategoricalEncoder::fit(&customers).unwrap();

    assert_eq!(encoder.encode("Contract", "Month-to-Month").unwrap(), 0);
    assert_eq!(encoder.encode("Contract", "One Year").unwrap(), 1);
    assert_eq!(encoder.encode("Contract", "Two Year").unwrap(), 2);
    assert_eq!(encoder.encode("InternetService", "DSL").unwrap(), 0);
    assert_eq!(encoder.encode("InternetService", "Fiber Optic").unwrap(), 1);
    assert_eq!(encoder.encode("InternetService", "No").unwrap(), 2);
    assert_eq!(encoder.encode("PaymentMethod", "Bank Transfer").unwrap(), 0);
    assert_eq!(encoder.encode("PaymentMethod", "Electronic Check").unwrap(), 2);
}

/// Encoding a training row and the same customer in the scoring table
/// yields identical feature rows for every category.
#[test]
fn scoring_mapping_equals_training_mapping() {
    let customers = population(42, 1000);
    let encoder = CategoricalEncoder::fit(&customers).unwrap();
    let table = encoder.encode_table(&customers).unwrap();

    let labels: Vec<u8> = customers.iter().map(|c| c.churn).collect();
    let mut rng = RngBank::new(42).for_stage(StageSlot::Split);
    let split = stratified_split(&labels, 0.2, &mut rng).unwrap();
    let train_rows = table.features.select_rows(&split.train);
    let train_customers: Vec<CustomerRecord> = split.train.iter().map(|&i| customers[i].clone()).collect();

    for (k, c) in train_customers.iter().enumerate() {
        assert_eq!(train_rows.row(k), encoder.encode_record(c).unwrap().as_slice());
    }
    assert_eq!(select(&table.labels, &split.train).len(), train_rows.n_rows());

    for column in CATEGORICAL_COLUMNS {
        let mapping = encoder.mapping(column).unwrap();
        for (code, label) in mapping.labels.iter().enumerate() {
            assert_eq!(encoder.encode(column, label).unwrap() as usize, code);
        }
    }
}

#[test]
fn feature_rows_follow_column_order() {
    let encoder = CategoricalEncoder::fit(&[
        customer(Contract::OneYear, PaymentMethod::CreditCard, InternetService::Dsl),
        customer(Contract::TwoYear, PaymentMethod::MailedCheck, InternetService::NoService),
    ])
    .unwrap();
    let row = encoder
        .encode_record(&customer(Contract::TwoYear, PaymentMethod::MailedCheck, InternetService::Dsl))
        .unwrap();

    assert_eq!(row.len(), FEATURE_NAMES.len());
    assert_eq!(row, vec![10.0, 55.5, 560.0, 2.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn unseen_category_is_an_error() {
    let encoder = CategoricalEncoder::fit(&[customer(
        Contract::TwoYear,
        PaymentMethod::CreditCard,
        InternetService::Dsl,
    )])
    .unwrap();

    let err = encoder
        .encode_record(&customer(Contract::MonthToMonth, PaymentMethod::CreditCard, InternetService::Dsl))
        .unwrap_err();
    match err {
        PipelineError::UnknownCategory { column, label } => {
            assert_eq!(column, "Contract");
            assert_eq!(label, "Month-to-Month");
        }
        other => panic!("expected UnknownCategory, got {other:?}"),
    }
}

#[test]
fn fitting_on_nothing_is_an_error() {
    assert!(CategoricalEncoder::fit(&[]).is_err());
}
