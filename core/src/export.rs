//! CSV writers for the two tabular artifacts.
//!
//! Both take any `io::Write` so callers choose the destination; the
//! runner passes files, tests pass byte buffers.

use crate::{customer::CustomerRecord, error::PipelineResult, risk::AtRiskCustomer};
use serde::Serialize;
use std::io;

pub const CUSTOMER_DATA_FILE: &str = "customer_data.csv";
pub const AT_RISK_FILE: &str = "at_risk_customers.csv";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

pub const CUSTOMER_COLUMNS: [&str; 12] = [
    "CustomerID",
    "Tenure",
    "MonthlyCharges",
    "TotalCharges",
    "NumProducts",
    "SupportCalls",
    "Contract",
    "PaymentMethod",
    "InternetService",
    "SeniorCitizen",
    "Partner",
    "Churn",
];

pub const AT_RISK_COLUMNS: [&str; 6] = [
    "CustomerID",
    "Tenure",
    "MonthlyCharges",
    "Contract",
    "SupportCalls",
    "ChurnProbability",
];

/// Base columns only, header first, in table order.
pub fn write_customers_csv<W: io::Write>(writer: W, customers: &[CustomerRecord]) -> PipelineResult<()> {
    write_rows(writer, &CUSTOMER_COLUMNS, customers)
}

pub fn write_at_risk_csv<W: io::Write>(writer: W, rows: &[AtRiskCustomer]) -> PipelineResult<()> {
    write_rows(writer, &AT_RISK_COLUMNS, rows)
}

/// The header is written up front so an empty table still yields it.
fn write_rows<W: io::Write, T: Serialize>(writer: W, header: &[&str], rows: &[T]) -> PipelineResult<()> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    out.write_record(header)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Render the customer table to CSV bytes.
pub fn customers_csv_bytes(customers: &[CustomerRecord]) -> PipelineResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_customers_csv(&mut buf, customers)?;
    Ok(buf)
}
