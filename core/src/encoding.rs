//! Feature encoding shared by training and population scoring.
//!
//! RULE: exactly one `CategoricalEncoder` is fitted per run, and every
//! feature matrix (training, test, cross-validation, full-population
//! scoring) is produced by `encode_table` with that same encoder.
//! There is no second encoding path that could drift out of alignment.

use crate::{
    customer::CustomerRecord,
    error::{PipelineError, PipelineResult},
    features::FeatureMatrix,
    types::Label,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Model input columns, in matrix column order. `CustomerID` is dropped.
pub const FEATURE_NAMES: [&str; 10] = [
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
];

pub const CATEGORICAL_COLUMNS: [&str; 3] = ["Contract", "PaymentMethod", "InternetService"];

/// Sorted distinct labels of one categorical column; a label's code is
/// its index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    pub column: String,
    pub labels: Vec<String>,
}

impl CategoryMapping {
    pub fn code_of(&self, label: &str) -> Option<u32> {
        self.labels
            .binary_search_by(|l| l.as_str().cmp(label))
            .ok()
            .map(|i| i as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    mappings: Vec<CategoryMapping>,
}

impl CategoricalEncoder {
    /// Learn the label → code mapping from the values present in `customers`.
    pub fn fit(customers: &[CustomerRecord]) -> PipelineResult<Self> {
        if customers.is_empty() {
            return Err(PipelineError::EmptyInput {
                what: "encoder fit table".into(),
            });
        }
        let mappings = CATEGORICAL_COLUMNS
            .iter()
            .map(|&column| {
                let distinct: BTreeSet<&str> =
                    customers.iter().map(|c| category_label(c, column)).collect();
                CategoryMapping {
                    column: column.to_string(),
                    labels: distinct.into_iter().map(str::to_string).collect(),
                }
            })
            .collect();
        Ok(Self { mappings })
    }

    pub fn mappings(&self) -> &[CategoryMapping] {
        &self.mappings
    }

    pub fn mapping(&self, column: &str) -> Option<&CategoryMapping> {
        self.mappings.iter().find(|m| m.column == column)
    }

    pub fn encode(&self, column: &str, label: &str) -> PipelineResult<u32> {
        self.mapping(column)
            .and_then(|m| m.code_of(label))
            .ok_or_else(|| PipelineError::UnknownCategory {
                column: column.to_string(),
                label: label.to_string(),
            })
    }

    /// Encode one record into a row in `FEATURE_NAMES` order.
    pub fn encode_record(&self, c: &CustomerRecord) -> PipelineResult<Vec<f64>> {
        Ok(vec![
            f64::from(c.tenure),
            c.monthly_charges,
            c.total_charges,
            f64::from(c.num_products),
            f64::from(c.support_calls),
            f64::from(self.encode("Contract", c.contract.label())?),
            f64::from(self.encode("PaymentMethod", c.payment_method.label())?),
            f64::from(self.encode("InternetService", c.internet_service.label())?),
            f64::from(c.senior_citizen),
            f64::from(c.partner),
        ])
    }

    pub fn encode_table(&self, customers: &[CustomerRecord]) -> PipelineResult<EncodedTable> {
        let rows = customers
            .iter()
            .map(|c| self.encode_record(c))
            .collect::<PipelineResult<Vec<_>>>()?;
        Ok(EncodedTable {
            features: FeatureMatrix::from_rows(rows)?,
            labels:   customers.iter().map(|c| c.churn).collect(),
        })
    }
}

/// Encoded features plus labels, row-aligned with the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTable {
    pub features: FeatureMatrix,
    pub labels:   Vec<Label>,
}

fn category_label<'c>(c: &'c CustomerRecord, column: &str) -> &'c str {
    match column {
        "Contract"        => c.contract.label(),
        "PaymentMethod"   => c.payment_method.label(),
        "InternetService" => c.internet_service.label(),
        other             => unreachable!("not a categorical column: {other}"),
    }
}
