//! The customer record and its categorical columns.

use crate::types::{CustomerId, Label};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Contract {
    #[serde(rename = "Month-to-Month")]
    MonthToMonth,
    #[serde(rename = "One Year")]
    OneYear,
    #[serde(rename = "Two Year")]
    TwoYear,
}

impl Contract {
    /// Same order as `GeneratorConfig::contract_weights`.
    pub const ALL: [Contract; 3] = [Self::MonthToMonth, Self::OneYear, Self::TwoYear];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MonthToMonth => "Month-to-Month",
            Self::OneYear      => "One Year",
            Self::TwoYear      => "Two Year",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    #[serde(rename = "Electronic Check")]
    ElectronicCheck,
    #[serde(rename = "Mailed Check")]
    MailedCheck,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Credit Card")]
    CreditCard,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        Self::ElectronicCheck,
        Self::MailedCheck,
        Self::BankTransfer,
        Self::CreditCard,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ElectronicCheck => "Electronic Check",
            Self::MailedCheck     => "Mailed Check",
            Self::BankTransfer    => "Bank Transfer",
            Self::CreditCard      => "Credit Card",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InternetService {
    #[serde(rename = "DSL")]
    Dsl,
    #[serde(rename = "Fiber Optic")]
    FiberOptic,
    #[serde(rename = "No")]
    NoService,
}

impl InternetService {
    /// Same order as `GeneratorConfig::internet_weights`.
    pub const ALL: [InternetService; 3] = [Self::Dsl, Self::FiberOptic, Self::NoService];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dsl        => "DSL",
            Self::FiberOptic => "Fiber Optic",
            Self::NoService  => "No",
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for InternetService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One synthetic customer. Field order is the CSV column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerRecord {
    #[serde(rename = "CustomerID")]
    pub customer_id:      CustomerId,
    #[serde(rename = "Tenure")]
    pub tenure:           u32,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges:  f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges:    f64,
    #[serde(rename = "NumProducts")]
    pub num_products:     u32,
    #[serde(rename = "SupportCalls")]
    pub support_calls:    u32,
    #[serde(rename = "Contract")]
    pub contract:         Contract,
    #[serde(rename = "PaymentMethod")]
    pub payment_method:   PaymentMethod,
    #[serde(rename = "InternetService")]
    pub internet_service: InternetService,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen:   u8,
    #[serde(rename = "Partner")]
    pub partner:          u8,
    #[serde(rename = "Churn")]
    pub churn:            Label,
}

impl CustomerRecord {
    pub fn churned(&self) -> bool {
        self.churn == 1
    }
}

/// Labels of a table in row order.
pub fn labels(customers: &[CustomerRecord]) -> Vec<Label> {
    customers.iter().map(|c| c.churn).collect()
}
