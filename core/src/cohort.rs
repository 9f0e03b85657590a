//! Cohort analysis: tenure and charge buckets, and churn rate per
//! (tenure bucket × contract) cell.

use crate::customer::{Contract, CustomerRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Right-closed tenure bins: (0,12], (12,24], … (60,72].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TenureBucket {
    #[serde(rename = "0-12m")]
    UpTo12,
    #[serde(rename = "13-24m")]
    UpTo24,
    #[serde(rename = "25-36m")]
    UpTo36,
    #[serde(rename = "37-48m")]
    UpTo48,
    #[serde(rename = "49-60m")]
    UpTo60,
    #[serde(rename = "61-72m")]
    UpTo72,
}

impl TenureBucket {
    pub const ALL: [TenureBucket; 6] = [
        Self::UpTo12,
        Self::UpTo24,
        Self::UpTo36,
        Self::UpTo48,
        Self::UpTo60,
        Self::UpTo72,
    ];

    /// `None` outside (0, 72].
    pub fn of(tenure: u32) -> Option<Self> {
        match tenure {
            1..=12  => Some(Self::UpTo12),
            13..=24 => Some(Self::UpTo24),
            25..=36 => Some(Self::UpTo36),
            37..=48 => Some(Self::UpTo48),
            49..=60 => Some(Self::UpTo60),
            61..=72 => Some(Self::UpTo72),
            _       => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpTo12 => "0-12m",
            Self::UpTo24 => "13-24m",
            Self::UpTo36 => "25-36m",
            Self::UpTo48 => "37-48m",
            Self::UpTo60 => "49-60m",
            Self::UpTo72 => "61-72m",
        }
    }
}

/// Right-closed charge bins: (0,40], (40,70], (70,100], (100,120].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChargeBucket {
    Low,
    Medium,
    High,
    Premium,
}

impl ChargeBucket {
    pub const ALL: [ChargeBucket; 4] = [Self::Low, Self::Medium, Self::High, Self::Premium];

    /// `None` outside (0, 120].
    pub fn of(monthly_charges: f64) -> Option<Self> {
        if monthly_charges <= 0.0 {
            None
        } else if monthly_charges <= 40.0 {
            Some(Self::Low)
        } else if monthly_charges <= 70.0 {
            Some(Self::Medium)
        } else if monthly_charges <= 100.0 {
            Some(Self::High)
        } else if monthly_charges <= 120.0 {
            Some(Self::Premium)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low     => "Low",
            Self::Medium  => "Medium",
            Self::High    => "High",
            Self::Premium => "Premium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortCell {
    pub tenure_bucket: TenureBucket,
    pub contract:      Contract,
    pub customers:     usize,
    pub churned:       usize,
    pub churn_rate:    f64,
}

/// Observed (tenure bucket, contract) cells only; empty cells are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortMatrix {
    pub cells: Vec<CohortCell>,
}

impl CohortMatrix {
    pub fn build(customers: &[CustomerRecord]) -> Self {
        let mut counts: BTreeMap<(TenureBucket, Contract), (usize, usize)> = BTreeMap::new();
        for c in customers {
            let Some(bucket) = TenureBucket::of(c.tenure) else {
                continue;
            };
            let entry = counts.entry((bucket, c.contract)).or_default();
            entry.0 += 1;
            entry.1 += usize::from(c.churned());
        }
        let cells = counts
            .into_iter()
            .map(|((tenure_bucket, contract), (customers, churned))| CohortCell {
                tenure_bucket,
                contract,
                customers,
                churned,
                churn_rate: churned as f64 / customers as f64,
            })
            .collect();
        Self { cells }
    }

    /// Churn rate of one cell, `None` if no customer falls in it.
    pub fn rate(&self, bucket: TenureBucket, contract: Contract) -> Option<f64> {
        self.cells
            .iter()
            .find(|c| c.tenure_bucket == bucket && c.contract == contract)
            .map(|c| c.churn_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeBucketRate {
    pub bucket:     ChargeBucket,
    pub customers:  usize,
    pub churn_rate: f64,
}

/// Churn rate per charge bucket, in bucket order, empty buckets skipped.
pub fn churn_by_charge_bucket(customers: &[CustomerRecord]) -> Vec<ChargeBucketRate> {
    let mut counts: BTreeMap<ChargeBucket, (usize, usize)> = BTreeMap::new();
    for c in customers {
        if let Some(bucket) = ChargeBucket::of(c.monthly_charges) {
            let entry = counts.entry(bucket).or_default();
            entry.0 += 1;
            entry.1 += usize::from(c.churned());
        }
    }
    counts
        .into_iter()
        .map(|(bucket, (n, churned))| ChargeBucketRate {
            bucket,
            customers: n,
            churn_rate: churned as f64 / n as f64,
        })
        .collect()
}
