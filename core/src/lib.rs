//! churnlab-core: synthetic customer churn analysis pipeline.
//!
//! Everything in this crate is pure computation over in-memory values.
//! Rendering and file placement live in the `churn-runner` binary.

pub mod classifier;
pub mod cohort;
pub mod config;
pub mod customer;
pub mod eda;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod event;
pub mod export;
pub mod features;
pub mod generator;
pub mod impact;
pub mod logistic;
pub mod metrics;
pub mod model_selection;
pub mod rng;
pub mod risk;
pub mod scaler;
pub mod summary;
pub mod types;
