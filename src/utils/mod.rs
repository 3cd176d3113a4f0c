//! Shared utilities

pub mod metrics;

pub use metrics::{mse, rmse, vaf};
