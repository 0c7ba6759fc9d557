//! Shared utilities: error types, logging, evaluation metrics, and charts.

pub mod charts;
pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{CatsDogsError, Result};
pub use metrics::{BinaryMetrics, ConfusionMatrix};
