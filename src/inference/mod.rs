//! Inference on single images

pub mod predictor;

pub use predictor::{FilterComparison, Prediction, Predictor};
