//! # Cats vs Dogs
//!
//! A binary image classifier built with the Burn framework that distinguishes
//! cats from dogs. Two model variants are provided:
//!
//! - a small CNN trained from scratch on probabilities with a sigmoid output
//! - a transfer-learning variant that freezes a pretrained convolutional
//!   backbone and trains only a new pooling + linear head on raw logits
//!
//! ## Modules
//!
//! - `dataset`: directory scanning, seeded train/test splitting, Burn dataset
//!   and batcher integration
//! - `model`: the baseline CNN and the frozen-backbone transfer classifier
//! - `training`: custom training loops, per-epoch history, evaluation
//! - `inference`: single-image prediction with the training-time transform
//! - `utils`: logging, errors, binary metrics, SVG charts
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! use cats_vs_dogs::backend::{default_device, TrainingBackend};
//! use cats_vs_dogs::training::{run_baseline_training, TrainingConfig};
//!
//! let config = TrainingConfig::baseline();
//! let history = run_baseline_training::<TrainingBackend>(
//!     Path::new("data/pet_images"),
//!     Path::new("artifacts"),
//!     &config,
//!     &default_device(),
//! )?;
//! println!("final val accuracy: {:?}", history.final_val_accuracy());
//! ```

pub mod backend;
pub mod dataset;
pub mod inference;
pub mod model;
pub mod training;
pub mod utils;

// Re-export commonly used items for convenience
pub use dataset::burn_dataset::{
    CatsDogsBatch, CatsDogsBatcher, CatsDogsBurnDataset, CatsDogsItem, Normalization,
};
pub use dataset::loader::CatsDogsDataset;
pub use dataset::split::{SplitConfig, TrainTestSplit};
pub use dataset::{Label, ResizeFilter};
pub use inference::predictor::{Prediction, Predictor};
pub use model::cnn::{CatDogClassifier, CatDogClassifierConfig};
pub use model::transfer::{TransferClassifier, TransferClassifierConfig};
pub use model::ProbabilityModel;
pub use training::history::TrainingHistory;
pub use training::TrainingConfig;
pub use utils::error::{CatsDogsError, Result};
pub use utils::metrics::{BinaryMetrics, ConfusionMatrix};

/// Number of classes (cat, dog)
pub const NUM_CLASSES: usize = 2;

/// Square image resolution used for training and inference
pub const IMAGE_SIZE: usize = 250;

/// Probability threshold separating the two classes
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
