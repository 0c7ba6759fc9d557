//! Training pipelines
//!
//! Two variants share the same data pipeline and evaluation:
//! - [`baseline`]: the CNN trained from scratch with Adam
//! - [`transfer`]: a frozen pretrained backbone with a trainable linear head,
//!   trained with RMSprop at a low learning rate

pub mod baseline;
pub mod history;
pub mod transfer;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::nn::loss::BinaryCrossEntropyLossConfig;
use burn::prelude::*;
use serde::{Deserialize, Serialize};

pub use baseline::{prepare_datasets, run_baseline_training};
pub use history::{EpochMetrics, TrainingHistory};
pub use transfer::run_transfer_training;

use crate::dataset::{CatsDogsBatch, CatsDogsBatcher, CatsDogsBurnDataset};
use crate::model::ProbabilityModel;
use crate::utils::metrics::BinaryMetrics;

/// File stem of the saved baseline model (the recorder adds `.bin`)
pub const BASELINE_MODEL_FILE: &str = "c_vs_d";
/// File stem of the saved transfer model
pub const TRANSFER_MODEL_FILE: &str = "cats_vs_dogs";
/// History JSON written next to the weights
pub const HISTORY_FILE: &str = "history.json";
/// Accuracy chart written next to the weights
pub const ACCURACY_CHART_FILE: &str = "accuracy.svg";

/// Hyperparameters of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of epochs
    pub epochs: usize,
    /// Batch size
    pub batch_size: usize,
    /// Learning rate
    pub learning_rate: f64,
    /// Seed driving the split and the per-epoch shuffles
    pub seed: u64,
    /// Decode all images up front instead of per batch
    pub cache_images: bool,
}

impl TrainingConfig {
    /// Hyperparameters for training the baseline CNN from scratch
    pub fn baseline() -> Self {
        Self {
            epochs: 10,
            batch_size: 32,
            learning_rate: 1e-3,
            seed: 42,
            cache_images: false,
        }
    }

    /// Hyperparameters for fine-tuning the transfer head
    pub fn transfer() -> Self {
        Self {
            epochs: 3,
            learning_rate: 1e-4,
            ..Self::baseline()
        }
    }
}

/// Evaluate a model on a dataset, returning mean loss and binary metrics
///
/// Loss is binary cross-entropy computed from the model's probabilities,
/// which matches the with-logits loss used when training the transfer head.
pub fn evaluate<B: Backend, M: ProbabilityModel<B>>(
    model: &M,
    dataset: &CatsDogsBurnDataset,
    batcher: &CatsDogsBatcher<B>,
    batch_size: usize,
    device: &B::Device,
) -> (f64, BinaryMetrics) {
    let loss_fn = BinaryCrossEntropyLossConfig::new().init(device);

    let mut total_loss = 0.0;
    let mut total_items = 0usize;
    let mut predictions = Vec::with_capacity(dataset.len());
    let mut targets = Vec::with_capacity(dataset.len());

    let indices: Vec<usize> = (0..dataset.len()).collect();
    for chunk in indices.chunks(batch_size) {
        let items: Vec<_> = chunk.iter().filter_map(|&i| dataset.get(i)).collect();
        if items.is_empty() {
            continue;
        }
        let count = items.len();

        targets.extend(items.iter().map(|item| item.label));

        let batch: CatsDogsBatch<B> = batcher.batch(items);
        let probs = model.probability(batch.images).squeeze::<1>(1);

        let loss = loss_fn.forward(probs.clone(), batch.targets);
        total_loss += loss.into_scalar().elem::<f64>() * count as f64;
        total_items += count;

        let probs_vec: Vec<f32> = probs.into_data().to_vec().unwrap_or_default();
        predictions.extend(
            probs_vec
                .iter()
                .map(|&p| usize::from(p >= crate::DECISION_THRESHOLD)),
        );
    }

    let mean_loss = if total_items > 0 {
        total_loss / total_items as f64
    } else {
        0.0
    };

    (mean_loss, BinaryMetrics::from_predictions(&predictions, &targets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_preset() {
        let config = TrainingConfig::baseline();
        assert_eq!(config.epochs, 10);
        assert_eq!(config.batch_size, 32);
        assert!((config.learning_rate - 1e-3).abs() < 1e-12);
    }

    #[test]
    fn test_transfer_preset() {
        let config = TrainingConfig::transfer();
        assert_eq!(config.epochs, 3);
        assert!((config.learning_rate - 1e-4).abs() < 1e-12);
    }
}
