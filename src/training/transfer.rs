//! Transfer-learning training loop
//!
//! Fine-tunes only the linear head on top of a frozen pretrained backbone.
//! The loss is binary cross-entropy applied to raw logits, inputs are
//! rescaled to [-1, 1], and the optimizer is RMSprop at a low learning rate.

use std::path::Path;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::module::AutodiffModule;
use burn::nn::loss::BinaryCrossEntropyLossConfig;
use burn::optim::{GradientsParams, Optimizer, RmsPropConfig};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use super::baseline::{prepare_datasets, save_artifacts};
use super::{evaluate, EpochMetrics, TrainingConfig, TrainingHistory, TRANSFER_MODEL_FILE};
use crate::dataset::{CatsDogsBatch, CatsDogsBatcher, Normalization};
use crate::model::TransferClassifierConfig;
use crate::utils::error::Result;
use crate::utils::logging::TrainingLogger;

/// Train the transfer classifier and save model, history and accuracy chart
///
/// When `backbone_weights` is `None` the backbone starts from random weights,
/// which is only useful for smoke-testing the pipeline.
pub fn run_transfer_training<B: AutodiffBackend>(
    data_dir: &Path,
    output_dir: &Path,
    backbone_weights: Option<&Path>,
    config: &TrainingConfig,
    device: &B::Device,
) -> Result<TrainingHistory> {
    info!("Starting transfer training");

    let (train_dataset, val_dataset) = prepare_datasets(data_dir, config)?;
    let batcher = CatsDogsBatcher::<B>::new(device.clone(), Normalization::Signed);
    let valid_batcher =
        CatsDogsBatcher::<B::InnerBackend>::new(device.clone(), Normalization::Signed);

    let model_config = TransferClassifierConfig::default();
    let mut model = match backbone_weights {
        Some(path) => model_config.init_pretrained::<B>(path, device)?,
        None => {
            warn!("No pretrained backbone given; training from random features");
            model_config.init::<B>(device)
        }
    };

    let mut optimizer = RmsPropConfig::new().init();
    let loss_fn = BinaryCrossEntropyLossConfig::new()
        .with_logits(true)
        .init(device);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut logger = TrainingLogger::new(config.epochs);
    let mut history = TrainingHistory::new("transfer");

    for epoch in 0..config.epochs {
        logger.start_epoch(epoch);

        let mut indices: Vec<usize> = (0..train_dataset.len()).collect();
        indices.shuffle(&mut rng);

        let mut epoch_loss = 0.0;
        let mut correct = 0i64;
        let mut seen = 0usize;

        for chunk in indices.chunks(config.batch_size) {
            let items: Vec<_> = chunk.iter().filter_map(|&i| train_dataset.get(i)).collect();
            if items.is_empty() {
                continue;
            }
            let count = items.len();

            let batch: CatsDogsBatch<B> = batcher.batch(items);
            let logits = model.forward(batch.images).squeeze::<1>(1);

            let loss = loss_fn.forward(logits.clone(), batch.targets.clone());
            epoch_loss += loss.clone().into_scalar().elem::<f64>() * count as f64;
            seen += count;

            // A non-negative logit is a probability >= 0.5
            correct += logits
                .greater_equal_elem(0.0)
                .int()
                .equal(batch.targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);
        }

        let train_loss = epoch_loss / seen.max(1) as f64;
        let train_accuracy = correct as f64 / seen.max(1) as f64;

        let (val_loss, val_metrics) = evaluate(
            &model.valid(),
            &val_dataset,
            &valid_batcher,
            config.batch_size,
            device,
        );

        logger.end_epoch(train_loss, train_accuracy, val_loss, val_metrics.accuracy);
        history.push(EpochMetrics {
            epoch: epoch + 1,
            train_loss,
            train_accuracy,
            val_loss,
            val_accuracy: val_metrics.accuracy,
        });
    }

    logger.log_complete(history.final_val_accuracy().unwrap_or(0.0));

    save_artifacts(&model, &history, output_dir, TRANSFER_MODEL_FILE)?;

    Ok(history)
}
