//! Baseline training loop
//!
//! Trains the from-scratch CNN with Adam and binary cross-entropy on the
//! sigmoid probabilities. The held-out test split doubles as the per-epoch
//! validation set.

use std::path::Path;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::module::AutodiffModule;
use burn::nn::loss::BinaryCrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use super::{
    evaluate, EpochMetrics, TrainingConfig, TrainingHistory, ACCURACY_CHART_FILE,
    BASELINE_MODEL_FILE, HISTORY_FILE,
};
use crate::backend::ModelRecorder;
use crate::dataset::{
    CatsDogsBatch, CatsDogsBatcher, CatsDogsBurnDataset, CatsDogsDataset, Normalization,
    SplitConfig, TrainTestSplit,
};
use crate::model::CatDogClassifierConfig;
use crate::utils::error::{CatsDogsError, Result};
use crate::utils::logging::TrainingLogger;
use crate::IMAGE_SIZE;

/// Train the baseline CNN and save model, history and accuracy chart
pub fn run_baseline_training<B: AutodiffBackend>(
    data_dir: &Path,
    output_dir: &Path,
    config: &TrainingConfig,
    device: &B::Device,
) -> Result<TrainingHistory> {
    info!("Starting baseline training");

    let (train_dataset, val_dataset) = prepare_datasets(data_dir, config)?;
    let batcher = CatsDogsBatcher::<B>::new(device.clone(), Normalization::UnitInterval);
    let valid_batcher =
        CatsDogsBatcher::<B::InnerBackend>::new(device.clone(), Normalization::UnitInterval);

    let model_config = CatDogClassifierConfig::new().with_input_size(IMAGE_SIZE);
    let mut model = model_config.init::<B>(device);
    let mut optimizer = AdamConfig::new().init();
    let loss_fn = BinaryCrossEntropyLossConfig::new().init(device);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut logger = TrainingLogger::new(config.epochs);
    let mut history = TrainingHistory::new("baseline");

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
            let probs = model.forward(batch.images).squeeze::<1>(1);

            let loss = loss_fn.forward(probs.clone(), batch.targets.clone());
            epoch_loss += loss.clone().into_scalar().elem::<f64>() * count as f64;
            seen += count;

            correct += probs
                .greater_equal_elem(crate::DECISION_THRESHOLD)
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

    save_artifacts(&model, &history, output_dir, BASELINE_MODEL_FILE)?;

    Ok(history)
}

/// Load the dataset, split it and wrap both halves for Burn
pub fn prepare_datasets(
    data_dir: &Path,
    config: &TrainingConfig,
) -> Result<(CatsDogsBurnDataset, CatsDogsBurnDataset)> {
    let dataset = CatsDogsDataset::new(data_dir)
        .map_err(|e| CatsDogsError::Dataset(e.to_string()))?;
    dataset.stats().print();

    let split = TrainTestSplit::from_samples(dataset.samples, SplitConfig::with_seed(config.seed))?;
    info!("{}", split.stats());

    let make = |samples: &[crate::dataset::ImageSample]| -> Result<CatsDogsBurnDataset> {
        if config.cache_images {
            let pairs = samples.iter().map(|s| (s.path.clone(), s.label)).collect();
            CatsDogsBurnDataset::new_cached(pairs, IMAGE_SIZE)
                .map_err(|e| CatsDogsError::Dataset(e.to_string()))
        } else {
            Ok(CatsDogsBurnDataset::from_samples(samples, IMAGE_SIZE))
        }
    };

    Ok((make(&split.train)?, make(&split.test)?))
}

/// Save weights, history JSON and the accuracy chart into `output_dir`
pub(crate) fn save_artifacts<M: burn::module::Module<B>, B: Backend>(
    model: &M,
    history: &TrainingHistory,
    output_dir: &Path,
    model_stem: &str,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;

    model
        .clone()
        .save_file(output_dir.join(model_stem), &ModelRecorder::new())
        .map_err(|e| CatsDogsError::Model(format!("Failed to save model: {}", e)))?;

    history.save(&output_dir.join(HISTORY_FILE))?;
    history.write_accuracy_chart(&output_dir.join(ACCURACY_CHART_FILE))?;

    info!("Artifacts written to {:?}", output_dir);
    Ok(())
}
