//! Cats vs Dogs CLI
//!
//! Entry point for training, evaluating and running inference with the
//! cat/dog classifier built on the Burn framework.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use cats_vs_dogs::backend::{
    backend_name, default_device, DefaultBackend, ModelRecorder, TrainingBackend,
};
use cats_vs_dogs::dataset::{CatsDogsBatcher, CatsDogsDataset, Normalization, ResizeFilter};
use cats_vs_dogs::inference::Predictor;
use cats_vs_dogs::model::{CatDogClassifierConfig, TransferClassifierConfig};
use cats_vs_dogs::training::{self, TrainingConfig};
use cats_vs_dogs::utils::logging::{init_logging, LogConfig};

/// Cats vs Dogs binary image classification
#[derive(Parser, Debug)]
#[command(name = "cats_vs_dogs")]
#[command(version)]
#[command(about = "Cat/dog image classification with Burn", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a classifier
    Train {
        /// Path to the dataset directory (containing Cat/ and Dog/)
        #[arg(short, long, default_value = "data/pet_images")]
        data_dir: String,

        /// Train the transfer-learning variant instead of the baseline CNN
        #[arg(long, default_value = "false")]
        transfer: bool,

        /// Pretrained backbone weights for the transfer variant
        #[arg(long)]
        backbone: Option<String>,

        /// Number of training epochs (defaults to 10 baseline, 3 transfer)
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Batch size for training
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Learning rate (defaults to 1e-3 baseline, 1e-4 transfer)
        #[arg(short, long)]
        learning_rate: Option<f64>,

        /// Random seed for the split and the epoch shuffles
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Decode all images up front instead of per batch
        #[arg(long, default_value = "false")]
        cache_images: bool,

        /// Output directory for weights, history and charts
        #[arg(short, long, default_value = "output/models")]
        output_dir: String,
    },

    /// Evaluate a trained model on the held-out test split
    Eval {
        /// Path to the dataset directory
        #[arg(short, long, default_value = "data/pet_images")]
        data_dir: String,

        /// Path to the trained model weights
        #[arg(short, long)]
        model: String,

        /// The model is the transfer-learning variant
        #[arg(long, default_value = "false")]
        transfer: bool,

        /// Seed used when the model was trained (selects the same test split)
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Batch size for evaluation
        #[arg(short, long, default_value = "32")]
        batch_size: usize,
    },

    /// Classify a single image
    Infer {
        /// Path to the image file
        #[arg(short, long)]
        input: String,

        /// Path to the trained model weights
        #[arg(short, long)]
        model: String,

        /// The model is the transfer-learning variant
        #[arg(long, default_value = "false")]
        transfer: bool,

        /// Resize filter (nearest, area, bicubic)
        #[arg(short, long, default_value = "nearest")]
        filter: String,

        /// Classify under every resize filter and compare
        #[arg(long, default_value = "false")]
        compare_filters: bool,
    },

    /// Show dataset statistics
    Stats {
        /// Path to the dataset directory
        #[arg(short, long, default_value = "data/pet_images")]
        data_dir: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let _ = init_logging(&log_config);

    print_banner();

    match cli.command {
        Commands::Train {
            data_dir,
            transfer,
            backbone,
            epochs,
            batch_size,
            learning_rate,
            seed,
            cache_images,
            output_dir,
        } => {
            let mut config = if transfer {
                TrainingConfig::transfer()
            } else {
                TrainingConfig::baseline()
            };
            if let Some(epochs) = epochs {
                config.epochs = epochs;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            if let Some(learning_rate) = learning_rate {
                config.learning_rate = learning_rate;
            }
            config.seed = seed;
            config.cache_images = cache_images;

            cmd_train(
                &data_dir,
                &output_dir,
                transfer,
                backbone.as_deref(),
                &config,
            )?;
        }

        Commands::Eval {
            data_dir,
            model,
            transfer,
            seed,
            batch_size,
        } => {
            cmd_eval(&data_dir, &model, transfer, seed, batch_size)?;
        }

        Commands::Infer {
            input,
            model,
            transfer,
            filter,
            compare_filters,
        } => {
            cmd_infer(&input, &model, transfer, &filter, compare_filters)?;
        }

        Commands::Stats { data_dir } => {
            cmd_stats(&data_dir)?;
        }
    }

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        r#"
 ╔══════════════════════════════════════════════════╗
 ║   🐱🐶 Cats vs Dogs                              ║
 ║   Binary image classification with Burn + Rust   ║
 ╚══════════════════════════════════════════════════╝
  "#
        .green()
    );
}

fn cmd_train(
    data_dir: &str,
    output_dir: &str,
    transfer: bool,
    backbone: Option<&str>,
    config: &TrainingConfig,
) -> Result<()> {
    let variant = if transfer { "transfer" } else { "baseline" };
    info!("Training {} model", variant);

    println!("{}", "Training Configuration:".cyan().bold());
    println!("  📁 Data directory:  {}", data_dir);
    println!("  🧠 Variant:         {}", variant);
    println!("  🔁 Epochs:          {}", config.epochs);
    println!("  📦 Batch size:      {}", config.batch_size);
    println!("  📈 Learning rate:   {}", config.learning_rate);
    println!("  🎲 Seed:            {}", config.seed);
    println!("  💾 Output:          {}", output_dir);
    println!("  🖥️  Backend:         {}", backend_name());
    println!();

    let device = default_device();
    let history = if transfer {
        training::run_transfer_training::<TrainingBackend>(
            Path::new(data_dir),
            Path::new(output_dir),
            backbone.map(Path::new),
            config,
            &device,
        )?
    } else {
        training::run_baseline_training::<TrainingBackend>(
            Path::new(data_dir),
            Path::new(output_dir),
            config,
            &device,
        )?
    };

    println!();
    println!("{}", "Training complete!".green().bold());
    if let Some(acc) = history.final_val_accuracy() {
        println!("  Final validation accuracy: {:.2}%", acc * 100.0);
    }
    if let Some(best) = history.best_val_accuracy() {
        println!("  Best validation accuracy:  {:.2}%", best * 100.0);
    }

    Ok(())
}

fn cmd_eval(
    data_dir: &str,
    model_path: &str,
    transfer: bool,
    seed: u64,
    batch_size: usize,
) -> Result<()> {
    use burn::module::Module;

    info!("Evaluating model: {}", model_path);

    if !Path::new(model_path).exists() {
        println!("{} Model not found: {}", "Error:".red(), model_path);
        anyhow::bail!("model not found: {}", model_path);
    }

    let device = default_device();
    let config = TrainingConfig {
        seed,
        batch_size,
        ..TrainingConfig::baseline()
    };
    let (_, test_dataset) = training::prepare_datasets(Path::new(data_dir), &config)?;
    let recorder = ModelRecorder::new();

    let (loss, metrics) = if transfer {
        let model = TransferClassifierConfig::default()
            .init::<DefaultBackend>(&device)
            .load_file(model_path, &recorder, &device)
            .map_err(|e| anyhow::anyhow!("Failed to load model: {:?}", e))?;
        let batcher = CatsDogsBatcher::new(device.clone(), Normalization::Signed);
        training::evaluate(&model, &test_dataset, &batcher, batch_size, &device)
    } else {
        let model = CatDogClassifierConfig::new()
            .init::<DefaultBackend>(&device)
            .load_file(model_path, &recorder, &device)
            .map_err(|e| anyhow::anyhow!("Failed to load model: {:?}", e))?;
        let batcher = CatsDogsBatcher::new(device.clone(), Normalization::UnitInterval);
        training::evaluate(&model, &test_dataset, &batcher, batch_size, &device)
    };

    println!("{}", metrics.with_loss(loss));

    Ok(())
}

fn cmd_infer(
    input: &str,
    model_path: &str,
    transfer: bool,
    filter: &str,
    compare_filters: bool,
) -> Result<()> {
    use burn::module::Module;

    info!("Running inference on {}", input);

    println!("{}", "Inference Configuration:".cyan().bold());
    println!("  📷 Input:   {}", input);
    println!("  🧠 Model:   {}", model_path);
    println!("  🖥️  Backend: {}", backend_name());
    println!();

    if !Path::new(model_path).exists() {
        println!("{} Model not found: {}", "Error:".red(), model_path);
        anyhow::bail!("model not found: {}", model_path);
    }

    let filter: ResizeFilter = filter
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let device = default_device();
    let recorder = ModelRecorder::new();
    let input_path = PathBuf::from(input);

    if transfer {
        let model = TransferClassifierConfig::default()
            .init::<DefaultBackend>(&device)
            .load_file(model_path, &recorder, &device)
            .map_err(|e| anyhow::anyhow!("Failed to load model: {:?}", e))?;
        let predictor = Predictor::new(model, device, Normalization::Signed);
        run_prediction(&predictor, &input_path, filter, compare_filters)
    } else {
        let model = CatDogClassifierConfig::new()
            .init::<DefaultBackend>(&device)
            .load_file(model_path, &recorder, &device)
            .map_err(|e| anyhow::anyhow!("Failed to load model: {:?}", e))?;
        let predictor = Predictor::new(model, device, Normalization::UnitInterval);
        run_prediction(&predictor, &input_path, filter, compare_filters)
    }
}

fn run_prediction<M: cats_vs_dogs::model::ProbabilityModel<DefaultBackend>>(
    predictor: &Predictor<DefaultBackend, M>,
    input: &Path,
    filter: ResizeFilter,
    compare_filters: bool,
) -> Result<()> {
    if compare_filters {
        println!("{}", "Resize filter comparison:".cyan().bold());
        for comparison in predictor.compare_filters(input)? {
            println!("  {:8} {}", comparison.filter, comparison.prediction);
        }
    } else {
        let prediction = predictor.predict_with_filter(input, filter)?;
        println!("📷 {}", input.display());
        println!("  Predicted: {}", prediction.label.to_string().yellow());
        println!("  Dog probability: {:.4}", prediction.probability);
        println!("  Confidence: {:.1}%", prediction.confidence() * 100.0);
        println!("  Time: {:.2}ms", prediction.inference_time_ms);
    }

    Ok(())
}

fn cmd_stats(data_dir: &str) -> Result<()> {
    info!("Computing dataset statistics for: {}", data_dir);

    if !Path::new(data_dir).exists() {
        println!("{} Dataset directory not found: {}", "Error:".red(), data_dir);
        println!();
        println!("Expected structure:");
        println!("  {}/", data_dir);
        println!("  ├── Cat/");
        println!("  └── Dog/");
        return Ok(());
    }

    let dataset = CatsDogsDataset::new(data_dir)?;
    dataset.stats().print();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_missing_model_is_error() {
        let result = cmd_eval("data/pet_images", "/no/such/model.bin", false, 42, 4);
        assert!(result.is_err());
    }

    #[test]
    fn test_infer_missing_model_is_error() {
        let result = cmd_infer("pet.jpg", "/no/such/model.bin", false, "nearest", false);
        assert!(result.is_err());
    }
}
