//! Training history
//!
//! Append-only record of per-epoch metrics, persisted as JSON next to the
//! model weights and renderable as an accuracy chart.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::charts::{self, DataSeries};
use crate::utils::error::{CatsDogsError, Result};

/// Metrics collected for a single epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub train_loss: f64,
    /// Training accuracy as a fraction in [0, 1]
    pub train_accuracy: f64,
    pub val_loss: f64,
    /// Validation accuracy as a fraction in [0, 1]
    pub val_accuracy: f64,
}

/// Complete history of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Human-readable run name ("baseline" or "transfer")
    pub run_name: String,
    /// Timestamp when the run started
    pub started_at: String,
    /// Per-epoch metrics in epoch order
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    /// Start a new empty history
    pub fn new(run_name: &str) -> Self {
        Self {
            run_name: run_name.to_string(),
            started_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            epochs: Vec::new(),
        }
    }

    /// Append one epoch's metrics
    pub fn push(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    /// Best validation accuracy across all epochs
    pub fn best_val_accuracy(&self) -> Option<f64> {
        self.epochs
            .iter()
            .map(|e| e.val_accuracy)
            .fold(None, |best, acc| match best {
                Some(b) if b >= acc => Some(b),
                _ => Some(acc),
            })
    }

    /// Validation accuracy of the last epoch
    pub fn final_val_accuracy(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.val_accuracy)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CatsDogsError::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously saved history
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| CatsDogsError::Serialization(e.to_string()))
    }

    /// Render the train/validation accuracy curves as an SVG chart
    pub fn write_accuracy_chart(&self, path: &Path) -> Result<()> {
        let train: Vec<f64> = self.epochs.iter().map(|e| e.train_accuracy * 100.0).collect();
        let val: Vec<f64> = self.epochs.iter().map(|e| e.val_accuracy * 100.0).collect();

        let series = vec![
            DataSeries::from_values("Training", &train, charts::COLOR_TRAINING),
            DataSeries::from_values("Validation", &val, charts::COLOR_VALIDATION),
        ];

        charts::generate_line_chart(
            &format!("Accuracy ({})", self.run_name),
            "Epoch",
            "Accuracy",
            &series,
            path,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> TrainingHistory {
        let mut history = TrainingHistory::new("baseline");
        for (i, (train, val)) in [(0.55, 0.52), (0.71, 0.66), (0.80, 0.69)].iter().enumerate() {
            history.push(EpochMetrics {
                epoch: i + 1,
                train_loss: 0.7 - 0.1 * i as f64,
                train_accuracy: *train,
                val_loss: 0.72 - 0.08 * i as f64,
                val_accuracy: *val,
            });
        }
        history
    }

    #[test]
    fn test_best_and_final_accuracy() {
        let history = sample_history();
        assert_eq!(history.best_val_accuracy(), Some(0.69));
        assert_eq!(history.final_val_accuracy(), Some(0.69));

        let empty = TrainingHistory::new("baseline");
        assert_eq!(empty.best_val_accuracy(), None);
        assert_eq!(empty.final_val_accuracy(), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let history = sample_history();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        history.save(&path).unwrap();

        let loaded = TrainingHistory::load(&path).unwrap();
        assert_eq!(loaded.run_name, "baseline");
        assert_eq!(loaded.epochs.len(), 3);
        assert_eq!(loaded.epochs[2].epoch, 3);
    }

    #[test]
    fn test_accuracy_chart_written() {
        let history = sample_history();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accuracy.svg");
        history.write_accuracy_chart(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Validation"));
    }
}
