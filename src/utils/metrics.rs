//! Metrics Module for Model Evaluation
//!
//! Binary classification metrics: accuracy, precision, recall, F1 and a 2x2
//! confusion matrix. Dog (label 1) is treated as the positive class.

use serde::{Deserialize, Serialize};

use crate::dataset::CLASS_NAMES;

/// 2x2 confusion matrix for the cat/dog classifier
///
/// Rows are ground truth, columns are predictions, indexed by label
/// (0 = Cat, 1 = Dog).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Build a confusion matrix from prediction/ground-truth label pairs
    pub fn from_predictions(predictions: &[usize], ground_truth: &[usize]) -> Self {
        let mut counts = [[0usize; 2]; 2];
        for (&pred, &truth) in predictions.iter().zip(ground_truth.iter()) {
            if pred < 2 && truth < 2 {
                counts[truth][pred] += 1;
            }
        }
        Self { counts }
    }

    /// True positives for the Dog class
    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    /// False positives (cats predicted as dogs)
    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    /// True negatives (cats predicted as cats)
    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    /// False negatives (dogs predicted as cats)
    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    /// Total number of samples
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl std::fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "              pred {:>5} pred {:>5}", CLASS_NAMES[0], CLASS_NAMES[1])?;
        for (i, row) in self.counts.iter().enumerate() {
            writeln!(f, "  true {:<5} {:>10} {:>10}", CLASS_NAMES[i], row[0], row[1])?;
        }
        Ok(())
    }
}

/// Evaluation metrics for the binary classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryMetrics {
    /// Total number of samples evaluated
    pub total_samples: usize,

    /// Number of correct predictions
    pub correct_predictions: usize,

    /// Overall accuracy (correct / total)
    pub accuracy: f64,

    /// Average loss over all batches, if a loss was computed
    pub loss: Option<f64>,

    /// Precision for the Dog class
    pub precision: f64,

    /// Recall for the Dog class
    pub recall: f64,

    /// F1-score for the Dog class
    pub f1: f64,

    /// Confusion matrix
    pub confusion_matrix: ConfusionMatrix,
}

impl Default for BinaryMetrics {
    fn default() -> Self {
        Self {
            total_samples: 0,
            correct_predictions: 0,
            accuracy: 0.0,
            loss: None,
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
            confusion_matrix: ConfusionMatrix::default(),
        }
    }
}

impl BinaryMetrics {
    /// Compute metrics from predicted and ground-truth labels
    pub fn from_predictions(predictions: &[usize], ground_truth: &[usize]) -> Self {
        assert_eq!(
            predictions.len(),
            ground_truth.len(),
            "Predictions and ground truth must have same length"
        );

        let total_samples = predictions.len();
        if total_samples == 0 {
            return Self::default();
        }

        let confusion_matrix = ConfusionMatrix::from_predictions(predictions, ground_truth);

        let correct_predictions = predictions
            .iter()
            .zip(ground_truth.iter())
            .filter(|(p, g)| p == g)
            .count();

        let accuracy = correct_predictions as f64 / total_samples as f64;

        let tp = confusion_matrix.true_positives() as f64;
        let fp = confusion_matrix.false_positives() as f64;
        let fn_ = confusion_matrix.false_negatives() as f64;

        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            total_samples,
            correct_predictions,
            accuracy,
            loss: None,
            precision,
            recall,
            f1,
            confusion_matrix,
        }
    }

    /// Attach an average loss value
    pub fn with_loss(mut self, loss: f64) -> Self {
        self.loss = Some(loss);
        self
    }
}

impl std::fmt::Display for BinaryMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Evaluation Metrics:")?;
        writeln!(f, "  Samples:   {}", self.total_samples)?;
        writeln!(f, "  Accuracy:  {:.2}%", self.accuracy * 100.0)?;
        if let Some(loss) = self.loss {
            writeln!(f, "  Loss:      {:.4}", loss)?;
        }
        writeln!(f, "  Precision: {:.4}", self.precision)?;
        writeln!(f, "  Recall:    {:.4}", self.recall)?;
        writeln!(f, "  F1:        {:.4}", self.f1)?;
        write!(f, "{}", self.confusion_matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let preds = vec![0, 1, 0, 1];
        let truth = vec![0, 1, 0, 1];
        let metrics = BinaryMetrics::from_predictions(&preds, &truth);

        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1, 1.0);
    }

    #[test]
    fn test_confusion_matrix_cells() {
        // truth:  cat cat dog dog
        // pred:   cat dog dog cat
        let preds = vec![0, 1, 1, 0];
        let truth = vec![0, 0, 1, 1];
        let cm = ConfusionMatrix::from_predictions(&preds, &truth);

        assert_eq!(cm.true_negatives(), 1);
        assert_eq!(cm.false_positives(), 1);
        assert_eq!(cm.true_positives(), 1);
        assert_eq!(cm.false_negatives(), 1);
        assert_eq!(cm.total(), 4);
    }

    #[test]
    fn test_accuracy_matches_confusion_matrix() {
        let preds = vec![0, 1, 1, 0, 1, 0];
        let truth = vec![0, 0, 1, 1, 1, 0];
        let metrics = BinaryMetrics::from_predictions(&preds, &truth);

        let cm = &metrics.confusion_matrix;
        let correct = cm.true_positives() + cm.true_negatives();
        assert_eq!(metrics.correct_predictions, correct);
        assert!((metrics.accuracy - correct as f64 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_predictions() {
        let metrics = BinaryMetrics::from_predictions(&[], &[]);
        assert_eq!(metrics.total_samples, 0);
        assert_eq!(metrics.accuracy, 0.0);
    }
}
