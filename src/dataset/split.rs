//! Train/test split
//!
//! Partitions the sample list 80/20 into a training and a held-out test set.
//! The shuffle is driven by an explicit seed so split membership is
//! reproducible across runs.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::loader::ImageSample;
use crate::utils::error::{CatsDogsError, Result};

/// Configuration for dataset splitting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of data used for training (rest becomes the test set)
    pub train_fraction: f64,
    /// Random seed for the shuffle
    pub seed: u64,
    /// Keep the cat/dog ratio equal in both halves
    pub stratified: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            seed: 42,
            stratified: true,
        }
    }
}

impl SplitConfig {
    /// Create a split configuration with a custom seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(CatsDogsError::Config(format!(
                "train_fraction must be in (0, 1), got {}",
                self.train_fraction
            )));
        }
        Ok(())
    }
}

/// The two disjoint halves of the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainTestSplit {
    /// Training samples
    pub train: Vec<ImageSample>,
    /// Held-out test samples, also used for per-epoch validation
    pub test: Vec<ImageSample>,
    /// Configuration used to create this split
    pub config: SplitConfig,
}

impl TrainTestSplit {
    /// Split a sample list according to the configuration
    pub fn from_samples(samples: Vec<ImageSample>, config: SplitConfig) -> Result<Self> {
        config.validate()?;

        if samples.is_empty() {
            return Err(CatsDogsError::Dataset(
                "No samples provided for splitting".to_string(),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let (train, test) = if config.stratified {
            Self::stratified_split(samples, config.train_fraction, &mut rng)
        } else {
            Self::random_split(samples, config.train_fraction, &mut rng)
        };

        Ok(Self {
            train,
            test,
            config,
        })
    }

    fn random_split(
        mut samples: Vec<ImageSample>,
        train_fraction: f64,
        rng: &mut ChaCha8Rng,
    ) -> (Vec<ImageSample>, Vec<ImageSample>) {
        samples.shuffle(rng);
        let n_train = (samples.len() as f64 * train_fraction).round() as usize;
        let test = samples.split_off(n_train.min(samples.len()));
        (samples, test)
    }

    fn stratified_split(
        samples: Vec<ImageSample>,
        train_fraction: f64,
        rng: &mut ChaCha8Rng,
    ) -> (Vec<ImageSample>, Vec<ImageSample>) {
        let mut by_class: [Vec<ImageSample>; 2] = [Vec::new(), Vec::new()];
        for sample in samples {
            by_class[sample.label.index()].push(sample);
        }

        let mut train = Vec::new();
        let mut test = Vec::new();

        for mut class_samples in by_class {
            class_samples.shuffle(rng);
            let n_train = (class_samples.len() as f64 * train_fraction).round() as usize;
            let class_test = class_samples.split_off(n_train.min(class_samples.len()));
            train.extend(class_samples);
            test.extend(class_test);
        }

        // Interleave classes so batches are not single-class runs
        train.shuffle(rng);
        test.shuffle(rng);

        (train, test)
    }

    /// Get statistics about the split
    pub fn stats(&self) -> SplitStats {
        SplitStats {
            total: self.train.len() + self.test.len(),
            train_size: self.train.len(),
            test_size: self.test.len(),
        }
    }

    /// Save the split to a JSON file for reproducibility
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CatsDogsError::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously saved split
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| CatsDogsError::Serialization(e.to_string()))
    }
}

/// Statistics about a train/test split
#[derive(Debug, Clone, Copy)]
pub struct SplitStats {
    pub total: usize,
    pub train_size: usize,
    pub test_size: usize,
}

impl std::fmt::Display for SplitStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Split Statistics:")?;
        writeln!(
            f,
            "  Train: {} ({:.1}%)",
            self.train_size,
            100.0 * self.train_size as f64 / self.total.max(1) as f64
        )?;
        write!(
            f,
            "  Test:  {} ({:.1}%)",
            self.test_size,
            100.0 * self.test_size as f64 / self.total.max(1) as f64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Label;
    use std::path::PathBuf;

    fn create_test_samples(cats: usize, dogs: usize) -> Vec<ImageSample> {
        let mut samples = Vec::new();
        for i in 0..cats {
            samples.push(ImageSample {
                path: PathBuf::from(format!("Cat/{}.jpg", i)),
                label: Label::Cat,
                id: i,
            });
        }
        for i in 0..dogs {
            samples.push(ImageSample {
                path: PathBuf::from(format!("Dog/{}.jpg", i)),
                label: Label::Dog,
                id: cats + i,
            });
        }
        samples
    }

    #[test]
    fn test_sizes_sum_to_total() {
        let samples = create_test_samples(100, 100);
        let split = TrainTestSplit::from_samples(samples, SplitConfig::default()).unwrap();
        let stats = split.stats();

        assert_eq!(stats.train_size + stats.test_size, 200);
        assert_eq!(stats.total, 200);
    }

    #[test]
    fn test_eighty_twenty_ratio() {
        let samples = create_test_samples(100, 100);
        let split = TrainTestSplit::from_samples(samples, SplitConfig::default()).unwrap();

        assert_eq!(split.train.len(), 160);
        assert_eq!(split.test.len(), 40);
    }

    #[test]
    fn test_ratio_within_one_on_odd_counts() {
        let samples = create_test_samples(51, 52);
        let split = TrainTestSplit::from_samples(samples, SplitConfig::default()).unwrap();

        let expected = (103.0f64 * 0.8).round() as isize;
        let actual = split.train.len() as isize;
        assert!((actual - expected).abs() <= 1);
        assert_eq!(split.train.len() + split.test.len(), 103);
    }

    #[test]
    fn test_stratified_keeps_class_balance() {
        let samples = create_test_samples(100, 100);
        let split = TrainTestSplit::from_samples(samples, SplitConfig::default()).unwrap();

        let train_cats = split.train.iter().filter(|s| s.label == Label::Cat).count();
        let test_cats = split.test.iter().filter(|s| s.label == Label::Cat).count();

        assert_eq!(train_cats, 80);
        assert_eq!(test_cats, 20);
    }

    #[test]
    fn test_same_seed_same_membership() {
        let config = SplitConfig::with_seed(7);

        let split1 =
            TrainTestSplit::from_samples(create_test_samples(40, 40), config.clone()).unwrap();
        let split2 = TrainTestSplit::from_samples(create_test_samples(40, 40), config).unwrap();

        let ids1: Vec<usize> = split1.train.iter().map(|s| s.id).collect();
        let ids2: Vec<usize> = split2.train.iter().map(|s| s.id).collect();
        assert_eq!(ids1, ids2);
    }

    #[test]
    fn test_different_seed_different_membership() {
        let split1 = TrainTestSplit::from_samples(
            create_test_samples(50, 50),
            SplitConfig::with_seed(1),
        )
        .unwrap();
        let split2 = TrainTestSplit::from_samples(
            create_test_samples(50, 50),
            SplitConfig::with_seed(2),
        )
        .unwrap();

        let ids1: Vec<usize> = split1.train.iter().map(|s| s.id).collect();
        let ids2: Vec<usize> = split2.train.iter().map(|s| s.id).collect();
        assert_ne!(ids1, ids2);
    }

    #[test]
    fn test_halves_are_disjoint() {
        let samples = create_test_samples(30, 30);
        let split = TrainTestSplit::from_samples(samples, SplitConfig::default()).unwrap();

        for train_sample in &split.train {
            assert!(split.test.iter().all(|t| t.id != train_sample.id));
        }
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let config = SplitConfig {
            train_fraction: 1.5,
            ..Default::default()
        };
        assert!(TrainTestSplit::from_samples(create_test_samples(10, 10), config).is_err());
    }

    #[test]
    fn test_empty_samples_rejected() {
        assert!(TrainTestSplit::from_samples(Vec::new(), SplitConfig::default()).is_err());
    }
}
