//! Single-image prediction
//!
//! Wraps a trained model and turns an image file into a Cat/Dog decision.
//! The same image can also be classified under each interpolation method to
//! compare how the resize filter affects the prediction.

use std::path::Path;
use std::time::Instant;

use burn::prelude::*;

use crate::dataset::{load_image_chw, Label, Normalization, ResizeFilter};
use crate::model::ProbabilityModel;
use crate::utils::error::{CatsDogsError, Result};
use crate::IMAGE_SIZE;

/// Result of classifying a single image
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Predicted class
    pub label: Label,
    /// Dog probability in (0, 1)
    pub probability: f32,
    /// Wall-clock time of the forward pass in milliseconds
    pub inference_time_ms: f64,
}

impl Prediction {
    /// Confidence in the predicted class (distance from the 0.5 threshold)
    pub fn confidence(&self) -> f32 {
        match self.label {
            Label::Dog => self.probability,
            Label::Cat => 1.0 - self.probability,
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.1}% confidence, {:.1}ms)",
            self.label,
            self.confidence() * 100.0,
            self.inference_time_ms
        )
    }
}

/// One row of a resize-filter comparison
#[derive(Debug, Clone)]
pub struct FilterComparison {
    pub filter: ResizeFilter,
    pub prediction: Prediction,
}

/// Classifies image files with a trained model
pub struct Predictor<B: Backend, M: ProbabilityModel<B>> {
    model: M,
    device: B::Device,
    normalization: Normalization,
    image_size: usize,
}

impl<B: Backend, M: ProbabilityModel<B>> Predictor<B, M> {
    /// Create a predictor for the 250x250 input resolution
    ///
    /// `normalization` must match the model variant: [`Normalization::UnitInterval`]
    /// for the baseline CNN, [`Normalization::Signed`] for the transfer model.
    pub fn new(model: M, device: B::Device, normalization: Normalization) -> Self {
        Self {
            model,
            device,
            normalization,
            image_size: IMAGE_SIZE,
        }
    }

    /// Classify a single image file using the default nearest-neighbor filter
    pub fn predict_for_picture(&self, path: &Path) -> Result<Prediction> {
        self.predict_with_filter(path, ResizeFilter::default())
    }

    /// Classify a single image file with an explicit resize filter
    pub fn predict_with_filter(&self, path: &Path, filter: ResizeFilter) -> Result<Prediction> {
        if !path.exists() {
            return Err(CatsDogsError::PathNotFound(path.to_path_buf()));
        }

        let pixels = load_image_chw(path, self.image_size, filter)
            .map_err(|e| CatsDogsError::ImageLoad(path.to_path_buf(), e.to_string()))?;

        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(pixels, [1, 3, self.image_size, self.image_size]),
            &self.device,
        );
        let images = match self.normalization {
            Normalization::UnitInterval => images,
            Normalization::Signed => images * 2.0 - 1.0,
        };

        let start = Instant::now();
        let probs = self.model.probability(images);
        let probability: f32 = probs.into_scalar().elem();
        let inference_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(Prediction {
            label: Label::from_probability(probability),
            probability,
            inference_time_ms,
        })
    }

    /// Classify the same image under every resize filter
    pub fn compare_filters(&self, path: &Path) -> Result<Vec<FilterComparison>> {
        ResizeFilter::ALL
            .iter()
            .map(|&filter| {
                Ok(FilterComparison {
                    filter,
                    prediction: self.predict_with_filter(path, filter)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatDogClassifierConfig;

    type TestBackend = burn::backend::NdArray;

    fn write_test_image(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_fn(16, 16, |x, y| {
            image::Rgb([(x * 16) as u8, (y * 16) as u8, 128])
        });
        img.save(&path).unwrap();
        path
    }

    fn small_predictor() -> Predictor<TestBackend, crate::model::CatDogClassifier<TestBackend>> {
        let device = Default::default();
        let model = CatDogClassifierConfig::new()
            .with_input_size(34)
            .with_hidden_size(16)
            .init(&device);
        let mut predictor = Predictor::new(model, device, Normalization::UnitInterval);
        predictor.image_size = 34;
        predictor
    }

    #[test]
    fn test_prediction_on_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "pet.png");

        let prediction = small_predictor().predict_for_picture(&path).unwrap();

        assert!(prediction.probability > 0.0 && prediction.probability < 1.0);
        assert_eq!(
            prediction.label,
            Label::from_probability(prediction.probability)
        );
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = small_predictor().predict_for_picture(Path::new("/no/such/pet.jpg"));
        assert!(matches!(result, Err(CatsDogsError::PathNotFound(_))));
    }

    #[test]
    fn test_compare_filters_covers_all() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "pet.png");

        let comparisons = small_predictor().compare_filters(&path).unwrap();

        assert_eq!(comparisons.len(), ResizeFilter::ALL.len());
        assert_eq!(comparisons[0].filter, ResizeFilter::Nearest);
    }

    #[test]
    fn test_confidence_is_symmetric() {
        let cat = Prediction {
            label: Label::Cat,
            probability: 0.2,
            inference_time_ms: 1.0,
        };
        let dog = Prediction {
            label: Label::Dog,
            probability: 0.8,
            inference_time_ms: 1.0,
        };
        assert!((cat.confidence() - 0.8).abs() < 1e-6);
        assert!((dog.confidence() - 0.8).abs() < 1e-6);
    }
}
