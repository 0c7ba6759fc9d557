//! Burn Dataset Integration
//!
//! Implements Burn's `Dataset` trait and a `Batcher` so the image samples can
//! be streamed into batched tensors during training and evaluation.

use std::path::PathBuf;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use image::ImageReader;
use serde::{Deserialize, Serialize};

use super::loader::ImageSample;
use super::{Label, ResizeFilter};
use crate::utils::logging::ProgressLogger;
use crate::IMAGE_SIZE;

/// Pixel value scaling applied when batching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Normalization {
    /// Keep pixels in [0, 1]; used by the baseline CNN
    #[default]
    UnitInterval,
    /// Rescale to [-1, 1]; the input range the pretrained backbone expects
    Signed,
}

/// A single sample ready for Burn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatsDogsItem {
    /// Image data as flattened CHW float array `[3 * H * W]`, values in [0, 1]
    pub image: Vec<f32>,
    /// Class label (0 = Cat, 1 = Dog)
    pub label: usize,
    /// Image path (for debugging/logging)
    pub path: String,
}

impl CatsDogsItem {
    /// Load an image, resize it to `image_size` and scale pixels to [0, 1]
    pub fn from_path(
        path: &PathBuf,
        label: Label,
        image_size: usize,
        filter: ResizeFilter,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            image: load_image_chw(path, image_size, filter)?,
            label: label.index(),
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Create from pre-loaded image data
    pub fn from_data(image: Vec<f32>, label: usize, path: String) -> Self {
        Self { image, label, path }
    }
}

/// Decode an image, resize it and convert to a flattened CHW array in [0, 1]
pub fn load_image_chw(
    path: &std::path::Path,
    image_size: usize,
    filter: ResizeFilter,
) -> anyhow::Result<Vec<f32>> {
    let img = ImageReader::open(path)?
        .decode()?
        .resize_exact(image_size as u32, image_size as u32, filter.filter_type())
        .to_rgb8();

    let (width, height) = (image_size, image_size);
    let mut image = vec![0.0f32; 3 * height * width];

    // CHW layout, one plane per channel
    for y in 0..height {
        for x in 0..width {
            let pixel = img.get_pixel(x as u32, y as u32);
            image[y * width + x] = pixel[0] as f32 / 255.0;
            image[height * width + y * width + x] = pixel[1] as f32 / 255.0;
            image[2 * height * width + y * width + x] = pixel[2] as f32 / 255.0;
        }
    }

    Ok(image)
}

/// Cats-vs-dogs dataset implementing Burn's `Dataset` trait
///
/// Lazily decodes images on demand; `new_cached` pre-loads everything into
/// memory for faster epoch iteration.
#[derive(Debug, Clone)]
pub struct CatsDogsBurnDataset {
    samples: Vec<(PathBuf, Label)>,
    image_size: usize,
    filter: ResizeFilter,
    cached_items: Option<Vec<CatsDogsItem>>,
}

impl CatsDogsBurnDataset {
    /// Create a lazy dataset from labeled paths
    pub fn new(samples: Vec<(PathBuf, Label)>, image_size: usize) -> Self {
        Self {
            samples,
            image_size,
            // Training-time decodes use bilinear filtering; the
            // nearest-neighbor default is an inference-path choice.
            filter: ResizeFilter::Area,
            cached_items: None,
        }
    }

    /// Create a dataset with all images decoded up front
    pub fn new_cached(samples: Vec<(PathBuf, Label)>, image_size: usize) -> anyhow::Result<Self> {
        let mut progress = ProgressLogger::new("Pre-loading images", samples.len());
        let filter = ResizeFilter::Area;

        let mut cached_items = Vec::with_capacity(samples.len());
        for (path, label) in &samples {
            cached_items.push(CatsDogsItem::from_path(path, *label, image_size, filter)?);
            progress.increment();
        }
        progress.finish();

        Ok(Self {
            samples,
            image_size,
            filter,
            cached_items: Some(cached_items),
        })
    }

    /// Build from a slice of loader samples
    pub fn from_samples(samples: &[ImageSample], image_size: usize) -> Self {
        let samples = samples.iter().map(|s| (s.path.clone(), s.label)).collect();
        Self::new(samples, image_size)
    }

    /// Per-class sample counts
    pub fn class_distribution(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for (_, label) in &self.samples {
            counts[label.index()] += 1;
        }
        counts
    }
}

impl Dataset<CatsDogsItem> for CatsDogsBurnDataset {
    fn get(&self, index: usize) -> Option<CatsDogsItem> {
        if index >= self.samples.len() {
            return None;
        }

        if let Some(ref cached) = self.cached_items {
            return cached.get(index).cloned();
        }

        let (path, label) = &self.samples[index];
        CatsDogsItem::from_path(path, *label, self.image_size, self.filter).ok()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A batch of images and integer targets
#[derive(Clone, Debug)]
pub struct CatsDogsBatch<B: Backend> {
    /// Images with shape `[batch_size, 3, height, width]`
    pub images: Tensor<B, 4>,
    /// Labels with shape `[batch_size]` (0 = Cat, 1 = Dog)
    pub targets: Tensor<B, 1, Int>,
}

/// Batcher turning items into tensors on the batcher's device
#[derive(Clone, Debug)]
pub struct CatsDogsBatcher<B: Backend> {
    device: B::Device,
    image_size: usize,
    normalization: Normalization,
}

impl<B: Backend> CatsDogsBatcher<B> {
    /// Create a batcher for the default 250x250 resolution
    pub fn new(device: B::Device, normalization: Normalization) -> Self {
        Self {
            device,
            image_size: IMAGE_SIZE,
            normalization,
        }
    }

    /// Create a batcher with a custom image size
    pub fn with_image_size(
        device: B::Device,
        normalization: Normalization,
        image_size: usize,
    ) -> Self {
        Self {
            device,
            image_size,
            normalization,
        }
    }
}

impl<B: Backend> Batcher<CatsDogsItem, CatsDogsBatch<B>> for CatsDogsBatcher<B> {
    fn batch(&self, items: Vec<CatsDogsItem>) -> CatsDogsBatch<B> {
        let batch_size = items.len();
        let channels = 3;
        let height = self.image_size;
        let width = self.image_size;

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();

        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(images_data, [batch_size, channels, height, width]),
            &self.device,
        );

        let images = match self.normalization {
            Normalization::UnitInterval => images,
            Normalization::Signed => images * 2.0 - 1.0,
        };

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(targets_data, [batch_size]),
            &self.device,
        );

        CatsDogsBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn item_with_value(value: f32, label: usize) -> CatsDogsItem {
        CatsDogsItem::from_data(vec![value; 3 * 8 * 8], label, format!("test_{}.jpg", label))
    }

    #[test]
    fn test_item_creation() {
        let item = item_with_value(0.5, 1);
        assert_eq!(item.label, 1);
        assert_eq!(item.image.len(), 3 * 8 * 8);
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = CatsDogsBatcher::<TestBackend>::with_image_size(
            Default::default(),
            Normalization::UnitInterval,
            8,
        );

        let items = vec![item_with_value(0.0, 0), item_with_value(1.0, 1)];
        let batch = batcher.batch(items);

        assert_eq!(batch.images.dims(), [2, 3, 8, 8]);
        assert_eq!(batch.targets.dims(), [2]);
    }

    #[test]
    fn test_unit_interval_values_stay_in_range() {
        let batcher = CatsDogsBatcher::<TestBackend>::with_image_size(
            Default::default(),
            Normalization::UnitInterval,
            8,
        );

        let items = vec![item_with_value(0.0, 0), item_with_value(1.0, 1)];
        let batch = batcher.batch(items);

        let values: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_signed_normalization_rescales() {
        let batcher = CatsDogsBatcher::<TestBackend>::with_image_size(
            Default::default(),
            Normalization::Signed,
            8,
        );

        let items = vec![item_with_value(0.0, 0), item_with_value(1.0, 1)];
        let batch = batcher.batch(items);

        let values: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((min + 1.0).abs() < 1e-6);
        assert!((max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_image_resizes_and_scales() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pet.png");
        let img = image::RgbImage::from_fn(40, 30, |x, y| {
            image::Rgb([(x * 6) as u8, (y * 8) as u8, 255])
        });
        img.save(&path).unwrap();

        let pixels = load_image_chw(&path, 10, ResizeFilter::Nearest).unwrap();

        assert_eq!(pixels.len(), 3 * 10 * 10);
        assert!(pixels.iter().all(|&v| (0.0..=1.0).contains(&v)));
        // Blue channel is saturated in the source image
        assert!(pixels[2 * 100..].iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_dataset_indexing() {
        let dataset = CatsDogsBurnDataset::new(
            vec![
                (PathBuf::from("a.jpg"), Label::Cat),
                (PathBuf::from("b.jpg"), Label::Dog),
                (PathBuf::from("c.jpg"), Label::Dog),
            ],
            8,
        );

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.class_distribution(), [1, 2]);
        // Lazy decode of a nonexistent path yields None, not a panic
        assert!(dataset.get(0).is_none());
        assert!(dataset.get(3).is_none());
    }
}
