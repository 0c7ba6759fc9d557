//! Model architectures for binary cat/dog classification

pub mod cnn;
pub mod transfer;

use burn::prelude::*;

pub use cnn::{CatDogClassifier, CatDogClassifierConfig};
pub use transfer::{
    FeatureBackbone, FeatureBackboneConfig, TransferClassifier, TransferClassifierConfig,
};

/// Common interface over both classifier variants
///
/// Both models reduce a batch of images to a per-sample dog probability in
/// (0, 1), so evaluation and inference can be written once against this trait.
pub trait ProbabilityModel<B: Backend> {
    /// Compute dog probabilities with shape `[batch_size, 1]`
    fn probability(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}
