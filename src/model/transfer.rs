//! Transfer-learning classifier
//!
//! Reuses a pretrained convolutional backbone as a frozen feature extractor
//! and trains only a small linear head on top. The head emits raw logits;
//! training pairs it with a binary cross-entropy loss that applies the
//! sigmoid internally.

use std::path::Path;

use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::prelude::*;
use burn::record::Recorder;
use burn::tensor::activation::sigmoid;

use super::ProbabilityModel;
use crate::backend::ModelRecorder;
// The crate's single-argument `Result` alias is deliberately not imported
// here: the Config derive expands to code using the two-argument form.
use crate::utils::error::CatsDogsError;

/// One convolution stage of the backbone
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv2d<B>,
    norm: BatchNorm<B, 2>,
    pool: MaxPool2d,
    activation: Relu,
}

impl<B: Backend> ConvBlock<B> {
    fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv2dConfig::new([in_channels, out_channels], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            norm: BatchNormConfig::new(out_channels).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            activation: Relu::new(),
        }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.norm.forward(x);
        let x = self.activation.forward(x);
        self.pool.forward(x)
    }
}

/// Configuration for the convolutional feature extractor
#[derive(Config, Debug)]
pub struct FeatureBackboneConfig {
    /// Number of input channels
    #[config(default = 3)]
    pub in_channels: usize,
    /// Channel widths of the four convolution stages
    #[config(default = "[32, 64, 128, 256]")]
    pub channels: [usize; 4],
}

/// Convolutional feature extractor shared with other vision experiments
///
/// Four conv/norm/pool stages producing a `[batch, 256, H/16, W/16]` map.
#[derive(Module, Debug)]
pub struct FeatureBackbone<B: Backend> {
    blocks: Vec<ConvBlock<B>>,
}

impl FeatureBackboneConfig {
    /// Initialize the backbone with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> FeatureBackbone<B> {
        let mut blocks = Vec::with_capacity(self.channels.len());
        let mut in_channels = self.in_channels;
        for &out_channels in &self.channels {
            blocks.push(ConvBlock::new(in_channels, out_channels, device));
            in_channels = out_channels;
        }
        FeatureBackbone { blocks }
    }

    /// Number of channels in the final feature map
    pub fn out_channels(&self) -> usize {
        self.channels[self.channels.len() - 1]
    }
}

impl<B: Backend> FeatureBackbone<B> {
    /// Extract features from a batch of images
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = images;
        for block in &self.blocks {
            x = block.forward(x);
        }
        x
    }

    /// Load pretrained backbone weights from a Burn record file
    pub fn load_pretrained(
        self,
        path: &Path,
        device: &B::Device,
    ) -> crate::utils::error::Result<Self> {
        let record = ModelRecorder::new()
            .load(path.to_path_buf(), device)
            .map_err(|e| {
                CatsDogsError::Model(format!(
                    "Failed to load pretrained backbone from {:?}: {}",
                    path, e
                ))
            })?;
        Ok(self.load_record(record))
    }
}

/// Configuration for the transfer-learning classifier
#[derive(Config, Debug)]
pub struct TransferClassifierConfig {
    /// Backbone configuration
    pub backbone: FeatureBackboneConfig,
}

impl Default for TransferClassifierConfig {
    fn default() -> Self {
        Self::new(FeatureBackboneConfig::new())
    }
}

impl TransferClassifierConfig {
    /// Initialize with a randomly-initialized (unfrozen) backbone
    ///
    /// Mainly useful for tests; real training loads pretrained weights via
    /// [`TransferClassifierConfig::init_pretrained`].
    pub fn init<B: Backend>(&self, device: &B::Device) -> TransferClassifier<B> {
        let backbone = self.backbone.init(device);
        self.assemble(backbone, device)
    }

    /// Initialize from a pretrained backbone record and freeze it
    pub fn init_pretrained<B: Backend>(
        &self,
        weights_path: &Path,
        device: &B::Device,
    ) -> crate::utils::error::Result<TransferClassifier<B>> {
        let backbone = self
            .backbone
            .init(device)
            .load_pretrained(weights_path, device)?
            .no_grad();
        Ok(self.assemble(backbone, device))
    }

    fn assemble<B: Backend>(
        &self,
        backbone: FeatureBackbone<B>,
        device: &B::Device,
    ) -> TransferClassifier<B> {
        TransferClassifier {
            backbone,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            head: LinearConfig::new(self.backbone.out_channels(), 1).init(device),
        }
    }
}

/// Classifier with a frozen backbone and a trainable linear head
#[derive(Module, Debug)]
pub struct TransferClassifier<B: Backend> {
    backbone: FeatureBackbone<B>,
    pool: AdaptiveAvgPool2d,
    head: Linear<B>,
}

impl<B: Backend> TransferClassifier<B> {
    /// Forward pass producing raw logits with shape `[batch_size, 1]`
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let features = self.backbone.forward(images);
        let pooled = self.pool.forward(features);

        let [batch_size, channels, _, _] = pooled.dims();
        let flat = pooled.reshape([batch_size, channels]);

        self.head.forward(flat)
    }

    /// Forward pass producing dog probabilities with shape `[batch_size, 1]`
    pub fn forward_probability(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        sigmoid(self.forward(images))
    }
}

impl<B: Backend> ProbabilityModel<B> for TransferClassifier<B> {
    fn probability(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward_probability(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_backbone_output_shape() {
        let device = Default::default();
        let backbone: FeatureBackbone<TestBackend> = FeatureBackboneConfig::new().init(&device);

        let images = Tensor::<TestBackend, 4>::zeros([2, 3, 64, 64], &device);
        let features = backbone.forward(images);

        // Four pooling stages divide 64 by 16
        assert_eq!(features.dims(), [2, 256, 4, 4]);
    }

    #[test]
    fn test_logit_shape() {
        let device = Default::default();
        let model: TransferClassifier<TestBackend> =
            TransferClassifierConfig::default().init(&device);

        let images = Tensor::<TestBackend, 4>::zeros([3, 3, 64, 64], &device);
        let logits = model.forward(images);

        assert_eq!(logits.dims(), [3, 1]);
    }

    #[test]
    fn test_probability_matches_sigmoid_of_logit() {
        let device = Default::default();
        let model: TransferClassifier<TestBackend> =
            TransferClassifierConfig::default().init(&device);

        let images = Tensor::<TestBackend, 4>::random(
            [2, 3, 64, 64],
            burn::tensor::Distribution::Uniform(0.0, 1.0),
            &device,
        );

        let logits: Vec<f32> = model.forward(images.clone()).into_data().to_vec().unwrap();
        let probs: Vec<f32> = model
            .forward_probability(images)
            .into_data()
            .to_vec()
            .unwrap();

        for (logit, prob) in logits.iter().zip(&probs) {
            let expected = 1.0 / (1.0 + (-logit).exp());
            assert!((prob - expected).abs() < 1e-5);
            // Thresholding the probability at 0.5 agrees with the logit sign
            assert_eq!(*prob >= 0.5, *logit >= 0.0);
        }
    }

    #[test]
    fn test_missing_pretrained_weights_is_error() {
        let device = Default::default();
        let result: crate::utils::error::Result<TransferClassifier<TestBackend>> =
            TransferClassifierConfig::default()
                .init_pretrained(Path::new("/no/such/backbone"), &device);
        assert!(result.is_err());
    }
}
