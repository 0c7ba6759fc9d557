//! Baseline CNN
//!
//! Three convolution/max-pool stages followed by two dense layers and a
//! sigmoid output. Convolutions use valid padding, so each stage shrinks the
//! spatial resolution before pooling halves it.

use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::sigmoid;

use super::ProbabilityModel;
use crate::IMAGE_SIZE;

/// Configuration for the baseline classifier
#[derive(Config, Debug)]
pub struct CatDogClassifierConfig {
    /// Input image resolution (square)
    #[config(default = 250)]
    pub input_size: usize,
    /// Number of input channels
    #[config(default = 3)]
    pub in_channels: usize,
    /// Width of the hidden dense layer
    #[config(default = 512)]
    pub hidden_size: usize,
    /// Dropout before the hidden dense layer (0 disables it)
    #[config(default = 0.0)]
    pub dropout: f64,
}

/// The baseline convolutional classifier
///
/// Topology: Conv(16) -> Pool -> Conv(32) -> Pool -> Conv(64) -> Flatten ->
/// Dense(512) -> Dense(1, sigmoid). At 250x250 input the flattened feature
/// map is 64 x 59 x 59.
#[derive(Module, Debug)]
pub struct CatDogClassifier<B: Backend> {
    conv1: Conv2d<B>,
    pool1: MaxPool2d,
    conv2: Conv2d<B>,
    pool2: MaxPool2d,
    conv3: Conv2d<B>,
    dropout: Dropout,
    fc1: Linear<B>,
    fc2: Linear<B>,
    activation: Relu,
    input_size: usize,
}

impl CatDogClassifierConfig {
    /// Initialize the model on the given device
    pub fn init<B: Backend>(&self, device: &B::Device) -> CatDogClassifier<B> {
        let flattened = 64 * Self::feature_dim(self.input_size).pow(2);

        CatDogClassifier {
            conv1: Conv2dConfig::new([self.in_channels, 16], [3, 3]).init(device),
            pool1: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            conv2: Conv2dConfig::new([16, 32], [3, 3]).init(device),
            pool2: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            conv3: Conv2dConfig::new([32, 64], [3, 3]).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            fc1: LinearConfig::new(flattened, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, 1).init(device),
            activation: Relu::new(),
            input_size: self.input_size,
        }
    }

    /// Spatial side length of the final feature map
    ///
    /// Each valid 3x3 convolution removes 2 pixels, each 2x2 pool halves.
    fn feature_dim(input_size: usize) -> usize {
        let s = (input_size - 2) / 2; // conv1 + pool1
        let s = (s - 2) / 2; // conv2 + pool2
        s - 2 // conv3
    }
}

impl<B: Backend> CatDogClassifier<B> {
    /// Forward pass producing dog probabilities with shape `[batch_size, 1]`
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.conv1.forward(images));
        let x = self.pool1.forward(x);
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.pool2.forward(x);
        let x = self.activation.forward(self.conv3.forward(x));

        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        let x = self.dropout.forward(x);
        let x = self.activation.forward(self.fc1.forward(x));
        sigmoid(self.fc2.forward(x))
    }

    /// Input resolution the model was built for
    pub fn input_size(&self) -> usize {
        self.input_size
    }
}

impl<B: Backend> ProbabilityModel<B> for CatDogClassifier<B> {
    fn probability(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward(images)
    }
}

/// Default configuration matching the 250x250 training setup
pub fn default_config() -> CatDogClassifierConfig {
    CatDogClassifierConfig::new().with_input_size(IMAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_feature_dim() {
        // 250 -> 248 -> 124 -> 122 -> 61 -> 59
        assert_eq!(CatDogClassifierConfig::feature_dim(250), 59);
        // Small sizes used by the shape tests below
        assert_eq!(CatDogClassifierConfig::feature_dim(34), 5);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let config = CatDogClassifierConfig::new()
            .with_input_size(34)
            .with_hidden_size(32);
        let model: CatDogClassifier<TestBackend> = config.init(&device);

        let images = Tensor::<TestBackend, 4>::zeros([4, 3, 34, 34], &device);
        let output = model.forward(images);

        assert_eq!(output.dims(), [4, 1]);
    }

    #[test]
    fn test_output_is_probability() {
        let device = Default::default();
        let config = CatDogClassifierConfig::new()
            .with_input_size(34)
            .with_hidden_size(32);
        let model: CatDogClassifier<TestBackend> = config.init(&device);

        let images = Tensor::<TestBackend, 4>::random(
            [2, 3, 34, 34],
            burn::tensor::Distribution::Uniform(0.0, 1.0),
            &device,
        );
        let output = model.forward(images);
        let values: Vec<f32> = output.into_data().to_vec().unwrap();

        assert!(values.iter().all(|&p| p > 0.0 && p < 1.0));
    }

    #[test]
    fn test_save_load_round_trip() {
        use burn::module::Module;

        use crate::backend::ModelRecorder;

        let device = Default::default();
        let config = CatDogClassifierConfig::new()
            .with_input_size(34)
            .with_hidden_size(16);
        let model: CatDogClassifier<TestBackend> = config.init(&device);

        let images = Tensor::<TestBackend, 4>::random(
            [2, 3, 34, 34],
            burn::tensor::Distribution::Uniform(0.0, 1.0),
            &device,
        );
        let before: Vec<f32> = model.forward(images.clone()).into_data().to_vec().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model");
        model
            .clone()
            .save_file(&path, &ModelRecorder::new())
            .unwrap();

        let restored: CatDogClassifier<TestBackend> = config
            .init(&device)
            .load_file(&path, &ModelRecorder::new(), &device)
            .unwrap();
        let after: Vec<f32> = restored.forward(images).into_data().to_vec().unwrap();

        for (b, a) in before.iter().zip(&after) {
            assert!((b - a).abs() < 1e-6);
        }
    }

    #[test]
    fn test_default_config_matches_resolution() {
        let config = default_config();
        assert_eq!(config.input_size, 250);
        assert_eq!(config.in_channels, 3);
        assert_eq!(config.hidden_size, 512);
    }
}
