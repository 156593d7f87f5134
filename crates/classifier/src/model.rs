//! Burn modules for image classification.
//!
//! Two architectures, selectable at train time:
//! - `MlpClassifier`: flattened-pixel feedforward net, cheap enough for tests.
//! - `CnnClassifier`: small convolutional net for real image folders.
//!
//! Both produce per-class logits and share the `Classifier` seam so the
//! prediction engine stays architecture-agnostic.

use burn::module::Module;
use burn::nn;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::PaddingConfig2d;
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Forward seam shared by all classifier architectures.
pub trait Classifier<B: Backend> {
    /// Per-class logits `[batch, num_classes]` from images `[batch, 3, s, s]`.
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}

#[derive(Debug, Clone)]
pub struct MlpClassifierConfig {
    /// Square side length images are resized to before batching.
    pub image_size: usize,
    pub hidden: usize,
    pub num_classes: usize,
}

impl MlpClassifierConfig {
    pub fn new(image_size: usize, num_classes: usize) -> Self {
        Self {
            image_size,
            hidden: 128,
            num_classes,
        }
    }
}

#[derive(Debug, Module)]
pub struct MlpClassifier<B: Backend> {
    linear1: nn::Linear<B>,
    linear2: nn::Linear<B>,
}

impl<B: Backend> MlpClassifier<B> {
    pub fn new(cfg: MlpClassifierConfig, device: &B::Device) -> Self {
        let input_dim = 3 * cfg.image_size * cfg.image_size;
        let linear1 = nn::LinearConfig::new(input_dim, cfg.hidden).init(device);
        let linear2 = nn::LinearConfig::new(cfg.hidden, cfg.num_classes.max(1)).init(device);
        Self { linear1, linear2 }
    }
}

impl<B: Backend> Classifier<B> for MlpClassifier<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch, c, h, w] = images.dims();
        let x = images.reshape([batch, c * h * w]);
        let x = relu(self.linear1.forward(x));
        self.linear2.forward(x)
    }
}

#[derive(Debug, Clone)]
pub struct CnnClassifierConfig {
    /// Square side length images are resized to before batching. Must be at
    /// least 4 so two pooling stages leave a non-empty feature map.
    pub image_size: usize,
    pub hidden: usize,
    pub num_classes: usize,
}

impl CnnClassifierConfig {
    pub fn new(image_size: usize, num_classes: usize) -> Self {
        Self {
            image_size,
            hidden: 64,
            num_classes,
        }
    }
}

#[derive(Debug, Module)]
pub struct CnnClassifier<B: Backend> {
    conv1: Conv2d<B>,
    pool1: MaxPool2d,
    conv2: Conv2d<B>,
    pool2: MaxPool2d,
    fc1: nn::Linear<B>,
    fc2: nn::Linear<B>,
}

impl<B: Backend> CnnClassifier<B> {
    pub fn new(cfg: CnnClassifierConfig, device: &B::Device) -> Self {
        // Padded 3x3 convs keep the spatial size; each pool halves it.
        let feature_side = (cfg.image_size / 4).max(1);
        let flat_dim = 32 * feature_side * feature_side;
        Self {
            conv1: Conv2dConfig::new([3, 16], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            pool1: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            conv2: Conv2dConfig::new([16, 32], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            pool2: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            fc1: nn::LinearConfig::new(flat_dim, cfg.hidden).init(device),
            fc2: nn::LinearConfig::new(cfg.hidden, cfg.num_classes.max(1)).init(device),
        }
    }
}

impl<B: Backend> Classifier<B> for CnnClassifier<B> {
    fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(images));
        let x = self.pool1.forward(x);
        let x = relu(self.conv2.forward(x));
        let x = self.pool2.forward(x);

        let [batch, c, h, w] = x.dims();
        let x = x.reshape([batch, c * h * w]);
        let x = relu(self.fc1.forward(x));
        self.fc2.forward(x)
    }
}
