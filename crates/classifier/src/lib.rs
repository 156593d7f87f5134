#![recursion_limit = "256"]

//! Image-classification training and inference built on Burn.
//!
//! - `model`: MLP and CNN classifier modules behind the `Classifier` trait
//! - `batch`: image decoding and tensor collation
//! - `train`: CLI arguments and the training loop
//! - `predict`: reusable prediction engine and console reporting

pub mod batch;
pub mod model;
pub mod predict;
pub mod train;

pub use batch::{collate, load_image_chw, ImageBatch};
pub use model::{
    Classifier, CnnClassifier, CnnClassifierConfig, MlpClassifier, MlpClassifierConfig,
};
pub use predict::{Prediction, PredictionEngine, DEFAULT_BATCH_LIMIT};
pub use train::{run_train, EpochMetrics, TrainArgs};

/// Backend alias for training/inference (NdArray by default; WGPU if enabled).
#[cfg(feature = "backend-wgpu")]
pub type TrainBackend = burn_wgpu::Wgpu<f32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type TrainBackend = burn_ndarray::NdArray<f32>;
