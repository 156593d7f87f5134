//! Labeled-image dataset loading, splitting, and vocabulary utilities.
//!
//! This crate provides:
//! - Enumerating `.jpg`/`.png` files with folder- or filename-derived labels
//! - Shuffling and two-stage train/validation/test partitioning
//! - A persistable label-to-key vocabulary

pub mod enumerate;
pub mod splits;
pub mod types;
pub mod vocab;

pub use enumerate::{enumerate_images, SUPPORTED_EXTENSIONS};
pub use splits::{
    partition, shuffle_records, split_once, DatasetSplits, DEFAULT_RESPLIT_FRACTION,
    DEFAULT_TEST_FRACTION,
};
pub use types::{DatasetError, DatasetResult, ImageRecord, LabelSource};
pub use vocab::LabelVocab;
