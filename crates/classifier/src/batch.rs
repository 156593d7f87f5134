//! Image decoding and collation into Burn tensors.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};
use dataset::{ImageRecord, LabelVocab};
use image::imageops::FilterType;
use std::path::Path;

/// A collated batch of images and their label keys.
pub struct ImageBatch<B: Backend> {
    /// Images in CHW layout, normalized to [0, 1] (shape: [batch, 3, s, s]).
    pub images: Tensor<B, 4>,
    /// Label key per sample (shape: [batch]).
    pub targets: Tensor<B, 1, Int>,
}

/// Decode an image, resize it to `image_size` square, and return normalized
/// CHW pixel data.
pub fn load_image_chw(path: &Path, image_size: u32) -> anyhow::Result<Vec<f32>> {
    let img = image::open(path)
        .map_err(|e| anyhow::anyhow!("failed to open image {:?}: {e}", path))?
        .to_rgb8();
    let img = image::imageops::resize(&img, image_size, image_size, FilterType::Triangle);

    let mut buf = Vec::with_capacity(3 * (image_size * image_size) as usize);
    for c in 0..3 {
        for y in 0..image_size {
            for x in 0..image_size {
                buf.push(img.get_pixel(x, y)[c] as f32 / 255.0);
            }
        }
    }
    Ok(buf)
}

/// Collate records into tensors. Any unreadable image fails the whole batch;
/// there are no partial-failure semantics.
pub fn collate<B: Backend>(
    records: &[ImageRecord],
    vocab: &LabelVocab,
    image_size: u32,
    device: &B::Device,
) -> anyhow::Result<ImageBatch<B>> {
    if records.is_empty() {
        anyhow::bail!("cannot collate empty batch");
    }
    let size = image_size as usize;
    let mut image_buf: Vec<f32> = Vec::with_capacity(records.len() * 3 * size * size);
    let mut target_buf: Vec<i64> = Vec::with_capacity(records.len());

    for rec in records {
        image_buf.extend(load_image_chw(&rec.path, image_size)?);
        target_buf.push(vocab.require_key(&rec.label)? as i64);
    }

    let images = Tensor::<B, 4>::from_data(
        TensorData::new(image_buf, [records.len(), 3, size, size]),
        device,
    );
    let targets =
        Tensor::<B, 1, Int>::from_data(TensorData::new(target_buf, [records.len()]), device);
    Ok(ImageBatch { images, targets })
}
