//! Single and batch classification of labeled records.

use crate::batch::collate;
use crate::model::Classifier;
use burn::tensor::backend::Backend;
use dataset::{ImageRecord, LabelVocab};
use std::fmt;
use std::path::PathBuf;

/// Number of predictions reported by the batch entry point.
pub const DEFAULT_BATCH_LIMIT: usize = 10;

/// One inference result; transient, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub path: PathBuf,
    pub actual: String,
    pub predicted: String,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        write!(
            f,
            "Image: {name} | Actual Value: {} | Predicted Value: {}",
            self.actual, self.predicted
        )
    }
}

/// Reusable inference wrapper around a trained classifier. Holds the model,
/// the label vocabulary, and the device for the remainder of the run; both
/// entry points classify once and return.
pub struct PredictionEngine<B: Backend, M: Classifier<B>> {
    model: M,
    vocab: LabelVocab,
    image_size: u32,
    device: B::Device,
}

impl<B: Backend, M: Classifier<B>> PredictionEngine<B, M> {
    pub fn new(model: M, vocab: LabelVocab, image_size: u32, device: B::Device) -> Self {
        Self {
            model,
            vocab,
            image_size,
            device,
        }
    }

    /// Single-image mode: classify the first record of a dataset.
    pub fn classify_first(&self, records: &[ImageRecord]) -> anyhow::Result<Prediction> {
        let first = records
            .first()
            .ok_or_else(|| anyhow::anyhow!("no records to classify"))?;
        let mut predictions = self.classify_slice(std::slice::from_ref(first))?;
        Ok(predictions.remove(0))
    }

    /// Batch mode: classify up to `limit` records.
    pub fn classify_batch(
        &self,
        records: &[ImageRecord],
        limit: usize,
    ) -> anyhow::Result<Vec<Prediction>> {
        let take = records.len().min(limit);
        if take == 0 {
            return Ok(Vec::new());
        }
        self.classify_slice(&records[..take])
    }

    fn classify_slice(&self, records: &[ImageRecord]) -> anyhow::Result<Vec<Prediction>> {
        let batch = collate::<B>(records, &self.vocab, self.image_size, &self.device)?;
        let logits = self.model.forward(batch.images);
        let keys = logits
            .argmax(1)
            .into_data()
            .to_vec::<i64>()
            .map_err(|e| anyhow::anyhow!("failed to read prediction keys: {e:?}"))?;

        records
            .iter()
            .zip(keys)
            .map(|(rec, key)| {
                let predicted = self
                    .vocab
                    .label(key as u32)
                    .ok_or_else(|| anyhow::anyhow!("predicted key {key} outside vocabulary"))?
                    .to_string();
                Ok(Prediction {
                    path: rec.path.clone(),
                    actual: rec.label.clone(),
                    predicted,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_line_matches_report_format() {
        let pred = Prediction {
            path: PathBuf::from("assets/cat/a.jpg"),
            actual: "cat".to_string(),
            predicted: "dog".to_string(),
        };
        assert_eq!(
            pred.to_string(),
            "Image: a.jpg | Actual Value: cat | Predicted Value: dog"
        );
    }
}
