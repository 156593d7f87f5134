//! Label-to-key vocabulary, persistable for consistent mappings across runs.

use crate::types::{DatasetError, DatasetResult, ImageRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Maps textual labels to stable integer keys, assigned in first-seen order.
/// The mapping depends on the data actually observed; persist it with
/// [`LabelVocab::save`] when predictions must be comparable across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelVocab {
    labels: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, u32>,
}

impl LabelVocab {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ImageRecord>,
    {
        let mut vocab = Self::default();
        for rec in records {
            vocab.insert(&rec.label);
        }
        vocab
    }

    /// Insert a label, returning its key. Existing labels keep their key.
    pub fn insert(&mut self, label: &str) -> u32 {
        if let Some(&key) = self.index.get(label) {
            return key;
        }
        let key = self.labels.len() as u32;
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), key);
        key
    }

    pub fn key(&self, label: &str) -> Option<u32> {
        self.index.get(label).copied()
    }

    pub fn require_key(&self, label: &str) -> DatasetResult<u32> {
        self.key(label).ok_or_else(|| DatasetError::UnknownLabel {
            label: label.to_string(),
        })
    }

    pub fn label(&self, key: u32) -> Option<&str> {
        self.labels.get(key as usize).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn save(&self, path: &Path) -> DatasetResult<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|e| DatasetError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> DatasetResult<Self> {
        let raw = fs::read(path).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut vocab: LabelVocab = serde_json::from_slice(&raw).map_err(|e| DatasetError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        vocab.index = vocab
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i as u32))
            .collect();
        Ok(vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_first_seen_order() {
        let mut vocab = LabelVocab::default();
        assert_eq!(vocab.insert("cat"), 0);
        assert_eq!(vocab.insert("dog"), 1);
        assert_eq!(vocab.insert("cat"), 0);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.label(1), Some("dog"));
    }

    #[test]
    fn unknown_label_is_an_error() {
        let vocab = LabelVocab::default();
        assert!(vocab.require_key("ferret").is_err());
    }

    #[test]
    fn save_and_load_preserve_key_assignment() -> anyhow::Result<()> {
        let mut vocab = LabelVocab::default();
        vocab.insert("cat");
        vocab.insert("dog");

        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("labels.json");
        vocab.save(&path)?;

        let loaded = LabelVocab::load(&path)?;
        assert_eq!(loaded.key("cat"), Some(0));
        assert_eq!(loaded.key("dog"), Some(1));
        assert_eq!(loaded.labels(), vocab.labels());
        Ok(())
    }
}
