//! Core types and error definitions for dataset handling.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json parse error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown label {label:?}")]
    UnknownLabel { label: String },
}

/// One labeled image on disk. Produced by enumeration; immutable downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub label: String,
}

/// Where the textual label of an image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSource {
    /// Name of the immediate parent directory.
    FolderName,
    /// Maximal leading alphabetic prefix of the file name; empty if the
    /// name starts with a non-letter.
    FileNamePrefix,
}
