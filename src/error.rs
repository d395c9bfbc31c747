use std::path::PathBuf;
use thiserror::Error;

/// The main error type for looselabel operations.
///
/// Only structural failures live here: conditions that make the input
/// uninterpretable as a whole. Per-record parse failures are recovered
/// locally and reported through [`crate::import::ImportReport`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("images root is not a directory: {path}")]
    MissingImagesRoot { path: PathBuf },

    #[error("annotation location is missing: {path}")]
    MissingAnnotationPath { path: PathBuf },

    #[error("no media file matches key '{key}' under {root}")]
    MediaNotFound { key: String, root: PathBuf },

    #[error("ambiguous media: '{stem}' matches {} files under {root}", candidates.len())]
    AmbiguousMedia {
        stem: String,
        root: PathBuf,
        candidates: Vec<PathBuf>,
    },

    #[error("column '{column}' not found in header of {path}")]
    ColumnNotFound { column: String, path: PathBuf },

    #[error("failed to read delimited records from {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid labelmap file {path}: {message}")]
    LabelmapInvalid { path: PathBuf, message: String },

    #[error("failed to decode mask image {path}: {source}")]
    MaskDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read dimensions of {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("failed to encode JSON summary: {0}")]
    SummaryEncode(#[from] serde_json::Error),

    #[error("missing required configuration key '{key}'")]
    MissingConfigKey { key: &'static str },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no supported layout detected at {path}")]
    NoFormatDetected { path: PathBuf },
}
