use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for labeldesk operations.
#[derive(Debug, Error)]
pub enum LabeldeskError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid image dimensions {width}x{height} (must be positive)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Invalid dataset layout at {path}: {message}")]
    DatasetLayoutInvalid { path: PathBuf, message: String },

    #[error("Invalid YAML format in {path}: {source}")]
    ClassesYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid class list in {path}: {message}")]
    ClassesYamlInvalid { path: PathBuf, message: String },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse boxes JSON from {path}: {source}")]
    BoxesJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize output: {0}")]
    OutputSerialize(#[source] serde_json::Error),

    #[error("Quality report found {error_count} error(s) and {warning_count} warning(s)")]
    ReportFailed {
        error_count: usize,
        warning_count: usize,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl LabeldeskError {
    /// Builds a closure that wraps an [`std::io::Error`] with the path it happened on.
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
