//! Error types for geopatch.

use thiserror::Error;

/// Error type for geopatch operations.
///
/// Every variant is fatal to a run. The task engine itself never produces
/// errors; these come from loading tasks, decoding or encoding the dataset,
/// and writing the result.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON task file parsing error
    #[error("task file parsing error: {0}")]
    TaskParse(#[from] serde_json::Error),

    /// YAML task file parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed dataset bytes
    #[error("dataset decode error at offset {offset}: {reason}")]
    Decode { offset: usize, reason: String },

    /// Dataset could not be re-encoded
    #[error("dataset encode error: {0}")]
    Encode(String),

    /// Download error
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn decode(offset: usize, reason: impl Into<String>) -> Self {
        Error::Decode {
            offset,
            reason: reason.into(),
        }
    }
}

/// Result type alias for geopatch operations.
pub type Result<T> = std::result::Result<T, Error>;
