//! Error types for document loading and record-set persistence

use std::path::PathBuf;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors surfaced by the extractor boundary.
///
/// Line-level anomalies never show up here: lines that fail to classify are
/// skipped. Only problems with whole sources are reported.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The source document or record set does not exist
    #[error("Source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The document exists but its text could not be read
    #[error("Could not read text from {path}: {message}")]
    UnreadableDocument { path: PathBuf, message: String },

    /// The persisted record set is not a valid JSON array of hymn records
    #[error("Invalid record set at {path}: {source}")]
    InvalidRecordSet {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl ExtractError {
    /// Whether this error is the "source missing" outcome rather than a read failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. })
    }
}
