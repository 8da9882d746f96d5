//! Ingestion failures

use std::path::PathBuf;

/// Why an ingestion run aborted.
///
/// Everything except [`IngestError::Index`] is raised before the collection
/// is touched.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Record set not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Invalid record set: {0}")]
    InvalidRecordSet(#[source] vedic_extract::ExtractError),

    #[error("{resource} unavailable: {reason}")]
    ResourceUnavailable {
        resource: &'static str,
        reason: String,
    },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector index write failed: {0}")]
    Index(#[source] anyhow::Error),
}

impl IngestError {
    pub fn embedder(reason: impl std::fmt::Display) -> Self {
        Self::ResourceUnavailable {
            resource: "embedder",
            reason: reason.to_string(),
        }
    }

    pub fn index(reason: impl std::fmt::Display) -> Self {
        Self::ResourceUnavailable {
            resource: "vector index",
            reason: reason.to_string(),
        }
    }
}

impl From<vedic_extract::ExtractError> for IngestError {
    fn from(err: vedic_extract::ExtractError) -> Self {
        match err {
            vedic_extract::ExtractError::SourceNotFound { path } => Self::SourceMissing { path },
            other => Self::InvalidRecordSet(other),
        }
    }
}
