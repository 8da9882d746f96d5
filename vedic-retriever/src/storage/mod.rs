//! Vector index abstraction for the hymn collection
//!
//! The retrieval core talks to its index only through [`VectorIndex`]: named
//! collections of integer-keyed points, each holding a vector and a
//! [`PointPayload`]. Collections are replaced wholesale on ingestion and
//! queried by nearest-neighbour search.
//!
//! ## Architecture
//!
//! ```text
//! Ingestor ──┐
//!            ├─ VectorIndex ── SqliteVectorIndex (concrete implementation)
//! RetrievalService ─┘
//! ```

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vedic_extract::HymnRecord;

pub mod sqlite_store;

/// Position of a point in the ingested sequence.
pub type PointId = u64;

/// Similarity metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    Cosine,
    Dot,
}

impl Distance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "cosine",
            Distance::Dot => "dot",
        }
    }
}

impl std::str::FromStr for Distance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Distance::Cosine),
            "dot" => Ok(Distance::Dot),
            _ => Err(anyhow::anyhow!("Unknown distance metric: {s}")),
        }
    }
}

/// Vector parameters fixed at collection creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionConfig {
    pub dimension: usize,
    pub distance: Distance,
}

impl CollectionConfig {
    pub fn cosine(dimension: usize) -> Self {
        Self {
            dimension,
            distance: Distance::Cosine,
        }
    }
}

/// Stored metadata of one hymn. Field names match the collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayload {
    pub title: String,
    pub book: String,
    pub hymn_num: String,
    pub content: String,
    pub page: usize,
}

impl From<&HymnRecord> for PointPayload {
    fn from(record: &HymnRecord) -> Self {
        Self {
            title: record.title.clone(),
            book: record.book.clone(),
            hymn_num: record.hymn_number.clone(),
            content: record.content.clone(),
            page: record.page,
        }
    }
}

/// A point as written to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedPoint {
    pub id: PointId,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

/// A search hit. Higher scores are more similar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPoint {
    pub id: PointId,
    pub score: f32,
    pub payload: PointPayload,
}

/// Collection statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub dimension: usize,
    pub distance: Distance,
    pub created_at: DateTime<Utc>,
    pub points_count: usize,
}

/// Operations the retrieval core needs from a vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Drop a collection and its points. Returns false if it did not exist.
    async fn delete_collection(&self, name: &str) -> Result<bool>;

    /// Fails if the collection already exists.
    async fn create_collection(&self, name: &str, config: CollectionConfig) -> Result<()>;

    /// Insert or replace points in one write. Every vector must match the collection dimension.
    async fn upsert(&self, name: &str, points: Vec<IndexedPoint>) -> Result<()>;

    /// Up to `limit` points, most similar first.
    async fn search(&self, name: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>>;

    async fn count(&self, name: &str) -> Result<usize>;

    /// `None` when the collection does not exist.
    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>>;
}
