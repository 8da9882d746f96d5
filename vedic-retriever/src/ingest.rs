//! Destructive-replace ingestion of the record set into the vector index.
//!
//! Every hymn is embedded before the collection is touched, so a missing
//! record set, an unavailable model or a dimension mismatch leaves the
//! previous collection in place. Once the old collection is dropped the new
//! one is created and filled in a single write.

use crate::context::ServiceContext;
use crate::error::IngestError;
use crate::storage::{CollectionConfig, IndexedPoint, PointId, PointPayload};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};
use vedic_extract::{HymnRecord, load_record_set};

/// Progress is logged each time this many hymns have been embedded.
pub const PROGRESS_INTERVAL: usize = 50;

/// Summary of a completed ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub collection: String,
    pub records: usize,
    pub points_written: usize,
    pub dimension: usize,
    /// Whether an earlier collection was dropped
    pub replaced_existing: bool,
}

#[derive(Debug, Clone)]
pub struct Ingestor {
    context: Arc<ServiceContext>,
}

impl Ingestor {
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }

    /// Load the configured record set and replace the collection with it.
    pub async fn ingest(&self) -> Result<IngestReport, IngestError> {
        let path = &self.context.config().record_set_path;
        let records = load_record_set(path).map_err(|e| {
            error!("Aborting ingestion, cannot load {}: {}", path.display(), e);
            IngestError::from(e)
        })?;
        self.ingest_records(&records).await
    }

    /// Replace the collection with `records`. Point ids are positions in the slice.
    pub async fn ingest_records(&self, records: &[HymnRecord]) -> Result<IngestReport, IngestError> {
        let _guard = self.context.ingest_lock().await;
        let config = self.context.config();

        let embedder = self.context.embedder().await.map_err(|e| {
            error!("Aborting ingestion, embedder unavailable: {e:#}");
            IngestError::embedder(format!("{e:#}"))
        })?;
        let index = self.context.index().await.map_err(|e| {
            error!("Aborting ingestion, vector index unavailable: {e:#}");
            IngestError::index(format!("{e:#}"))
        })?;

        let dimension = embedder.embedding_dimension();
        info!(
            "Embedding {} hymns with {} ({} dimensions)",
            records.len(),
            embedder.provider_name(),
            dimension
        );

        let texts: Vec<String> = records.iter().map(HymnRecord::embedding_text).collect();
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(config.embed.batch_size.max(1)) {
            let result = embedder.embed_texts(batch).await.map_err(|e| {
                error!("Aborting ingestion, embedding failed: {e}");
                IngestError::embedder(e)
            })?;

            let before = vectors.len();
            vectors.extend(result.embeddings);
            for step in (before / PROGRESS_INTERVAL + 1)..=(vectors.len() / PROGRESS_INTERVAL) {
                info!("Processed {} hymns", step * PROGRESS_INTERVAL);
            }
        }

        if vectors.len() != records.len() {
            return Err(IngestError::embedder(format!(
                "{} embeddings returned for {} hymns",
                vectors.len(),
                records.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(IngestError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        let points: Vec<IndexedPoint> = records
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(position, (record, vector))| IndexedPoint {
                id: position as PointId,
                vector,
                payload: PointPayload::from(record),
            })
            .collect();

        let collection = config.collection.as_str();
        let replaced_existing = index
            .collection_exists(collection)
            .await
            .map_err(IngestError::index)?;
        if replaced_existing {
            debug!("Dropping existing collection {collection}");
            index
                .delete_collection(collection)
                .await
                .map_err(IngestError::Index)?;
        }
        index
            .create_collection(collection, CollectionConfig::cosine(dimension))
            .await
            .map_err(IngestError::Index)?;

        let points_written = points.len();
        index
            .upsert(collection, points)
            .await
            .map_err(|e| {
                error!("Upsert into {collection} failed: {e:#}");
                IngestError::Index(e)
            })?;

        info!("Ingested {points_written} hymns into {collection}");
        Ok(IngestReport {
            collection: collection.to_string(),
            records: records.len(),
            points_written,
            dimension,
            replaced_existing,
        })
    }
}
