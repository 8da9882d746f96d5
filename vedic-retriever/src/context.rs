//! Shared service handles
//!
//! A [`ServiceContext`] is built once per process and handed to the
//! ingestor, the retrieval service and the library accessor. The embedder
//! and the vector index are created on first use; a failed initialization is
//! not cached, so the next caller tries again.

use crate::config::RetrieverConfig;
use crate::storage::VectorIndex;
use crate::storage::sqlite_store::SqliteVectorIndex;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::info;
use vedic_embed::{EmbeddingProvider, FastEmbedProvider};

pub struct ServiceContext {
    config: RetrieverConfig,
    embedder: OnceCell<Arc<dyn EmbeddingProvider>>,
    index: OnceCell<Arc<dyn VectorIndex>>,
    ingest_lock: Mutex<()>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("config", &self.config)
            .field("embedder_ready", &self.embedder.initialized())
            .field("index_ready", &self.index.initialized())
            .finish()
    }
}

impl ServiceContext {
    /// Handles are created lazily from `config`.
    pub fn new(config: RetrieverConfig) -> Self {
        Self {
            config,
            embedder: OnceCell::new(),
            index: OnceCell::new(),
            ingest_lock: Mutex::new(()),
        }
    }

    /// Use ready-made handles instead of building them from the config.
    pub fn with_components(
        config: RetrieverConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self::new(config).with_embedder(embedder).with_index(index)
    }

    pub fn with_embedder(self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder: OnceCell::new_with(Some(embedder)),
            ..self
        }
    }

    pub fn with_index(self, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            index: OnceCell::new_with(Some(index)),
            ..self
        }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// The embedder, loading the configured model on first call.
    pub async fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        let embedder = self
            .embedder
            .get_or_try_init(|| async {
                info!("Loading embedding model {}", self.config.embed.model_name);
                let provider = FastEmbedProvider::create(self.config.embed.clone()).await?;
                Ok::<_, anyhow::Error>(Arc::new(provider) as Arc<dyn EmbeddingProvider>)
            })
            .await?;
        Ok(Arc::clone(embedder))
    }

    /// The vector index, opening the configured SQLite file on first call.
    pub async fn index(&self) -> Result<Arc<dyn VectorIndex>> {
        let index = self
            .index
            .get_or_try_init(|| async {
                info!("Opening vector index at {}", self.config.index_path.display());
                let index = SqliteVectorIndex::open(&self.config.index_path).await?;
                Ok::<_, anyhow::Error>(Arc::new(index) as Arc<dyn VectorIndex>)
            })
            .await?;
        Ok(Arc::clone(index))
    }

    /// Held for the whole of an ingestion run.
    pub async fn ingest_lock(&self) -> MutexGuard<'_, ()> {
        self.ingest_lock.lock().await
    }
}
