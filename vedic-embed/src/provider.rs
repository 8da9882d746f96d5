//! Embedding provider implementations

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// Result of embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    /// The generated embeddings, one per input text
    pub embeddings: Vec<Vec<f32>>,
    /// The dimension of each embedding vector
    pub dimension: usize,
}

impl EmbeddingResult {
    /// Create a new embedding result.
    ///
    /// The dimension is inferred from the first embedding vector and is 0 when
    /// there are no embeddings.
    pub fn new(embeddings: Vec<Vec<f32>>) -> Self {
        let dimension = embeddings.first().map(|e| e.len()).unwrap_or(0);
        Self {
            embeddings,
            dimension,
        }
    }

    /// Number of embedding vectors in this result.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Returns `true` if this result contains no embedding vectors.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

/// Trait for embedding providers that can generate embeddings from text
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate the embedding for a single text
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batch processing)
    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult>;

    /// Dimension of embeddings produced by this provider
    fn embedding_dimension(&self) -> usize;

    /// Name/identifier of this provider
    fn provider_name(&self) -> &str;
}

/// Type alias for cached model entries (model, dimension)
type ModelCacheEntry = (Arc<Mutex<TextEmbedding>>, usize);

/// Global cache for initialized embedding models to avoid reloading
static MODEL_CACHE: OnceLock<Mutex<HashMap<String, ModelCacheEntry>>> = OnceLock::new();

fn get_model_cache() -> &'static Mutex<HashMap<String, ModelCacheEntry>> {
    MODEL_CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Map a configured model name onto a built-in fastembed model.
pub fn resolve_model(name: &str) -> Result<EmbeddingModel> {
    let normalized = name.to_ascii_lowercase();
    let short = normalized.rsplit('/').next().unwrap_or(&normalized);
    match short {
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        _ => Err(EmbedError::UnsupportedModel {
            name: name.to_string(),
        }),
    }
}

/// FastEmbed-based embedding provider using local ONNX models
#[derive(Clone)]
pub struct FastEmbedProvider {
    config: EmbedConfig,
    model: Option<Arc<Mutex<TextEmbedding>>>,
    dimension: usize,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("config", &self.config)
            .field("model", &self.model.is_some())
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl FastEmbedProvider {
    /// Creates a new uninitialized provider. Call [`initialize`](Self::initialize) before use.
    pub fn new(config: EmbedConfig) -> Self {
        Self {
            config,
            model: None,
            dimension: crate::config::DEFAULT_DIMENSION,
        }
    }

    /// Loads the embedding model, reusing an already loaded one from the process-wide cache.
    pub async fn initialize(&mut self) -> Result<()> {
        tracing::info!(
            "Initializing FastEmbed provider for model: {}",
            self.config.model_name()
        );

        let model_kind = resolve_model(self.config.model_name())?;
        let cache_key = self.config.cache_key();

        let cached_data = {
            let cache = get_model_cache().lock().map_err(|_| EmbedError::LockPoisoned {
                context: "model cache",
            })?;
            cache
                .get(&cache_key)
                .map(|(model, dim)| (Arc::clone(model), *dim))
        };

        if let Some((cached_model, cached_dimension)) = cached_data {
            tracing::info!("Using cached model for: {}", self.config.model_name());
            self.model = Some(cached_model);
            self.dimension = cached_dimension;
            return self.validate_model().await;
        }

        tokio::fs::create_dir_all(&self.config.cache_dir).await?;

        let config = self.config.clone();
        let (model, dimension) =
            tokio::task::spawn_blocking(move || -> Result<(TextEmbedding, usize)> {
                tracing::info!("Loading embedding model: {}", config.model_name());

                let init_options = InitOptions::new(model_kind)
                    .with_cache_dir(config.cache_dir.clone())
                    .with_show_download_progress(config.show_download_progress);

                let mut model = TextEmbedding::try_new(init_options)
                    .map_err(|e| EmbedError::External { source: e })?;

                // Probe the output size with a throwaway embedding
                let probe = model
                    .embed(vec!["probe".to_string()], None)
                    .map_err(|e| EmbedError::External { source: e })?;
                let dimension = probe
                    .first()
                    .map(|emb| emb.len())
                    .unwrap_or(crate::config::DEFAULT_DIMENSION);

                tracing::info!("Model loaded successfully. Dimension: {}", dimension);
                Ok((model, dimension))
            })
            .await??;

        let model_arc = Arc::new(Mutex::new(model));

        // Another task may have raced us to the same model; keep whichever landed first
        let (model_arc, dimension) = {
            let mut cache = get_model_cache().lock().map_err(|_| EmbedError::LockPoisoned {
                context: "model cache",
            })?;
            let entry = cache
                .entry(cache_key)
                .or_insert_with(|| (Arc::clone(&model_arc), dimension));
            (Arc::clone(&entry.0), entry.1)
        };

        self.model = Some(model_arc);
        self.dimension = dimension;

        self.validate_model().await
    }

    /// Creates and initializes a provider in one step.
    pub async fn create(config: EmbedConfig) -> Result<Self> {
        let mut provider = Self::new(config);
        provider.initialize().await?;
        Ok(provider)
    }

    /// Validate that the model produces finite vectors of the expected size
    async fn validate_model(&self) -> Result<()> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| EmbedError::invalid_config("Model not initialized"))?;

        let model_clone = Arc::clone(model);
        let validation_result = tokio::task::spawn_blocking(move || -> Result<Vec<Vec<f32>>> {
            let mut model_guard = model_clone.lock().map_err(|_| EmbedError::LockPoisoned {
                context: "embedding model",
            })?;
            model_guard
                .embed(vec!["validation test".to_string()], None)
                .map_err(|e| EmbedError::External { source: e })
        })
        .await??;

        let embedding = validation_result.first().ok_or_else(|| {
            EmbedError::invalid_config("Model validation failed: no embeddings generated")
        })?;

        if embedding.len() != self.dimension {
            return Err(EmbedError::invalid_config(format!(
                "Model validation failed: expected dimension {}, got {}",
                self.dimension,
                embedding.len()
            )));
        }

        if embedding.iter().any(|value| !value.is_finite()) {
            return Err(EmbedError::invalid_config(
                "Model validation failed: non-finite values in embedding",
            ));
        }

        tracing::debug!("Model validation passed for: {}", self.config.model_name());
        Ok(())
    }

    /// Clears the global model cache.
    pub fn clear_cache() {
        if let Ok(mut cache_guard) = get_model_cache().lock() {
            cache_guard.clear();
            tracing::info!("Model cache cleared");
        }
    }

    /// Returns the number of cached models.
    pub fn cache_size() -> usize {
        get_model_cache()
            .lock()
            .map(|cache_guard| cache_guard.len())
            .unwrap_or(0)
    }

    fn postprocess(&self, embeddings: Vec<Vec<f32>>) -> Vec<Vec<f32>> {
        if !self.config.normalize {
            return embeddings;
        }
        embeddings.into_iter().map(l2_normalize).collect()
    }
}

/// Scale a vector to unit length; zero vectors are returned unchanged.
pub fn l2_normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut embedding {
            *value /= norm;
        }
    }
    embedding
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let texts = vec![text.to_string()];
        let result = self.embed_texts(&texts).await?;
        result
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::invalid_config("No embedding generated for text"))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        if texts.is_empty() {
            return Ok(EmbeddingResult::new(vec![]));
        }

        let model = self.model.as_ref().ok_or_else(|| {
            EmbedError::invalid_config("Model not initialized. Call initialize() first.")
        })?;

        tracing::debug!("Generating embeddings for {} texts", texts.len());

        let batch_size = self.config.batch_size.max(1);
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(batch_size) {
            let chunk = chunk.to_vec();
            let model_clone = Arc::clone(model);

            let batch_embeddings = tokio::task::spawn_blocking(move || -> Result<Vec<Vec<f32>>> {
                tracing::debug!("Processing batch of {} texts", chunk.len());

                let mut model_guard = model_clone.lock().map_err(|_| EmbedError::LockPoisoned {
                    context: "embedding model",
                })?;
                model_guard
                    .embed(chunk, None)
                    .map_err(|e| EmbedError::External { source: e })
            })
            .await??;

            all_embeddings.extend(self.postprocess(batch_embeddings));
        }

        tracing::debug!("Generated {} embeddings", all_embeddings.len());
        Ok(EmbeddingResult::new(all_embeddings))
    }

    fn embedding_dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        "fastembed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_result() {
        let embeddings = vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]];
        let result = EmbeddingResult::new(embeddings);

        assert_eq!(result.len(), 2);
        assert_eq!(result.dimension, 3);
        assert!(!result.is_empty());
        assert_eq!(EmbeddingResult::new(vec![]).dimension, 0);
    }

    #[test]
    fn test_fastembed_provider_creation() {
        let provider = FastEmbedProvider::new(EmbedConfig::default());

        assert_eq!(provider.provider_name(), "fastembed");
        assert_eq!(provider.embedding_dimension(), 384);
    }

    #[test]
    fn test_resolve_model_names() {
        assert!(matches!(
            resolve_model("all-MiniLM-L6-v2"),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            resolve_model("sentence-transformers/all-MiniLM-L6-v2"),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            resolve_model("BAAI/bge-small-en-v1.5"),
            Ok(EmbeddingModel::BGESmallENV15)
        ));
        assert!(matches!(
            resolve_model("ModernBERT-large"),
            Err(EmbedError::UnsupportedModel { .. })
        ));
    }

    #[test]
    fn test_l2_normalize() {
        let v = l2_normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert_eq!(l2_normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_uninitialized_provider_rejects_embedding() {
        let provider = FastEmbedProvider::new(EmbedConfig::default());
        let err = provider.embed_text("hello").await.unwrap_err();
        assert!(matches!(err, EmbedError::InvalidConfig { .. }));
        // empty input never touches the model
        assert!(provider.embed_texts(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_model_fails_before_download() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = EmbedConfig::new("not-a-model").with_cache_dir(temp_dir.path());
        let err = FastEmbedProvider::create(config).await.unwrap_err();
        assert!(matches!(err, EmbedError::UnsupportedModel { .. }));
    }

    #[tokio::test]
    #[ignore] // Downloads all-MiniLM-L6-v2 - run with: cargo test -p vedic-embed test_minilm_download_and_embedding -- --ignored
    async fn test_minilm_download_and_embedding() -> Result<()> {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .try_init()
            .ok();

        let temp_dir = tempfile::tempdir()?;
        FastEmbedProvider::clear_cache();

        let config = EmbedConfig::default_with_path(temp_dir.path());
        let provider = FastEmbedProvider::create(config.clone()).await?;
        assert_eq!(FastEmbedProvider::cache_size(), 1);
        assert_eq!(provider.embedding_dimension(), 384);

        let fear = provider.embed_text("I am afraid").await?;
        assert_eq!(fear.len(), 384);
        assert!(fear.iter().all(|x| x.is_finite()));

        let batch = provider
            .embed_texts(&[
                "CHARM AGAINST FEAR. May the gods protect us from all fear.".to_string(),
                "Hymn to the plough and the harvest.".to_string(),
            ])
            .await?;
        let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
        assert!(dot(&fear, &batch.embeddings[0]) > dot(&fear, &batch.embeddings[1]));

        // A second provider with the same config reuses the cached model
        let _again = FastEmbedProvider::create(config).await?;
        assert_eq!(FastEmbedProvider::cache_size(), 1);

        FastEmbedProvider::clear_cache();
        Ok(())
    }
}
