//! Configuration for embedding models

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the model used when nothing else is configured.
pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Output dimensionality of the default model.
pub const DEFAULT_DIMENSION: usize = 384;

/// Configuration for embedding models
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct EmbedConfig {
    /// Name of the embedding model to use (e.g. "all-MiniLM-L6-v2")
    #[builder(default = "DEFAULT_MODEL_NAME.to_string()")]
    pub model_name: String,
    /// Directory where downloaded model files are cached
    #[builder(default = r#"PathBuf::from(".fastembed_cache")"#)]
    pub cache_dir: PathBuf,
    /// Maximum batch size for embedding generation
    #[builder(default = "32")]
    pub batch_size: usize,
    /// Whether to L2-normalize embeddings
    #[builder(default = "true")]
    pub normalize: bool,
    /// Show a progress bar while the model downloads
    #[builder(default = "false")]
    pub show_download_progress: bool,
}

impl EmbedConfig {
    /// Create a new embedding configuration using the builder
    pub fn builder() -> EmbedConfigBuilder {
        EmbedConfigBuilder::default()
    }

    /// Create a configuration for a named model with every other field defaulted
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    /// Default model, caching files under the given directory
    pub fn default_with_path<P: AsRef<Path>>(cache_dir: P) -> Self {
        Self::default().with_cache_dir(cache_dir)
    }

    /// Set the batch size for embedding generation (builder style)
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self { batch_size, ..self }
    }

    /// Set whether to normalize embeddings (builder style)
    pub fn with_normalize(self, normalize: bool) -> Self {
        Self { normalize, ..self }
    }

    /// Set the model cache directory (builder style)
    pub fn with_cache_dir<P: AsRef<Path>>(self, cache_dir: P) -> Self {
        Self {
            cache_dir: cache_dir.as_ref().to_path_buf(),
            ..self
        }
    }

    /// Get the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Key identifying a loaded model in the process-wide cache
    pub fn cache_key(&self) -> String {
        format!("{}@{}", self.model_name, self.cache_dir.display())
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            cache_dir: PathBuf::from(".fastembed_cache"),
            batch_size: 32,
            normalize: true,
            show_download_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_creation() {
        let config = EmbedConfig::new("bge-small-en-v1.5");

        assert_eq!(config.model_name, "bge-small-en-v1.5");
        assert_eq!(config.batch_size, 32);
        assert!(config.normalize);
        assert_eq!(config.cache_dir, PathBuf::from(".fastembed_cache"));
    }

    #[test]
    fn test_config_builder_methods() {
        let temp_dir = tempdir().unwrap();
        let config = EmbedConfig::default_with_path(temp_dir.path())
            .with_batch_size(64)
            .with_normalize(false);

        assert_eq!(config.batch_size, 64);
        assert!(!config.normalize);
        assert_eq!(config.cache_dir, temp_dir.path());
        assert_eq!(config.model_name(), DEFAULT_MODEL_NAME);
    }

    #[test]
    fn test_derive_builder_pattern() {
        let temp_dir = tempdir().unwrap();

        let config = EmbedConfig::builder()
            .model_name("all-MiniLM-L12-v2")
            .cache_dir(temp_dir.path())
            .batch_size(128usize)
            .normalize(false)
            .build()
            .unwrap();

        assert_eq!(config.model_name, "all-MiniLM-L12-v2");
        assert_eq!(config.batch_size, 128);
        assert!(!config.normalize);
        assert!(!config.show_download_progress);
    }

    #[test]
    fn test_builder_defaults_match_default_impl() {
        let built = EmbedConfig::builder().build().unwrap();
        assert_eq!(built, EmbedConfig::default());
    }

    #[test]
    fn test_cache_key_distinguishes_models_and_dirs() {
        let a = EmbedConfig::default();
        let b = EmbedConfig::new("all-MiniLM-L12-v2");
        let c = EmbedConfig::default().with_cache_dir("/tmp/other");

        assert_eq!(a.cache_key(), EmbedConfig::default().cache_key());
        assert_ne!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), c.cache_key());
        // batch size does not change which model is loaded
        assert_eq!(a.cache_key(), a.clone().with_batch_size(1).cache_key());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: EmbedConfig = serde_json::from_str(r#"{"batch_size": 8}"#).unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.model_name, DEFAULT_MODEL_NAME);
    }
}
