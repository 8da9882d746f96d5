//! Retriever configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! record_set_path = "data/atharva_dataset.json"
//! top_k = 5
//!
//! [embed]
//! model_name = "bge-small-en-v1.5"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vedic_embed::EmbedConfig;

pub const DEFAULT_COLLECTION: &str = "atharva_knowledge";
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_VERSE_CHARS: usize = 300;
pub const DEFAULT_RANDOM_VERSE_CHARS: usize = 250;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Persisted record set produced by the extractor
    pub record_set_path: PathBuf,
    /// SQLite file holding the vector index
    pub index_path: PathBuf,
    pub collection: String,
    pub top_k: usize,
    /// Results are withheld when the best score is below this
    pub silence_threshold: f32,
    /// Characters of content shown per solution
    pub verse_chars: usize,
    /// Characters of content shown for a random verse
    pub random_verse_chars: usize,
    pub embed: EmbedConfig,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            record_set_path: PathBuf::from("data/atharva_dataset.json"),
            index_path: PathBuf::from(".vedic-index.db"),
            collection: DEFAULT_COLLECTION.to_string(),
            top_k: DEFAULT_TOP_K,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            verse_chars: DEFAULT_VERSE_CHARS,
            random_verse_chars: DEFAULT_RANDOM_VERSE_CHARS,
            embed: EmbedConfig::default(),
        }
    }
}

impl RetrieverConfig {
    /// Load from a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config from {}: {}", path.display(), e)
        })
    }

    pub fn with_record_set_path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            record_set_path: path.as_ref().to_path_buf(),
            ..self
        }
    }

    pub fn with_index_path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            index_path: path.as_ref().to_path_buf(),
            ..self
        }
    }

    pub fn with_collection(self, collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..self
        }
    }

    pub fn with_top_k(self, top_k: usize) -> Self {
        Self { top_k, ..self }
    }

    pub fn with_silence_threshold(self, silence_threshold: f32) -> Self {
        Self {
            silence_threshold,
            ..self
        }
    }

    pub fn with_embed_config(self, embed: EmbedConfig) -> Self {
        Self { embed, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = RetrieverConfig::default();
        assert_eq!(config.collection, "atharva_knowledge");
        assert_eq!(config.top_k, 3);
        assert_eq!(config.silence_threshold, 0.25);
        assert_eq!(config.verse_chars, 300);
        assert_eq!(config.random_verse_chars, 250);
        assert_eq!(config.embed.model_name, vedic_embed::DEFAULT_MODEL_NAME);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("vedic.toml");
        std::fs::write(
            &path,
            r#"
            top_k = 5
            silence_threshold = 0.4

            [embed]
            model_name = "bge-small-en-v1.5"
            "#,
        )
        .unwrap();

        let config = RetrieverConfig::load(&path).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.silence_threshold, 0.4);
        assert_eq!(config.embed.model_name, "bge-small-en-v1.5");
        assert_eq!(config.embed.batch_size, 32);
        assert_eq!(config.collection, DEFAULT_COLLECTION);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("vedic.toml");
        std::fs::write(&path, "top_k = \"three\"").unwrap();
        assert!(RetrieverConfig::load(&path).is_err());
    }
}
