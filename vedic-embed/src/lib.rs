//! # vedic-embed
//!
//! Text embedding for the hymn retrieval workspace. Wraps local ONNX models
//! through FastEmbed behind an async [`EmbeddingProvider`] trait so the
//! ingestion and query paths never depend on a concrete model.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vedic_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider};
//!
//! # async fn example() -> anyhow::Result<()> {
//! // all-MiniLM-L6-v2, 384 dimensions
//! let provider = FastEmbedProvider::create(EmbedConfig::default()).await?;
//!
//! let vector = provider.embed_text("I am afraid").await?;
//! assert_eq!(vector.len(), provider.embedding_dimension());
//! # Ok(())
//! # }
//! ```
//!
//! ## Providers
//!
//! - [`FastEmbedProvider`]: built-in fastembed models (`all-MiniLM-L6-v2`,
//!   `all-MiniLM-L12-v2`, `bge-small-en-v1.5`). Loaded models are cached
//!   process-wide, so creating a second provider for the same model is cheap.
//! - [`MockEmbeddingProvider`]: deterministic token hashing, no model files.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`] using the crate's [`EmbedError`] type.

pub mod config;
pub mod error;
pub mod mock;
pub mod provider;

// Re-export main types for easy access
pub use config::{DEFAULT_DIMENSION, DEFAULT_MODEL_NAME, EmbedConfig};
pub use error::{EmbedError, Result};
pub use mock::MockEmbeddingProvider;
pub use provider::{EmbeddingProvider, EmbeddingResult, FastEmbedProvider};
