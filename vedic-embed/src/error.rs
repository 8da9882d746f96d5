//! Error types for the embedding system

/// Result type for embedding operations.
///
/// Convenience alias using [`EmbedError`] as the error type.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Error type for all embedding operations.
///
/// Covers configuration mistakes, model loading failures and runtime failures
/// while generating vectors. Each variant carries enough context to tell the
/// caller which stage failed.
///
/// # Error Categories
///
/// - **Configuration Errors**: Unknown model names or invalid settings
/// - **Initialization Errors**: Failures while loading the ONNX model
/// - **Runtime Errors**: Problems during actual embedding generation
/// - **External Errors**: Failures from dependencies
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// The configured model name does not map to a known model
    #[error("Unsupported embedding model: {name}")]
    UnsupportedModel { name: String },

    /// Error when model configuration is invalid
    #[error("Invalid model configuration: {message}")]
    InvalidConfig { message: String },

    /// Error during model initialization
    #[error("Model initialization failed: {source}")]
    ModelInitialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error during embedding generation
    #[error("Embedding generation failed: {source}")]
    EmbeddingGeneration {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A shared model handle was poisoned by a panicking thread
    #[error("Model lock poisoned: {context}")]
    LockPoisoned { context: &'static str },

    /// IO errors when preparing the model cache directory
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Async task join errors
    #[error("Async task failed: {source}")]
    AsyncTask {
        #[from]
        source: tokio::task::JoinError,
    },

    /// Generic errors from other libraries
    #[error("External error: {source}")]
    External {
        #[from]
        source: anyhow::Error,
    },
}

impl EmbedError {
    /// Wrap an error raised while loading a model.
    pub fn model_init<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ModelInitialization {
            source: Box::new(source),
        }
    }

    /// Wrap an error raised while generating embeddings.
    pub fn embedding_gen<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::EmbeddingGeneration {
            source: Box::new(source),
        }
    }

    /// Create an invalid configuration error with a custom message.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
