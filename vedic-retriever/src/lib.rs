//! vedic-retriever: semantic lookup of Atharva-Veda hymns
//!
//! Ingests the record set produced by `vedic-extract` into a vector index
//! and answers free-text "problems" with the closest hymns.
//!
//! ## Key Modules
//!
//! - **[`storage`]**: vector index abstraction with a SQLite implementation
//! - **[`context`]**: lazily initialized embedder and index shared by the services
//! - **[`ingest`]**: destructive-replace ingestion
//! - **[`solve`]**: query embedding, search and the silence threshold
//! - **[`library`]**: full listing and random verse
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vedic_retriever::{Ingestor, RetrievalService, RetrieverConfig, ServiceContext};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let context = Arc::new(ServiceContext::new(RetrieverConfig::default()));
//! Ingestor::new(context.clone()).ingest().await?;
//!
//! let response = RetrievalService::new(context).solve("I am afraid").await;
//! for solution in response.solutions {
//!     println!("{} ({}): {}", solution.title, solution.source, solution.verse);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! record set → Ingestor → Embedder → VectorIndex
//!                                        ↓
//! problem → RetrievalService → Embedder → search → threshold → solutions
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod ingest;
pub mod library;
pub mod solve;
pub mod storage;

pub use config::RetrieverConfig;
pub use context::ServiceContext;
pub use error::IngestError;
pub use ingest::{IngestReport, Ingestor};
pub use library::{LibraryAccessor, LibraryView, RandomVerse, RandomVerseView};
pub use solve::{QueryResult, RetrievalService, SolveOutcome, SolveResponse, truncate_verse};
