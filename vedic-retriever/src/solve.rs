//! Query answering
//!
//! [`RetrievalService::solve`] embeds the raw problem text, asks the index
//! for the nearest hymns and either returns them or stays silent. It never
//! fails: an unavailable model or index becomes a "warming up" response.

use crate::context::ServiceContext;
use crate::storage::ScoredPoint;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use vedic_extract::format_source;

pub const WISDOM_FOUND: &str = "Wisdom Found";
pub const SILENCE_MESSAGE: &str = "The Veda is silent on this matter.";
pub const WARMING_UP_MESSAGE: &str = "The Veda is awakening. Please try again in a moment.";

/// Appended to every truncated verse, even when nothing was cut.
pub const ELLIPSIS: &str = "...";

/// First `max_chars` characters of `content` followed by [`ELLIPSIS`].
pub fn truncate_verse(content: &str, max_chars: usize) -> String {
    let mut verse: String = content.chars().take(max_chars).collect();
    verse.push_str(ELLIPSIS);
    verse
}

/// One hymn returned for a problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub title: String,
    pub verse: String,
    pub full_text: String,
    pub source: String,
    pub score: f32,
}

impl QueryResult {
    fn from_hit(hit: ScoredPoint, verse_chars: usize) -> Self {
        let payload = hit.payload;
        Self {
            verse: truncate_verse(&payload.content, verse_chars),
            source: format_source(&payload.book, &payload.hymn_num),
            title: payload.title,
            full_text: payload.content,
            score: hit.score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    Found,
    /// Best score under the silence threshold, or nothing indexed
    Silent,
    /// Embedder or index could not be reached
    WarmingUp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveResponse {
    pub solutions: Vec<QueryResult>,
    pub message: String,
    #[serde(skip)]
    pub outcome: SolveOutcome,
}

impl SolveResponse {
    pub fn found(solutions: Vec<QueryResult>) -> Self {
        Self {
            solutions,
            message: WISDOM_FOUND.to_string(),
            outcome: SolveOutcome::Found,
        }
    }

    pub fn silent() -> Self {
        Self {
            solutions: Vec::new(),
            message: SILENCE_MESSAGE.to_string(),
            outcome: SolveOutcome::Silent,
        }
    }

    pub fn warming_up() -> Self {
        Self {
            solutions: Vec::new(),
            message: WARMING_UP_MESSAGE.to_string(),
            outcome: SolveOutcome::WarmingUp,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalService {
    context: Arc<ServiceContext>,
}

impl RetrievalService {
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }

    pub async fn solve(&self, problem: &str) -> SolveResponse {
        let config = self.context.config();

        let embedder = match self.context.embedder().await {
            Ok(embedder) => embedder,
            Err(e) => {
                warn!("Embedder unavailable: {e:#}");
                return SolveResponse::warming_up();
            }
        };
        let query = match embedder.embed_text(problem).await {
            Ok(query) => query,
            Err(e) => {
                warn!("Failed to embed query: {e}");
                return SolveResponse::warming_up();
            }
        };
        let index = match self.context.index().await {
            Ok(index) => index,
            Err(e) => {
                warn!("Vector index unavailable: {e:#}");
                return SolveResponse::warming_up();
            }
        };
        let hits = match index.search(&config.collection, &query, config.top_k).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Search in {} failed: {e:#}", config.collection);
                return SolveResponse::warming_up();
            }
        };

        // The index returns hits best first
        let top_score = hits.first().map(|hit| hit.score);
        match top_score {
            Some(score) if score >= config.silence_threshold => {
                debug!("Top score {score:.3} for {problem:?}");
                SolveResponse::found(
                    hits.into_iter()
                        .map(|hit| QueryResult::from_hit(hit, config.verse_chars))
                        .collect(),
                )
            }
            _ => {
                debug!(
                    "Silent: top score {top_score:?} below {}",
                    config.silence_threshold
                );
                SolveResponse::silent()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_content_still_gets_ellipsis() {
        assert_eq!(truncate_verse("Om", 300), "Om...");
        assert_eq!(truncate_verse("", 300), "...");
    }

    #[test]
    fn test_truncate_counts_characters() {
        let content = "ṛta".repeat(200);
        let verse = truncate_verse(&content, 300);
        assert_eq!(verse.chars().count(), 303);
        assert!(verse.ends_with("..."));
        assert!(content.starts_with(verse.trim_end_matches("...")));
    }

    #[test]
    fn test_response_serialization() {
        let value = serde_json::to_value(SolveResponse::silent()).unwrap();
        assert_eq!(value["message"], SILENCE_MESSAGE);
        assert_eq!(value["solutions"], serde_json::json!([]));
        assert!(value.get("outcome").is_none());
    }
}
