//! Read access to the persisted record set.

use crate::context::ServiceContext;
use crate::solve::truncate_verse;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use vedic_extract::{ExtractError, HymnRecord, load_record_set};

/// The whole record set, or an error indicator when it cannot be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LibraryView {
    Records(Vec<HymnRecord>),
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomVerse {
    pub title: String,
    pub verse: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RandomVerseView {
    Verse(RandomVerse),
    Error { error: String },
}

#[derive(Debug, Clone)]
pub struct LibraryAccessor {
    context: Arc<ServiceContext>,
}

impl LibraryAccessor {
    pub fn new(context: Arc<ServiceContext>) -> Self {
        Self { context }
    }

    pub fn get_library(&self) -> LibraryView {
        match self.load() {
            Ok(records) => LibraryView::Records(records),
            Err(error) => LibraryView::Error { error },
        }
    }

    pub fn get_random_verse(&self) -> RandomVerseView {
        self.get_random_verse_with(&mut rand::thread_rng())
    }

    /// Uniform pick using the given generator.
    pub fn get_random_verse_with<R: Rng + ?Sized>(&self, rng: &mut R) -> RandomVerseView {
        let records = match self.load() {
            Ok(records) => records,
            Err(error) => return RandomVerseView::Error { error },
        };

        match records.choose(rng) {
            Some(record) => RandomVerseView::Verse(RandomVerse {
                title: record.title.clone(),
                verse: truncate_verse(&record.content, self.context.config().random_verse_chars),
                source: record.source(),
            }),
            None => RandomVerseView::Error {
                error: "Library is empty".to_string(),
            },
        }
    }

    fn load(&self) -> Result<Vec<HymnRecord>, String> {
        let path = &self.context.config().record_set_path;
        load_record_set(path).map_err(|e| {
            warn!("Library unavailable: {e}");
            match e {
                ExtractError::SourceNotFound { .. } => "Library not found".to_string(),
                other => other.to_string(),
            }
        })
    }
}
