//! The hymn accumulator.
//!
//! [`HymnExtractor`] is a two-state machine fed one line at a time:
//!
//! ```text
//!                 header                        header (emit current)
//! NoActiveRecord ────────> AccumulatingRecord ──────────────┐
//!    │  body: discard            │  body: append           │
//!    └──────┘                    └──────┘   <──────────────┘
//! ```
//!
//! `finish` emits whatever record is still open.

use crate::config::ExtractorConfig;
use crate::document::{Document, StartPage, find_start_page};
use crate::error::Result;
use crate::line::{LineKind, classify_line};
use crate::record::HymnRecord;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtractorState {
    #[default]
    NoActiveRecord,
    AccumulatingRecord(HymnRecord),
}

/// What a single line did to the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank, boilerplate or page number
    Skipped,
    /// A header opened a new record (after emitting the previous one, if any)
    Started,
    Appended,
    /// Body text before the first header
    Discarded,
}

#[derive(Debug)]
pub struct HymnExtractor<'c> {
    config: &'c ExtractorConfig,
    state: ExtractorState,
    records: Vec<HymnRecord>,
}

impl<'c> HymnExtractor<'c> {
    pub fn new(config: &'c ExtractorConfig) -> Self {
        Self {
            config,
            state: ExtractorState::NoActiveRecord,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> &ExtractorState {
        &self.state
    }

    /// Records emitted so far, not counting the open one.
    pub fn emitted(&self) -> &[HymnRecord] {
        &self.records
    }

    pub fn feed_line(&mut self, line: &str, page: usize) -> LineOutcome {
        match classify_line(line, self.config) {
            LineKind::Skip => LineOutcome::Skipped,
            LineKind::Header(header) => {
                self.emit_active();
                let record = HymnRecord::new(header.book, header.hymn_number, header.title(), page);
                self.state = ExtractorState::AccumulatingRecord(record);
                LineOutcome::Started
            }
            LineKind::Body(text) => match &mut self.state {
                ExtractorState::AccumulatingRecord(record) => {
                    record.push_line(text);
                    LineOutcome::Appended
                }
                ExtractorState::NoActiveRecord => LineOutcome::Discarded,
            },
        }
    }

    /// Feed every line of one page.
    pub fn feed_page(&mut self, text: &str, page: usize) {
        for line in text.lines() {
            self.feed_line(line, page);
        }
    }

    /// Emit the open record and return all records in document order.
    pub fn finish(mut self) -> Vec<HymnRecord> {
        self.emit_active();
        tracing::info!("Extracted {} hymns", self.records.len());
        self.records
    }

    fn emit_active(&mut self) {
        if let ExtractorState::AccumulatingRecord(record) = std::mem::take(&mut self.state) {
            tracing::debug!(
                "Extracted: {} (Bk {}, Hymn {})",
                record.title,
                record.book,
                record.hymn_number
            );
            self.records.push(record);
        }
    }
}

/// Run the extractor over every page from `start` to the end of the document.
pub fn extract_records(document: &Document, start: usize, config: &ExtractorConfig) -> Vec<HymnRecord> {
    let mut extractor = HymnExtractor::new(config);
    for (index, text) in document.pages().iter().enumerate().skip(start) {
        extractor.feed_page(text, index);
    }
    extractor.finish()
}

/// Result of extracting a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub records: Vec<HymnRecord>,
    pub start: StartPage,
    pub page_count: usize,
}

/// Load a document, locate the start page and extract its hymns.
pub fn extract_document(path: &Path, config: &ExtractorConfig) -> Result<Extraction> {
    let document = Document::open(path)?;
    let start = find_start_page(&document, config);
    let records = extract_records(&document, start.page, config);
    Ok(Extraction {
        records,
        start,
        page_count: document.page_count(),
    })
}
