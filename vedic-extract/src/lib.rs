//! # vedic-extract
//!
//! Turns the page text of a scanned Atharva-Veda translation into an ordered
//! list of [`HymnRecord`]s.
//!
//! ```
//! use vedic_extract::{Document, ExtractorConfig, extract_records};
//!
//! let document = Document::from_text(
//!     "The Four Vedas\nVI, 105. CHARM AGAINST FEAR. 1480\nMay the gods protect us\nfrom all fear.\n",
//! );
//! let records = extract_records(&document, 0, &ExtractorConfig::default());
//!
//! assert_eq!(records[0].source(), "Book VI, Hymn 105");
//! assert_eq!(records[0].title, "CHARM AGAINST FEAR");
//! assert_eq!(records[0].content, "May the gods protect us from all fear. ");
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod line;
pub mod record;

pub use config::ExtractorConfig;
pub use document::{Document, StartPage, find_start_page};
pub use error::{ExtractError, Result};
pub use extractor::{
    Extraction, ExtractorState, HymnExtractor, LineOutcome, extract_document, extract_records,
};
pub use line::{HeaderLine, LineKind, classify_line};
pub use record::{HymnRecord, format_source, load_record_set, save_record_set};
