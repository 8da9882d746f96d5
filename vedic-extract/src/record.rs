//! Hymn records and the persisted record-set format.
//!
//! At rest a record set is a pretty-printed JSON array:
//!
//! ```json
//! [
//!   {
//!     "id": "VI_105",
//!     "book": "VI",
//!     "hymn": "105",
//!     "title": "CHARM AGAINST COUGH",
//!     "content": "As the soul with the soul's desires swiftly to a distance flies, ",
//!     "page": 1480
//!   }
//! ]
//! ```

use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One hymn extracted from the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HymnRecord {
    /// `{book}_{hymn_number}`; repeated headers yield repeated ids
    pub id: String,
    /// Roman-numeral book token exactly as printed
    pub book: String,
    /// Hymn number within the book, kept as text
    #[serde(rename = "hymn")]
    pub hymn_number: String,
    pub title: String,
    /// Body lines, each followed by a single space
    pub content: String,
    /// 0-based page index of the header line
    pub page: usize,
}

impl HymnRecord {
    /// Start a record with empty content.
    pub fn new(
        book: impl Into<String>,
        hymn_number: impl Into<String>,
        title: impl Into<String>,
        page: usize,
    ) -> Self {
        let book = book.into();
        let hymn_number = hymn_number.into();
        Self {
            id: format!("{book}_{hymn_number}"),
            book,
            hymn_number,
            title: title.into(),
            content: String::new(),
            page,
        }
    }

    /// Append one body line.
    pub fn push_line(&mut self, line: &str) {
        self.content.push_str(line);
        self.content.push(' ');
    }

    /// Human-readable citation, e.g. `Book VI, Hymn 105`.
    pub fn source(&self) -> String {
        format_source(&self.book, &self.hymn_number)
    }

    /// Text used as the indexing key: title and content joined by a period and space.
    pub fn embedding_text(&self) -> String {
        format!("{}. {}", self.title, self.content)
    }
}

pub fn format_source(book: &str, hymn_number: &str) -> String {
    format!("Book {book}, Hymn {hymn_number}")
}

/// Read a record set, reporting a missing file as [`ExtractError::SourceNotFound`].
pub fn load_record_set(path: &Path) -> Result<Vec<HymnRecord>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes).map_err(|source| ExtractError::InvalidRecordSet {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a record set as 2-space indented UTF-8 JSON, creating parent directories.
pub fn save_record_set(path: &Path, records: &[HymnRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fear_charm() -> HymnRecord {
        let mut record = HymnRecord::new("VI", "105", "CHARM AGAINST FEAR", 1480);
        record.push_line("May the gods protect us from all fear.");
        record
    }

    #[test]
    fn test_new_record_composes_id() {
        let record = HymnRecord::new("XIX", "7", "TO THE STARS", 3);
        assert_eq!(record.id, "XIX_7");
        assert!(record.content.is_empty());
        assert_eq!(record.source(), "Book XIX, Hymn 7");
    }

    #[test]
    fn test_embedding_text_joins_title_and_content() {
        assert_eq!(
            fear_charm().embedding_text(),
            "CHARM AGAINST FEAR. May the gods protect us from all fear. "
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(fear_charm()).unwrap();
        assert_eq!(value["hymn"], "105");
        assert_eq!(value["page"], 1480);
        assert!(value.get("hymn_number").is_none());
    }

    #[test]
    fn test_save_and_load_preserves_order_and_duplicates() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("data").join("set.json");
        let records = vec![fear_charm(), HymnRecord::new("VII", "1", "Ṛta", 2), fear_charm()];

        save_record_set(&path, &records).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  {"));
        assert!(written.contains("Ṛta"));

        assert_eq!(load_record_set(&path).unwrap(), records);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp_dir = tempdir().unwrap();
        let err = load_record_set(&temp_dir.path().join("absent.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_garbage_is_invalid() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").unwrap();
        assert!(matches!(
            load_record_set(&path),
            Err(ExtractError::InvalidRecordSet { .. })
        ));
    }
}
