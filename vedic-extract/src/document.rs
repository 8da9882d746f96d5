//! Page text loading and start-page detection.

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use std::panic;
use std::path::Path;

/// Page break used by PDF-to-text tools.
pub const FORM_FEED: char = '\u{c}';

/// The text of a source document, one string per page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pages: Vec<String>,
}

impl Document {
    /// Load a document from disk.
    ///
    /// `.pdf` files go through `pdf-extract`; anything else is read as UTF-8
    /// text with form feeds between pages. A missing file is reported as
    /// [`ExtractError::SourceNotFound`].
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::SourceNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        let document = if is_pdf {
            let pages =
                read_pdf_pages(&bytes).map_err(|message| ExtractError::UnreadableDocument {
                    path: path.to_path_buf(),
                    message,
                })?;
            Self::from_pages(pages)
        } else {
            let text = String::from_utf8(bytes).map_err(|e| ExtractError::UnreadableDocument {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Self::from_text(&text)
        };

        tracing::info!(
            "Loaded {} pages from {}",
            document.page_count(),
            path.display()
        );
        Ok(document)
    }

    pub fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Split text on form feeds. Text without any form feed is a single page.
    pub fn from_text(text: &str) -> Self {
        Self {
            pages: text.split(FORM_FEED).map(str::to_string).collect(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&str> {
        self.pages.get(index).map(String::as_str)
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }
}

/// Run `pdf-extract` over the raw bytes.
///
/// The parser panics on some malformed fonts and page trees, so a panic is
/// caught here and reported like any other parse failure.
fn read_pdf_pages(bytes: &[u8]) -> std::result::Result<Vec<String>, String> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!("PDF parser panicked: {}", reason);
            Err(format!("PDF parser panicked: {reason}"))
        }
    }
}

/// Where extraction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPage {
    pub page: usize,
    /// False when the configured default was used
    pub marker_found: bool,
}

/// Find the first page in the marker window whose uppercased text contains every start marker.
///
/// Falls back to `config.default_start_page` with a warning. Never fails.
pub fn find_start_page(document: &Document, config: &ExtractorConfig) -> StartPage {
    let window_end = config.marker_window.end.min(document.page_count());

    for index in config.marker_window.start..window_end {
        let Some(text) = document.page(index) else {
            break;
        };
        let upper = text.to_uppercase();
        if config
            .start_markers
            .iter()
            .all(|marker| upper.contains(marker.as_str()))
        {
            tracing::info!("Found start of Atharva-Veda on page {}", index);
            return StartPage {
                page: index,
                marker_found: true,
            };
        }
    }

    tracing::warn!(
        "Start markers not found in pages {}..{}, using default page {}",
        config.marker_window.start,
        config.marker_window.end,
        config.default_start_page
    );
    StartPage {
        page: config.default_start_page,
        marker_found: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn small_config() -> ExtractorConfig {
        ExtractorConfig::default()
            .with_marker_window(0..5)
            .with_default_start_page(2)
    }

    #[test]
    fn test_from_text_splits_on_form_feed() {
        let document = Document::from_text("one\u{c}two\u{c}three");
        assert_eq!(document.page_count(), 3);
        assert_eq!(document.page(1), Some("two"));
        assert_eq!(document.page(3), None);
    }

    #[test]
    fn test_from_text_without_breaks_is_one_page() {
        assert_eq!(Document::from_text("just text\nmore").page_count(), 1);
    }

    #[test]
    fn test_start_page_requires_both_markers() {
        let document = Document::from_pages(vec![
            "contents".into(),
            "The Atharva-Veda".into(),
            "translated by Bloomfield".into(),
            "THE HYMNS OF THE ATHARVA-VEDA\nTRANSLATED BY MAURICE BLOOMFIELD".into(),
            "Atharva-Veda, Bloomfield".into(),
        ]);
        let start = find_start_page(&document, &small_config());
        assert_eq!(
            start,
            StartPage {
                page: 3,
                marker_found: true
            }
        );
    }

    #[test]
    fn test_start_page_matches_case_insensitively() {
        let document = Document::from_pages(vec!["atharva-veda by bloomfield".into()]);
        assert_eq!(find_start_page(&document, &small_config()).page, 0);
    }

    #[test]
    fn test_lowercase_custom_markers_match() {
        let document = Document::from_pages(vec![
            "preface".into(),
            "Hymns of the Rig-Veda, Griffith".into(),
        ]);
        let config = small_config().with_start_markers(["rig-veda", "griffith"]);
        assert_eq!(config.start_markers, vec!["RIG-VEDA", "GRIFFITH"]);
        let start = find_start_page(&document, &config);
        assert!(start.marker_found);
        assert_eq!(start.page, 1);
    }

    #[test]
    fn test_start_page_falls_back_to_default() {
        let document = Document::from_pages(vec!["a".into(), "b".into()]);
        let start = find_start_page(&document, &small_config());
        assert_eq!(start.page, 2);
        assert!(!start.marker_found);
    }

    #[test]
    fn test_marker_outside_window_is_ignored() {
        let mut pages = vec![String::new(); 8];
        pages[6] = "ATHARVA-VEDA BLOOMFIELD".into();
        let start = find_start_page(&Document::from_pages(pages), &small_config());
        assert!(!start.marker_found);
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = tempdir().unwrap();
        let err = Document::open(&temp_dir.path().join("missing.pdf")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_open_text_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("vedas.txt");
        std::fs::write(&path, "page zero\u{c}page one").unwrap();
        let document = Document::open(&path).unwrap();
        assert_eq!(document.pages(), &["page zero", "page one"]);
    }

    #[test]
    fn test_open_corrupt_pdf_is_unreadable() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        assert!(matches!(
            Document::open(&path),
            Err(ExtractError::UnreadableDocument { .. })
        ));
    }

    /// One page whose content stream selects a font the page never defines.
    fn pdf_with_undefined_font() -> Vec<u8> {
        let content = "BT /F1 12 Tf 72 720 Td (Atharva-Veda) Tj ET";
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << >> >> /Contents 4 0 R >>".to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (number, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", number + 1));
        }
        let xref = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    #[test]
    fn test_open_pdf_with_undefined_font_is_unreadable() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("undefined_font.pdf");
        std::fs::write(&path, pdf_with_undefined_font()).unwrap();

        let result = panic::catch_unwind(|| Document::open(&path));
        let Ok(opened) = result else {
            panic!("Document::open panicked");
        };
        assert!(matches!(
            opened,
            Err(ExtractError::UnreadableDocument { .. })
        ));
    }
}
