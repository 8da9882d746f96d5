//! Extraction settings for a particular scanned edition

use std::ops::Range;

/// Running header printed on every page of the source edition.
pub const DEFAULT_BOILERPLATE_MARKER: &str = "Four Vedas";

/// Work title and translator name that mark the first page of the translation.
pub const DEFAULT_START_MARKERS: &[&str] = &["ATHARVA-VEDA", "BLOOMFIELD"];

/// Page used when the start markers cannot be found.
pub const DEFAULT_START_PAGE: usize = 1311;

/// Configuration for [`HymnExtractor`](crate::extractor::HymnExtractor) and start-page detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Lines containing this substring are page furniture and are skipped
    pub boilerplate_marker: String,
    /// All of these (uppercase) substrings must appear on the start page
    pub start_markers: Vec<String>,
    /// Pages searched for the start markers (half-open)
    pub marker_window: Range<usize>,
    /// Fallback start page when no page in the window carries the markers
    pub default_start_page: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            boilerplate_marker: DEFAULT_BOILERPLATE_MARKER.to_string(),
            start_markers: DEFAULT_START_MARKERS.iter().map(|s| s.to_string()).collect(),
            marker_window: 1300..1350,
            default_start_page: DEFAULT_START_PAGE,
        }
    }
}

impl ExtractorConfig {
    pub fn with_boilerplate_marker(self, marker: impl Into<String>) -> Self {
        Self {
            boilerplate_marker: marker.into(),
            ..self
        }
    }

    /// Markers are stored uppercased since pages are compared uppercased.
    pub fn with_start_markers<I, S>(self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            start_markers: markers
                .into_iter()
                .map(|marker| marker.into().to_uppercase())
                .collect(),
            ..self
        }
    }

    pub fn with_marker_window(self, marker_window: Range<usize>) -> Self {
        Self {
            marker_window,
            ..self
        }
    }

    pub fn with_default_start_page(self, default_start_page: usize) -> Self {
        Self {
            default_start_page,
            ..self
        }
    }
}
