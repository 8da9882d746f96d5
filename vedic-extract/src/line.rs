//! Line classification.
//!
//! Every trimmed line of page text is exactly one of:
//!
//! - [`LineKind::Skip`]: blank, page furniture (the running header), or a bare page number
//! - [`LineKind::Header`]: `<book>, <number>. <title>` such as `VI, 105. CHARM AGAINST FEAR. 42`
//! - [`LineKind::Body`]: anything else
//!
//! Classification is stateless; what a body line means depends on whether a
//! hymn is open, which is the extractor's concern.

use crate::config::ExtractorConfig;
use regex::Regex;
use std::sync::LazyLock;

/// Roman-numeral book, comma, hymn number, period, title. Anchored at line start.
pub const HEADER_PATTERN: &str = r"^([IVXLCDM]+),\s+(\d+)\.\s+(.+)$";

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HEADER_PATTERN).expect("header pattern is valid"));

/// A matched hymn header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine<'a> {
    pub book: &'a str,
    pub hymn_number: &'a str,
    /// Title remainder as printed, before cleaning
    pub raw_title: &'a str,
}

impl HeaderLine<'_> {
    pub fn title(&self) -> String {
        clean_title(self.raw_title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Skip,
    Header(HeaderLine<'a>),
    Body(&'a str),
}

/// Classify one line. Surrounding whitespace is ignored.
pub fn classify_line<'a>(line: &'a str, config: &ExtractorConfig) -> LineKind<'a> {
    let line = line.trim();
    let boilerplate_marker = config.boilerplate_marker.as_str();

    if line.is_empty() || is_page_number(line) {
        return LineKind::Skip;
    }
    if !boilerplate_marker.is_empty() && line.contains(boilerplate_marker) {
        return LineKind::Skip;
    }

    match parse_header(line) {
        Some(header) => LineKind::Header(header),
        None => LineKind::Body(line),
    }
}

/// Match the header pattern against an already trimmed line.
pub fn parse_header(line: &str) -> Option<HeaderLine<'_>> {
    let captures = HEADER_RE.captures(line)?;
    Some(HeaderLine {
        book: captures.get(1)?.as_str(),
        hymn_number: captures.get(2)?.as_str(),
        raw_title: captures.get(3)?.as_str().trim(),
    })
}

/// Strip trailing dots, spaces and digits (leader dots and page numbers) from a title.
pub fn clean_title(raw_title: &str) -> String {
    raw_title
        .trim()
        .trim_end_matches(|c: char| c == ' ' || c == '.' || c.is_ascii_digit())
        .to_string()
}

/// The whole line is digits in any script. Numbers inside body text do not count.
fn is_page_number(line: &str) -> bool {
    !line.is_empty() && line.chars().all(char::is_numeric)
}
