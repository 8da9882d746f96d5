use std::path::{Path, PathBuf};
use tempfile::tempdir;
use tracing_test::traced_test;
use vedic_extract::{ExtractorConfig, extract_document, load_record_set, save_record_set};

fn write_pages(dir: &Path, pages: &[&str]) -> PathBuf {
    let path = dir.join("four_vedas.txt");
    std::fs::write(&path, pages.join("\u{c}")).unwrap();
    path
}

fn config() -> ExtractorConfig {
    ExtractorConfig::default()
        .with_marker_window(0..4)
        .with_default_start_page(1)
}

#[test]
fn test_document_to_record_set() {
    let temp_dir = tempdir().unwrap();
    let source = write_pages(
        temp_dir.path(),
        &[
            "RIG-VEDA\nX, 129. CREATION\nThen was not non-existent nor existent",
            "The Four Vedas\nHYMNS OF THE ATHARVA-VEDA\ntranslated by Maurice Bloomfield\n12",
            "The Four Vedas\nVI, 105. CHARM AGAINST FEAR. 1480\nMay the gods protect us\nfrom all fear.\n1480",
            "The Four Vedas\nVII, 12. PRAYER FOR SUCCESS IN THE ASSEMBLY . . . 14\nMay both assembly and meeting\n\nVII, 13. CHARM TO DEPRIVE ENEMIES OF THEIR STRENGTH",
        ],
    );

    let extraction = extract_document(&source, &config()).unwrap();
    assert!(extraction.start.marker_found);
    assert_eq!(extraction.start.page, 1);
    assert_eq!(extraction.page_count, 4);

    let records = &extraction.records;
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["VI_105", "VII_12", "VII_13"]);

    assert_eq!(records[0].title, "CHARM AGAINST FEAR");
    assert_eq!(records[0].content, "May the gods protect us from all fear. ");
    assert_eq!(records[0].page, 2);
    assert_eq!(records[1].title, "PRAYER FOR SUCCESS IN THE ASSEMBLY");
    assert_eq!(records[1].page, 3);
    assert!(records[2].content.is_empty());

    let output = temp_dir.path().join("data").join("atharva_dataset.json");
    save_record_set(&output, records).unwrap();
    assert_eq!(&load_record_set(&output).unwrap(), records);
}

#[test]
#[traced_test]
fn test_missing_markers_fall_back_with_warning() {
    let temp_dir = tempdir().unwrap();
    let source = write_pages(
        temp_dir.path(),
        &["I, 1. SKIPPED\nbody", "I, 2. KEPT\nbody"],
    );

    let extraction = extract_document(&source, &config()).unwrap();
    assert!(!extraction.start.marker_found);
    assert_eq!(extraction.start.page, 1);
    assert_eq!(extraction.records.len(), 1);
    assert_eq!(extraction.records[0].id, "I_2");
    assert!(logs_contain("Start markers not found"));
}

#[test]
fn test_missing_source_is_not_found() {
    let temp_dir = tempdir().unwrap();
    let err = extract_document(&temp_dir.path().join("absent.pdf"), &config()).unwrap_err();
    assert!(err.is_not_found());
}
