//! Ingest a few hymns and ask questions without downloading a model
//!
//! Uses the token-hashing embedder and an in-memory index:
//! 1. Writing a small record set
//! 2. Ingesting it
//! 3. Solving a matching and an unrelated problem
//! 4. Picking a random verse

use anyhow::Result;
use std::sync::Arc;
use tempfile::tempdir;
use vedic_embed::MockEmbeddingProvider;
use vedic_extract::{HymnRecord, save_record_set};
use vedic_retriever::storage::sqlite_store::SqliteVectorIndex;
use vedic_retriever::{
    Ingestor, LibraryAccessor, RandomVerseView, RetrievalService, RetrieverConfig, ServiceContext,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let temp_dir = tempdir()?;
    let record_set = temp_dir.path().join("atharva_dataset.json");

    let mut fear = HymnRecord::new("VI", "105", "CHARM AGAINST FEAR", 1480);
    fear.push_line("May the gods protect us from all fear.");
    let mut earth = HymnRecord::new("XII", "1", "HYMN TO GODDESS EARTH", 1650);
    earth.push_line("Truth, greatness, universal order, strength, consecration,");
    earth.push_line("creative fervour, spiritual exaltation, the sacrifice, support the earth.");
    save_record_set(&record_set, &[fear, earth])?;

    let context = Arc::new(ServiceContext::with_components(
        RetrieverConfig::default().with_record_set_path(&record_set),
        Arc::new(MockEmbeddingProvider::new(vedic_embed::DEFAULT_DIMENSION)),
        Arc::new(SqliteVectorIndex::open_memory().await?),
    ));

    let report = Ingestor::new(context.clone()).ingest().await?;
    println!("Ingested {} hymns\n", report.points_written);

    let service = RetrievalService::new(context.clone());
    for problem in ["protect me from fear", "what does the earth rest upon", "stock prices"] {
        let response = service.solve(problem).await;
        println!("Q: {problem}\n   {}", response.message);
        if let Some(best) = response.solutions.first() {
            println!("   {} ({}) score {:.3}", best.title, best.source, best.score);
        }
    }

    if let RandomVerseView::Verse(verse) = LibraryAccessor::new(context).get_random_verse() {
        println!("\nRandom verse: {} ({})\n   {}", verse.title, verse.source, verse.verse);
    }

    Ok(())
}
