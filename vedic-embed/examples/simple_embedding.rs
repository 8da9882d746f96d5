//! Embed a query and a few hymn texts, then rank the hymns by cosine similarity

use vedic_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let temp_dir = tempfile::tempdir()?;
    let config = EmbedConfig::default_with_path(temp_dir.path()).with_batch_size(2);

    println!("Model: {}", config.model_name);
    let provider = FastEmbedProvider::create(config).await?;
    println!(
        "Provider: {} ({} dimensions)",
        provider.provider_name(),
        provider.embedding_dimension()
    );

    let query = "I am afraid";
    let query_vec = provider.embed_text(query).await?;

    let hymns = vec![
        "CHARM AGAINST FEAR. May the gods protect us from all fear.".to_string(),
        "HYMN TO THE EARTH. Truth, greatness, universal order uphold the earth.".to_string(),
        "PRAYER FOR LONG LIFE. Live on, do not die, hundred autumns.".to_string(),
    ];
    let result = provider.embed_texts(&hymns).await?;

    let mut ranked: Vec<(f32, &String)> = result
        .embeddings
        .iter()
        .zip(hymns.iter())
        .map(|(emb, text)| (emb.iter().zip(&query_vec).map(|(a, b)| a * b).sum(), text))
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    println!("\nQuery: \"{query}\"");
    for (score, text) in ranked {
        println!("  {score:.3}  {text}");
    }
    Ok(())
}
