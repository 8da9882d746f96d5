use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vedic_embed::{DEFAULT_DIMENSION, MockEmbeddingProvider};
use vedic_retriever::{
    Ingestor, LibraryAccessor, LibraryView, RandomVerseView, RetrievalService, RetrieverConfig,
    ServiceContext,
};

/// Ask the Atharva-Veda for guidance from the command line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file. Flags below override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record set written by vedic-extract
    #[arg(long)]
    record_set: Option<PathBuf>,

    /// SQLite vector index file
    #[arg(long)]
    index_path: Option<PathBuf>,

    #[arg(long)]
    collection: Option<String>,

    /// Embedding model name
    #[arg(short, long)]
    model: Option<String>,

    /// Use the token-hashing embedder instead of a downloaded model
    #[arg(long)]
    mock_embeddings: bool,

    /// Output format
    #[arg(short, long, default_value = "summary", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild the vector index from the record set
    Ingest,
    /// Find hymns relevant to a problem
    Solve {
        /// The problem, in plain words
        problem: String,
        /// Number of hymns to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Minimum similarity of the best hymn
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Print the whole record set
    Library,
    /// Print one hymn chosen at random
    Random,
    /// Show collection statistics
    Stats,
}

#[derive(Debug, Clone, PartialEq)]
enum OutputFormat {
    Summary,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {s}")),
        }
    }
}

#[derive(Serialize)]
struct CollectionStats {
    collection: String,
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<vedic_retriever::storage::CollectionInfo>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn build_config(args: &Args) -> anyhow::Result<RetrieverConfig> {
    let mut config = match &args.config {
        Some(path) => RetrieverConfig::load(path)?,
        None => RetrieverConfig::default(),
    };
    if let Some(path) = &args.record_set {
        config.record_set_path = path.clone();
    }
    if let Some(path) = &args.index_path {
        config.index_path = path.clone();
    }
    if let Some(collection) = &args.collection {
        config.collection = collection.clone();
    }
    if let Some(model) = &args.model {
        config.embed.model_name = model.clone();
    }
    if let Commands::Solve {
        top_k, threshold, ..
    } = &args.command
    {
        if let Some(top_k) = top_k {
            config.top_k = *top_k;
        }
        if let Some(threshold) = threshold {
            config.silence_threshold = *threshold;
        }
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;

    let mut context = ServiceContext::new(config);
    if args.mock_embeddings {
        context = context.with_embedder(Arc::new(MockEmbeddingProvider::new(DEFAULT_DIMENSION)));
    }
    let context = Arc::new(context);

    match args.command {
        Commands::Ingest => {
            let report = Ingestor::new(context).ingest().await?;
            match args.format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Summary => println!(
                    "Ingested {} hymns into {} ({} dimensions)",
                    report.points_written, report.collection, report.dimension
                ),
            }
        }
        Commands::Solve { problem, .. } => {
            let response = RetrievalService::new(context).solve(&problem).await;
            match args.format {
                OutputFormat::Json => print_json(&response)?,
                OutputFormat::Summary => {
                    println!("{}", response.message);
                    for solution in &response.solutions {
                        println!();
                        println!("{} | {} | score {:.3}", solution.title, solution.source, solution.score);
                        println!("  {}", solution.verse);
                    }
                }
            }
        }
        Commands::Library => {
            let view = LibraryAccessor::new(context).get_library();
            match (&args.format, &view) {
                (OutputFormat::Summary, LibraryView::Records(records)) => {
                    println!("{} hymns:", records.len());
                    for record in records {
                        println!("  {} | {} | page {}", record.source(), record.title, record.page);
                    }
                }
                _ => print_json(&view)?,
            }
        }
        Commands::Random => {
            let view = LibraryAccessor::new(context).get_random_verse();
            match (&args.format, &view) {
                (OutputFormat::Summary, RandomVerseView::Verse(verse)) => {
                    println!("{} ({})", verse.title, verse.source);
                    println!("  {}", verse.verse);
                }
                _ => print_json(&view)?,
            }
        }
        Commands::Stats => {
            let collection = context.config().collection.clone();
            let index = context.index().await?;
            let info = index.collection_info(&collection).await?;
            let stats = CollectionStats {
                collection,
                exists: info.is_some(),
                info,
            };
            match args.format {
                OutputFormat::Json => print_json(&stats)?,
                OutputFormat::Summary => match &stats.info {
                    Some(info) => {
                        println!("Collection: {}", info.name);
                        println!("Points: {}", info.points_count);
                        println!("Dimension: {}", info.dimension);
                        println!("Distance: {}", info.distance.as_str());
                        println!("Created: {}", info.created_at.to_rfc3339());
                    }
                    None => println!("Collection {} does not exist", stats.collection),
                },
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "vedic-retriever",
            "--collection",
            "test_hymns",
            "solve",
            "I am afraid",
            "-k",
            "5",
            "--threshold",
            "0.5",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.collection, "test_hymns");
        assert_eq!(config.top_k, 5);
        assert_eq!(config.silence_threshold, 0.5);
        assert_eq!(config.verse_chars, 300);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
