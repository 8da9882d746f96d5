use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use vedic_extract::{
    Document, ExtractError, ExtractorConfig, extract_document, extract_records,
    record::save_record_set,
};

/// Extract Atharva-Veda hymns from a PDF or form-feed separated text file into a JSON record set.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source document (.pdf, or text with form feeds between pages)
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the record set
    #[arg(short, long, default_value = "data/atharva_dataset.json")]
    output: PathBuf,

    /// Start page override. Skips marker detection.
    #[arg(short, long)]
    start_page: Option<usize>,

    /// Page used when the start markers are not found
    #[arg(long)]
    default_start_page: Option<usize>,

    /// Running header substring to skip
    #[arg(short, long)]
    boilerplate: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => {}
        Err(e @ ExtractError::SourceNotFound { .. }) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    }
}

fn run(args: Args) -> vedic_extract::Result<()> {
    let mut config = ExtractorConfig::default();
    if let Some(marker) = args.boilerplate {
        config = config.with_boilerplate_marker(marker);
    }
    if let Some(page) = args.default_start_page {
        config = config.with_default_start_page(page);
    }

    let records = match args.start_page {
        Some(page) => {
            let document = Document::open(&args.input)?;
            extract_records(&document, page, &config)
        }
        None => {
            let extraction = extract_document(&args.input, &config)?;
            if !extraction.start.marker_found {
                tracing::warn!(
                    "Document has {} pages; extraction began at fallback page {}",
                    extraction.page_count,
                    extraction.start.page
                );
            }
            extraction.records
        }
    };

    save_record_set(&args.output, &records)?;
    println!(
        "Saved {} hymns to {}",
        records.len(),
        args.output.display()
    );
    Ok(())
}
