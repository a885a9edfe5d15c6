use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use stemka::config::Config;
use stemka::embedding::SentenceEmbedder;
use stemka::keywords::{EmbeddingKeyphraseExtractor, KeyphraseExtractor};
use stemka::stem::{dedup_by_stem, RussianStemmer};

/// Stemka: keyword-stem extraction for Russian text.
///
/// Extracts the most relevant unique stems from a document using SBERT
/// embeddings for ranking and Snowball stemming for deduplication.
#[derive(Parser)]
#[command(name = "stemka", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service (models load in the background)
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Download the ONNX embedding model for MODEL_NAME
    DownloadModel,

    /// Extract stems from a document without starting the server
    Extract {
        /// The document text
        text: String,

        /// Number of unique stems to return
        #[arg(long, default_value = "10")]
        top_n: usize,

        /// Minimum n-gram size
        #[arg(long, default_value = "1")]
        min_ngram: usize,

        /// Maximum n-gram size
        #[arg(long, default_value = "1")]
        max_ngram: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stemka=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            info!(model = %config.model_name, "Starting stemka");
            stemka::web::run_server(config, port, &bind).await?;
        }

        Commands::DownloadModel => {
            let config = Config::load()?;

            println!("Downloading ONNX embedding model...");
            println!("  Destination: {}", config.model_files_dir().display());

            stemka::download::download_model(&config.model_dir, &config.model_name).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `stemka serve` or `stemka extract <text>`.");
        }

        Commands::Extract {
            text,
            top_n,
            min_ngram,
            max_ngram,
        } => {
            let config = Config::load()?;

            if top_n < 1 || top_n > config.top_n_max {
                anyhow::bail!("top_n must be between 1 and {}", config.top_n_max);
            }
            if min_ngram < 1 || max_ngram < 1 || min_ngram > max_ngram {
                anyhow::bail!("ngram sizes must be >= 1 with min_ngram <= max_ngram");
            }
            config.require_model()?;

            println!("Loading embedding model ({})...", config.model_name);
            let embedder = SentenceEmbedder::load(&config.model_files_dir())?;
            let extractor = EmbeddingKeyphraseExtractor::new(Arc::new(embedder));
            let stemmer = RussianStemmer::new();

            let raw = extractor
                .extract(&text, (min_ngram, max_ngram), top_n * 2)
                .await?;
            let stems = dedup_by_stem(&raw, &stemmer, top_n);

            if stems.is_empty() {
                println!("\nNo stems extracted — document may be empty or all stop words.");
                return Ok(());
            }

            println!("\n{}", "Top stems:".bold());
            for (i, stem) in stems.iter().enumerate() {
                println!(
                    "  {:<4} {:<30} {}",
                    format!("{}.", i + 1),
                    stem.0,
                    format!("{:.4}", stem.1).dimmed(),
                );
            }
        }
    }

    Ok(())
}
