use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hagakure - Retrieval-augmented prompting over a local vector store
#[derive(Parser, Debug)]
#[command(name = "hagakure")]
#[command(about = "Retrieval-augmented prompting over a local vector store", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path of the context store file
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Embedder to use ("ollama:<model>" or "hash")
    #[arg(long, global = true, value_name = "SPEC")]
    pub embedder: Option<String>,

    /// Embedding dimensionality
    #[arg(long, global = true, value_name = "N")]
    pub dimensions: Option<usize>,

    /// Configuration file (defaults to ./hagakure.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add documents to the context store
    Ingest(IngestArgs),

    /// Ingest the sample knowledge base
    Seed,

    /// Retrieve context for a query
    Query(QueryArgs),

    /// Show store status and effective configuration
    Status,
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Texts to ingest, one document each
    pub texts: Vec<String>,

    /// Text file to chunk and ingest
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Maximum characters per chunk when ingesting a file
    #[arg(long, default_value = "1000")]
    pub max_chars: usize,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// The query text
    pub query: String,

    /// Number of documents to retrieve (defaults to the configured top_k)
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// Show the augmented prompt that would be sent to the model
    #[arg(long)]
    pub prompt: bool,

    /// Show retrieval diagnostics
    #[arg(long)]
    pub explain: bool,
}
