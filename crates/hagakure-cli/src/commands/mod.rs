//! Command implementations

mod ingest;
mod query;
mod seed;
mod status;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;
    tracing::debug!(
        store = %config.store_path.value.display(),
        embedder = %config.embedder.value,
        dimensions = config.embedding_dim.value,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Ingest(args) => ingest::execute(args, config, &output).await,
        Commands::Seed => seed::execute(config, &output).await,
        Commands::Query(args) => query::execute(args, config, &output).await,
        Commands::Status => status::execute(config, &output).await,
    }
}
