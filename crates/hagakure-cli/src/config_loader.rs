//! Configuration loading and store construction for CLI commands

use anyhow::{Context, Result};
use hagakure_core::config::{CliConfigOverrides, EmbedderSpec, LayeredConfig};
use hagakure_llm::{Embedder, HashingEmbedder, OllamaEmbedder};
use hagakure_store::ContextStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::Cli;

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "hagakure.toml";

/// Load layered configuration: defaults, file, environment, then flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    match &cli.config {
        Some(path) => {
            config = config
                .load_from_file(path)
                .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
        }
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                config = config
                    .load_from_file(default_path)
                    .context("Failed to load hagakure.toml")?;
            }
        }
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides(cli));
    Ok(config)
}

fn overrides(cli: &Cli) -> CliConfigOverrides {
    CliConfigOverrides {
        store_path: cli.store.clone(),
        embedder: cli.embedder.clone(),
        embedding_dim: cli.dimensions,
        top_k: None,
    }
}

/// Construct the configured embedder
pub fn build_embedder(config: &LayeredConfig) -> Result<Arc<dyn Embedder>> {
    let spec = config.embedder_spec().context("Invalid embedder configuration")?;
    let dimensions = config.embedding_dim.value;

    let embedder: Arc<dyn Embedder> = match spec {
        EmbedderSpec::Ollama { model } => {
            Arc::new(OllamaEmbedder::new(config.ollama_url.value.clone(), model, dimensions))
        }
        EmbedderSpec::Hashing => {
            Arc::new(HashingEmbedder::new(dimensions).context("Invalid embedding dimensions")?)
        }
    };

    Ok(embedder)
}

/// Open the context store the configuration points at
pub async fn open_store(config: &LayeredConfig) -> Result<Arc<ContextStore>> {
    let embedder = build_embedder(config)?;
    let path: PathBuf = config.store_path.value.clone();

    let store = ContextStore::open(&path, embedder)
        .await
        .with_context(|| format!("Failed to open context store at {}", path.display()))?;

    Ok(Arc::new(store))
}
