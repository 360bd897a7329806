use crate::error::{HagakureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default file the context store persists to
pub const DEFAULT_STORE_PATH: &str = "hagakure_index.json";

/// Default embedder spec (all-MiniLM, 384 dimensions)
pub const DEFAULT_EMBEDDER: &str = "ollama:all-minilm";

pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub const DEFAULT_TOP_K: usize = 3;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        };
        f.write_str(name)
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Which embedder to construct
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedderSpec {
    /// Ollama embeddings endpoint with the given model
    Ollama { model: String },
    /// Deterministic offline hashing embedder
    Hashing,
}

impl fmt::Display for EmbedderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedderSpec::Ollama { model } => write!(f, "ollama:{}", model),
            EmbedderSpec::Hashing => f.write_str("hash"),
        }
    }
}

/// Layered configuration for Hagakure
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub store_path: ConfigValue<PathBuf>,
    pub embedder: ConfigValue<String>,
    pub embedding_dim: ConfigValue<usize>,
    pub top_k: ConfigValue<usize>,
    pub ollama_url: ConfigValue<String>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            store_path: ConfigValue::new(PathBuf::from(DEFAULT_STORE_PATH), ConfigSource::Default),
            embedder: ConfigValue::new(DEFAULT_EMBEDDER.to_string(), ConfigSource::Default),
            embedding_dim: ConfigValue::new(DEFAULT_EMBEDDING_DIM, ConfigSource::Default),
            top_k: ConfigValue::new(DEFAULT_TOP_K, ConfigSource::Default),
            ollama_url: ConfigValue::new(DEFAULT_OLLAMA_URL.to_string(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| HagakureError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| HagakureError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(store_path) = file_config.store_path {
            self.store_path.update(store_path, ConfigSource::File);
        }

        if let Some(embedder) = file_config.embedder {
            parse_embedder_spec(&embedder)?;
            self.embedder.update(embedder, ConfigSource::File);
        }

        if let Some(dim) = file_config.embedding_dim {
            let dim = require_positive("embedding_dim", dim)?;
            self.embedding_dim.update(dim, ConfigSource::File);
        }

        if let Some(top_k) = file_config.top_k {
            let top_k = require_positive("top_k", top_k)?;
            self.top_k.update(top_k, ConfigSource::File);
        }

        if let Some(url) = file_config.ollama_url {
            self.ollama_url.update(url, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // HAGAKURE_STORE_PATH
        if let Ok(path) = env::var("HAGAKURE_STORE_PATH") {
            if path.trim().is_empty() {
                tracing::warn!("Ignoring empty HAGAKURE_STORE_PATH");
            } else {
                self.store_path.update(PathBuf::from(path), ConfigSource::Environment);
            }
        }

        // HAGAKURE_EMBEDDER
        if let Ok(embedder) = env::var("HAGAKURE_EMBEDDER") {
            match parse_embedder_spec(&embedder) {
                Ok(_) => self.embedder.update(embedder, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid HAGAKURE_EMBEDDER value '{}': expected 'ollama:<model>' or 'hash'",
                    embedder
                ),
            }
        }

        // HAGAKURE_EMBEDDING_DIM
        if let Ok(dim_str) = env::var("HAGAKURE_EMBEDDING_DIM") {
            match parse_positive("embedding_dim", &dim_str) {
                Ok(dim) => self.embedding_dim.update(dim, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid HAGAKURE_EMBEDDING_DIM value '{}': expected positive integer",
                    dim_str
                ),
            }
        }

        // HAGAKURE_TOP_K
        if let Ok(top_k_str) = env::var("HAGAKURE_TOP_K") {
            match parse_positive("top_k", &top_k_str) {
                Ok(top_k) => self.top_k.update(top_k, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid HAGAKURE_TOP_K value '{}': expected positive integer",
                    top_k_str
                ),
            }
        }

        // HAGAKURE_OLLAMA_URL
        if let Ok(url) = env::var("HAGAKURE_OLLAMA_URL") {
            self.ollama_url.update(url, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(store_path) = overrides.store_path {
            self.store_path.update(store_path, ConfigSource::Cli);
        }

        if let Some(embedder) = overrides.embedder {
            self.embedder.update(embedder, ConfigSource::Cli);
        }

        if let Some(dim) = overrides.embedding_dim {
            self.embedding_dim.update(dim, ConfigSource::Cli);
        }

        if let Some(top_k) = overrides.top_k {
            self.top_k.update(top_k, ConfigSource::Cli);
        }
    }

    /// Parsed form of the configured embedder
    pub fn embedder_spec(&self) -> Result<EmbedderSpec> {
        parse_embedder_spec(&self.embedder.value)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "store_path".to_string(),
            (self.store_path.value.display().to_string(), self.store_path.source),
        );
        map.insert("embedder".to_string(), (self.embedder.value.clone(), self.embedder.source));
        map.insert(
            "embedding_dim".to_string(),
            (self.embedding_dim.value.to_string(), self.embedding_dim.source),
        );
        map.insert("top_k".to_string(), (self.top_k.value.to_string(), self.top_k.source));
        map.insert("ollama_url".to_string(), (self.ollama_url.value.clone(), self.ollama_url.source));

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    store_path: Option<PathBuf>,
    embedder: Option<String>,
    embedding_dim: Option<usize>,
    top_k: Option<usize>,
    ollama_url: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub store_path: Option<PathBuf>,
    pub embedder: Option<String>,
    pub embedding_dim: Option<usize>,
    pub top_k: Option<usize>,
}

/// Parse an embedder spec such as `ollama:all-minilm` or `hash`
pub fn parse_embedder_spec(s: &str) -> Result<EmbedderSpec> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("hash") || s.eq_ignore_ascii_case("hashing") {
        return Ok(EmbedderSpec::Hashing);
    }

    match s.split_once(':') {
        Some((provider, model)) if provider.eq_ignore_ascii_case("ollama") && !model.is_empty() => {
            Ok(EmbedderSpec::Ollama { model: model.to_string() })
        }
        _ => Err(HagakureError::ConfigInvalid {
            key: "embedder".to_string(),
            reason: format!("Invalid embedder: {}. Use 'ollama:<model>' or 'hash'", s),
        }),
    }
}

/// Parse a strictly positive integer setting
pub fn parse_positive(key: &str, s: &str) -> Result<usize> {
    let value = s.trim().parse::<usize>().map_err(|e| HagakureError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("'{}' is not an integer: {}", s, e),
    })?;
    require_positive(key, value)
}

fn require_positive(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(HagakureError::ConfigInvalid {
            key: key.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
