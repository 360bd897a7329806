use console::style;
use hagakure_core::HagakureError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for an unreachable or failing embedder
pub fn embedder_not_available(reason: &str, remediation: &str) -> CliError {
    CliError::new("Embedder not available")
        .with_context(format!("The embedding service could not produce vectors.\n\nReason: {}", reason))
        .with_suggestion(remediation.to_string())
        .with_suggestion("Or use the offline embedder: --embedder hash")
        .with_help("Run: hagakure --help")
}

/// Create error for embeddings of the wrong size
pub fn dimension_mismatch(expected: usize, actual: usize) -> CliError {
    CliError::new("Embedding dimension mismatch")
        .with_context(format!(
            "The store expects {}-dimensional vectors but the embedder produced {}.",
            expected, actual
        ))
        .with_suggestion(format!("Set --dimensions {} to match the embedder", actual))
        .with_suggestion("Or point --store at a new file for a different embedder")
}

/// Create error for a store file that cannot be read or written
pub fn store_unavailable(detail: &str) -> CliError {
    CliError::new("Context store unavailable")
        .with_context(format!("Error: {}", detail))
        .with_suggestion("Check that the store path is readable and writable")
        .with_suggestion("Move a damaged file aside to start a fresh store")
        .with_help("Run: hagakure status")
}

/// Create error for invalid configuration
pub fn invalid_config(detail: &str) -> CliError {
    CliError::new("Invalid configuration")
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", detail))
        .with_suggestion("Check hagakure.toml for syntax errors")
        .with_suggestion("Check HAGAKURE_* environment variables")
        .with_help("Run: hagakure status")
}

/// Convert anyhow::Error to CliError, using the store error in its chain when present
pub fn from_error(error: &anyhow::Error) -> CliError {
    let store_error = error.chain().find_map(|cause| cause.downcast_ref::<HagakureError>());

    match store_error {
        Some(HagakureError::EmbedderUnavailable { reason, remediation }) => {
            embedder_not_available(reason, remediation)
        }
        Some(HagakureError::DimensionMismatch { expected, actual }) => {
            dimension_mismatch(*expected, *actual)
        }
        Some(err @ (HagakureError::Persistence { .. } | HagakureError::UnsupportedFormat { .. })) => {
            store_unavailable(&err.to_string())
        }
        Some(err @ HagakureError::ConfigInvalid { .. }) => {
            invalid_config(&err.to_string())
        }
        Some(err @ HagakureError::InvariantViolation { .. }) => {
            CliError::new("Context store is inconsistent")
                .with_context(format!("Error: {}", err))
                .with_suggestion("Restart to reload the store from its last saved state")
        }
        _ => CliError::new(format!("{:#}", error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_embedder_error_keeps_remediation() {
        let err: anyhow::Result<()> = Err(HagakureError::EmbedderUnavailable {
            reason: "connection refused".to_string(),
            remediation: "Start Ollama with 'ollama serve'".to_string(),
        })
        .context("Failed to ingest documents");

        let cli_error = from_error(&err.unwrap_err());
        assert_eq!(cli_error.message, "Embedder not available");
        assert_eq!(cli_error.suggestions[0], "Start Ollama with 'ollama serve'");
    }

    #[test]
    fn test_persistence_error_mapping() {
        let err = anyhow::Error::new(HagakureError::persistence("/tmp/x.json", "disk full"));
        let cli_error = from_error(&err);
        assert_eq!(cli_error.message, "Context store unavailable");
        assert!(cli_error.context.unwrap().contains("disk full"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let err = anyhow::anyhow!("nothing to ingest");
        assert_eq!(from_error(&err).message, "nothing to ingest");
    }
}
