//! Error types for Hagakure

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HagakureError {
    // Embedder errors
    #[error("Embedder unavailable: {reason}. Try: {remediation}")]
    EmbedderUnavailable {
        reason: String,
        remediation: String,
    },

    #[error("Malformed embedding: {reason}")]
    MalformedEmbedding { reason: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Store persistence errors
    #[error("Failed to persist context store at {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    #[error("Unsupported store format at {path}: found version {found}, expected {expected}")]
    UnsupportedFormat {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    // Internal consistency
    #[error(
        "Store invariant violated: index holds {index_len} vectors but {document_count} documents are stored"
    )]
    InvariantViolation {
        index_len: usize,
        document_count: usize,
    },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },
}

/// Coarse classification of [`HagakureError`] variants.
///
/// Callers that only care whether an operation failed because of the
/// embedder, the durable store, or a broken invariant can match on this
/// instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Embedding,
    Persistence,
    InvariantViolation,
    InvalidInput,
    Config,
}

impl HagakureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HagakureError::EmbedderUnavailable { .. }
            | HagakureError::MalformedEmbedding { .. }
            | HagakureError::DimensionMismatch { .. } => ErrorKind::Embedding,
            HagakureError::Persistence { .. } | HagakureError::UnsupportedFormat { .. } => {
                ErrorKind::Persistence
            }
            HagakureError::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            HagakureError::InvalidInput { .. } => ErrorKind::InvalidInput,
            HagakureError::ConfigInvalid { .. } => ErrorKind::Config,
        }
    }

    /// Build a persistence error for `path` from any displayable cause
    pub fn persistence(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        HagakureError::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HagakureError>;
