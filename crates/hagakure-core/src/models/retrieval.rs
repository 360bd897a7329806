use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::excerpt;
use super::DocumentId;

/// Note attached to diagnostics when a query runs against an empty store
pub const NO_DOCUMENTS_NOTE: &str = "no documents indexed";

/// A single nearest-neighbor hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Matched document
    pub document_id: DocumentId,

    /// Squared Euclidean distance between the unit-length query and document vectors
    pub distance: f32,
}

impl Match {
    /// Cosine similarity implied by the distance of two unit vectors
    pub fn cosine_similarity(&self) -> f32 {
        1.0 - self.distance / 2.0
    }
}

/// Observability record for one retrieval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalDiagnostics {
    /// Query text as received
    pub query: String,

    /// Number of documents in the snapshot the query ran against
    pub documents_indexed: usize,

    /// Shape of the query embedding as (rows, dimensions); None when no embedding was computed
    pub query_shape: Option<(usize, usize)>,

    /// Returned document indices, in rank order
    pub indices: Vec<usize>,

    /// Returned distances, aligned with `indices`
    pub distances: Vec<f32>,

    /// Free-form note, e.g. why nothing was returned
    pub note: Option<String>,
}

impl fmt::Display for RetrievalDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[INFO] Retrieving context for query: '{}'", self.query)?;
        if let Some(note) = &self.note {
            writeln!(f, "[WARNING] {}", note)?;
        }
        if let Some((rows, dims)) = self.query_shape {
            writeln!(f, "[DEBUG] Query embedding shape: ({}, {})", rows, dims)?;
            writeln!(f, "[DEBUG] Retrieved indices: {:?}", self.indices)?;
            writeln!(f, "[DEBUG] Distances: {:?}", self.distances)?;
        }
        Ok(())
    }
}

/// Result of a context retrieval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// Matched texts in rank order, joined by a blank line
    pub context: String,

    /// Ranked matches
    pub matches: Vec<Match>,

    /// Matched texts, aligned with `matches`
    pub passages: Vec<String>,

    pub diagnostics: RetrievalDiagnostics,
}

impl RetrievedContext {
    /// Result for a query against a store with no documents
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            context: String::new(),
            matches: Vec::new(),
            passages: Vec::new(),
            diagnostics: RetrievalDiagnostics {
                query: query.into(),
                documents_indexed: 0,
                note: Some(NO_DOCUMENTS_NOTE.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Multi-line trace suitable for a debug panel
    pub fn debug_trace(&self) -> String {
        let mut trace = self.diagnostics.to_string();
        if self.diagnostics.query_shape.is_some() {
            trace.push_str(&format!("[INFO] Retrieved documents: {}\n", self.passages.len()));
            for (i, passage) in self.passages.iter().enumerate() {
                trace.push_str(&format!("  {}. {}\n", i + 1, excerpt(passage, 100)));
            }
        }
        trace
    }
}

/// Summary of a store's contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub document_count: usize,
    pub index_size: usize,
    pub dimensions: usize,
    pub embedder: String,
}
