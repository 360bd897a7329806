//! The vector context store
//!
//! Writers serialize on `writer` for the whole embed/append/persist/publish
//! sequence and build the next snapshot beside the published one. Readers
//! clone the published `Arc` and never block on embedding or disk I/O.

use hagakure_core::error::{ErrorKind, HagakureError, Result};
use hagakure_core::models::{
    excerpt, Document, DocumentId, Match, RetrievalDiagnostics, RetrievedContext, StoreStats,
};
use hagakure_llm::{normalize_embedding, Embedder};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::{Mutex, RwLock};

use crate::persistence;
use crate::snapshot::StoreSnapshot;

/// Separator placed between retrieved passages in the context string
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Persistent, searchable collection of embedded documents
pub struct ContextStore {
    path: PathBuf,
    dimensions: usize,
    embedder: Arc<dyn Embedder>,
    state: RwLock<Arc<StoreSnapshot>>,
    writer: Mutex<()>,
    violation: OnceLock<(usize, usize)>,
}

impl ContextStore {
    /// Open the store persisted at `path`, or start an empty one if the file does not exist
    ///
    /// A file that cannot be read, fails validation, or holds vectors of a
    /// different dimensionality than `embedder` produces is an error.
    pub async fn open(path: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let path = path.into();
        let dimensions = embedder.dimensions();
        if dimensions == 0 {
            return Err(HagakureError::ConfigInvalid {
                key: "embedding_dim".to_string(),
                reason: format!("embedder '{}' reports zero dimensions", embedder.model_name()),
            });
        }

        let snapshot = match persistence::load(&path).await? {
            Some(loaded) => {
                if loaded.snapshot.dimensions() != dimensions {
                    return Err(HagakureError::persistence(
                        &path,
                        format!(
                            "store holds {}-dimensional vectors but embedder '{}' produces {}",
                            loaded.snapshot.dimensions(),
                            embedder.model_name(),
                            dimensions
                        ),
                    ));
                }
                if loaded.embedder != embedder.model_name() {
                    tracing::warn!(
                        stored = %loaded.embedder,
                        configured = %embedder.model_name(),
                        "Context store was built with a different embedder; similarity scores may be meaningless"
                    );
                }
                tracing::info!(
                    path = %path.display(),
                    documents = loaded.snapshot.len(),
                    saved_at = %loaded.saved_at,
                    "Loaded existing context store"
                );
                loaded.snapshot
            }
            None => {
                tracing::info!(path = %path.display(), dimensions, "Initialized new context store");
                StoreSnapshot::new(dimensions)
            }
        };

        Ok(Self {
            path,
            dimensions,
            embedder,
            state: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
            violation: OnceLock::new(),
        })
    }

    /// Embed `text`, append it, and persist the store before returning
    pub async fn ingest(&self, text: &str) -> Result<DocumentId> {
        let mut ids = self.append(&[text]).await?;
        ids.pop().ok_or_else(|| HagakureError::MalformedEmbedding {
            reason: "embedder returned no vector".to_string(),
        })
    }

    /// Ingest several texts with one embedder call and one save
    ///
    /// Either every text is stored or none is.
    pub async fn ingest_batch(&self, texts: &[&str]) -> Result<Vec<DocumentId>> {
        self.append(texts).await
    }

    async fn append(&self, texts: &[&str]) -> Result<Vec<DocumentId>> {
        for text in texts {
            require_text(text, "document")?;
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let _writer = self.writer.lock().await;
        self.ensure_writable()?;

        let vectors = self.embed_normalized(texts).await?;

        let current = self.snapshot().await;
        let mut next = StoreSnapshot::clone(&current);
        let mut ids = Vec::with_capacity(texts.len());
        for (text, vector) in texts.iter().zip(&vectors) {
            ids.push(next.push(text.to_string(), vector)?);
        }
        if let Err(err) = next.check_consistency() {
            self.record_violation(&next);
            return Err(err);
        }

        persistence::save(&self.path, &next, self.embedder.model_name()).await?;

        let total = next.len();
        *self.state.write().await = Arc::new(next);

        for (id, text) in ids.iter().zip(texts) {
            tracing::debug!(id = id.0, excerpt = %excerpt(text, 50), "Document added");
        }
        tracing::info!(added = ids.len(), total, "Ingested documents");

        Ok(ids)
    }

    /// Find up to `top_k` stored documents closest to `query`
    ///
    /// An empty store yields an empty result without calling the embedder.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievedContext> {
        require_text(query, "query")?;
        if top_k == 0 {
            return Err(HagakureError::InvalidInput {
                reason: "top_k must be at least 1".to_string(),
            });
        }

        let snapshot = self.snapshot().await;
        if let Err(err) = snapshot.check_consistency() {
            self.record_violation(&snapshot);
            return Err(err);
        }
        if snapshot.is_empty() {
            tracing::warn!(query = %query, "No documents in context store");
            return Ok(RetrievedContext::empty(query));
        }

        let mut vectors = self.embed_normalized(&[query]).await?;
        let query_vector = vectors.pop().ok_or_else(|| HagakureError::MalformedEmbedding {
            reason: "embedder returned no vector for the query".to_string(),
        })?;

        let hits = snapshot.index().search(&query_vector, top_k)?;

        let mut matches = Vec::with_capacity(hits.len());
        let mut passages = Vec::with_capacity(hits.len());
        for (position, distance) in hits {
            if let Some(text) = snapshot.texts().get(position) {
                matches.push(Match { document_id: DocumentId(position), distance });
                passages.push(text.clone());
            }
        }

        let diagnostics = RetrievalDiagnostics {
            query: query.to_string(),
            documents_indexed: snapshot.len(),
            query_shape: Some((1, query_vector.len())),
            indices: matches.iter().map(|m| m.document_id.0).collect(),
            distances: matches.iter().map(|m| m.distance).collect(),
            note: None,
        };
        tracing::debug!(
            query = %query,
            indices = ?diagnostics.indices,
            distances = ?diagnostics.distances,
            "Retrieved context"
        );

        Ok(RetrievedContext {
            context: passages.join(CONTEXT_SEPARATOR),
            matches,
            passages,
            diagnostics,
        })
    }

    /// The currently published snapshot
    pub async fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::clone(&*self.state.read().await)
    }

    pub async fn len(&self) -> usize {
        self.snapshot().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot().await.is_empty()
    }

    pub async fn document(&self, id: DocumentId) -> Option<Document> {
        self.snapshot().await.document(id)
    }

    pub async fn documents(&self) -> Vec<Document> {
        self.snapshot().await.documents()
    }

    pub async fn stats(&self) -> StoreStats {
        let snapshot = self.snapshot().await;
        StoreStats {
            document_count: snapshot.len(),
            index_size: snapshot.index().len(),
            dimensions: self.dimensions,
            embedder: self.embedder.model_name().to_string(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.model_name()
    }

    async fn embed_normalized(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let raw = self.embedder.embed(texts).await.map_err(|e| match e.kind() {
            ErrorKind::Embedding => e,
            _ => HagakureError::EmbedderUnavailable {
                reason: e.to_string(),
                remediation: format!("Check the configuration of embedder '{}'", self.embedder.model_name()),
            },
        })?;

        if raw.len() != texts.len() {
            return Err(HagakureError::MalformedEmbedding {
                reason: format!("expected {} vectors, embedder returned {}", texts.len(), raw.len()),
            });
        }

        raw.into_iter().map(|vector| normalize_embedding(vector, self.dimensions)).collect()
    }

    fn ensure_writable(&self) -> Result<()> {
        match self.violation.get() {
            Some(&(index_len, document_count)) => {
                Err(HagakureError::InvariantViolation { index_len, document_count })
            }
            None => Ok(()),
        }
    }

    fn record_violation(&self, snapshot: &StoreSnapshot) {
        let index_len = snapshot.index().len();
        let document_count = snapshot.len();
        tracing::error!(
            index_len,
            document_count,
            "Context store invariant violated; refusing further ingestion"
        );
        let _ = self.violation.set((index_len, document_count));
    }
}

fn require_text(text: &str, what: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(HagakureError::InvalidInput {
            reason: format!("{} text must not be empty", what),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FlatL2Index;
    use hagakure_llm::HashingEmbedder;
    use tempfile::TempDir;

    fn diverged_store(dir: &TempDir) -> ContextStore {
        let mut index = FlatL2Index::new(4);
        index.add(&[1.0, 0.0, 0.0, 0.0]).unwrap();

        ContextStore {
            path: dir.path().join("store.json"),
            dimensions: 4,
            embedder: Arc::new(HashingEmbedder::new(4).unwrap()),
            state: RwLock::new(Arc::new(StoreSnapshot::from_parts(index, Vec::new()))),
            writer: Mutex::new(()),
            violation: OnceLock::new(),
        }
    }

    #[tokio::test]
    async fn test_detected_violation_blocks_ingestion() {
        let dir = TempDir::new().unwrap();
        let store = diverged_store(&dir);

        let err = store.retrieve("anything", 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(matches!(
            err,
            HagakureError::InvariantViolation { index_len: 1, document_count: 0 }
        ));

        let err = store.ingest("a perfectly valid document").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        let err = store.ingest_batch(&["one", "two"]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);

        assert_eq!(store.len().await, 0);
        assert_eq!(store.snapshot().await.index().len(), 1);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_consistent_store_stays_writable() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::open(
            dir.path().join("store.json"),
            Arc::new(HashingEmbedder::new(4).unwrap()),
        )
        .await
        .unwrap();

        store.retrieve("anything", 1).await.unwrap();
        assert!(store.ensure_writable().is_ok());
        assert_eq!(store.ingest("first").await.unwrap(), DocumentId(0));
    }
}
