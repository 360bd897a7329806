use hagakure_core::error::{HagakureError, Result};
use hagakure_core::models::{Document, DocumentId};

use crate::index::FlatL2Index;

/// Immutable pairing of the vector index and the ordered document texts
///
/// Row `i` of the index is the embedding of `documents[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub(crate) index: FlatL2Index,
    pub(crate) documents: Vec<String>,
}

impl StoreSnapshot {
    /// Create an empty snapshot for `dimensions`-long vectors
    pub fn new(dimensions: usize) -> Self {
        Self {
            index: FlatL2Index::new(dimensions),
            documents: Vec::new(),
        }
    }

    pub(crate) fn from_parts(index: FlatL2Index, documents: Vec<String>) -> Self {
        Self { index, documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    pub fn index(&self) -> &FlatL2Index {
        &self.index
    }

    pub fn texts(&self) -> &[String] {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Option<Document> {
        self.documents.get(id.0).map(|text| Document { id, text: text.clone() })
    }

    pub fn documents(&self) -> Vec<Document> {
        self.documents
            .iter()
            .enumerate()
            .map(|(position, text)| Document { id: DocumentId(position), text: text.clone() })
            .collect()
    }

    /// Append a document with its (already normalized) embedding
    pub(crate) fn push(&mut self, text: String, vector: &[f32]) -> Result<DocumentId> {
        let position = self.index.add(vector)?;
        self.documents.push(text);
        Ok(DocumentId(position))
    }

    /// Fail if the index and the document list have diverged
    pub fn check_consistency(&self) -> Result<()> {
        if self.index.len() != self.documents.len() {
            return Err(HagakureError::InvariantViolation {
                index_len: self.index.len(),
                document_count: self.documents.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hagakure_core::ErrorKind;

    #[test]
    fn test_push_keeps_index_and_documents_aligned() {
        let mut snapshot = StoreSnapshot::new(2);
        assert_eq!(snapshot.push("a".to_string(), &[1.0, 0.0]).unwrap(), DocumentId(0));
        assert_eq!(snapshot.push("b".to_string(), &[0.0, 1.0]).unwrap(), DocumentId(1));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.index().len(), 2);
        assert_eq!(snapshot.document(DocumentId(1)).unwrap().text, "b");
        assert!(snapshot.check_consistency().is_ok());
    }

    #[test]
    fn test_failed_push_changes_nothing() {
        let mut snapshot = StoreSnapshot::new(2);
        assert!(snapshot.push("bad".to_string(), &[1.0]).is_err());
        assert!(snapshot.is_empty());
        assert!(snapshot.index().is_empty());
    }

    #[test]
    fn test_diverged_snapshot_is_reported() {
        let mut index = FlatL2Index::new(2);
        index.add(&[1.0, 0.0]).unwrap();
        let snapshot = StoreSnapshot::from_parts(index, Vec::new());

        let err = snapshot.check_consistency().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    }
}
