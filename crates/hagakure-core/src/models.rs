pub mod document;
pub mod retrieval;

pub use document::{excerpt, Document, DocumentId};
pub use retrieval::{Match, RetrievalDiagnostics, RetrievedContext, StoreStats};
