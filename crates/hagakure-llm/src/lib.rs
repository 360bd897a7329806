//! Hagakure LLM - Embedding port and adapters
//!
//! This crate defines the embedding port consumed by the context store,
//! along with adapter implementations.

pub mod embedding;
pub mod hashing;
pub mod ollama;
pub mod ports;

// Re-export main types
pub use embedding::{l2_norm, normalize_embedding};
pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;
pub use ports::Embedder;
