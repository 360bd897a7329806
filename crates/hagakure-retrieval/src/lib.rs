//! Hagakure Retrieval - Prompt augmentation over the context store
//!
//! This crate implements the caller side of the store: chunking large
//! inputs, seeding the sample knowledge base, and building the augmented
//! prompt sent to the language model.

pub mod chunk;
pub mod pipeline;
pub mod prompt;

pub use chunk::TextChunker;
pub use pipeline::{AugmentedPrompt, RetrievalPipeline, SAMPLE_DOCUMENTS};
pub use prompt::PromptTemplate;
