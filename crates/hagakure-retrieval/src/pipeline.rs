use hagakure_core::error::{HagakureError, Result};
use hagakure_core::models::{DocumentId, RetrievedContext};
use hagakure_store::ContextStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::chunk::TextChunker;
use crate::prompt::PromptTemplate;

/// Starter knowledge base ingested by `seed_knowledge_base`
pub const SAMPLE_DOCUMENTS: [&str; 3] = [
    "Python is a programming language widely used for AI and machine learning.",
    "FAISS is a library developed by Facebook AI Research for fast similarity search.",
    "OpenAI developed the GPT models which power modern chat applications.",
];

/// A user prompt enriched with retrieved context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedPrompt {
    /// Prompt as entered by the user
    pub prompt: String,

    /// Prompt to send to the language model
    pub final_prompt: String,

    pub retrieval: RetrievedContext,
}

impl AugmentedPrompt {
    /// Retrieval trace followed by the final prompt
    pub fn debug_trace(&self) -> String {
        let mut trace = self.retrieval.debug_trace();
        trace.push_str("[INFO] Final prompt sent to LLM:\n");
        trace.push_str(&self.final_prompt);
        trace.push('\n');
        trace
    }
}

/// Retrieval-augmented prompting over a shared context store
pub struct RetrievalPipeline {
    store: Arc<ContextStore>,
    chunker: TextChunker,
    template: PromptTemplate,
}

impl RetrievalPipeline {
    /// Create a new pipeline with the default chunker and prompt template
    pub fn new(store: Arc<ContextStore>) -> Self {
        Self {
            store,
            chunker: TextChunker::default(),
            template: PromptTemplate::default(),
        }
    }

    pub fn with_chunker(mut self, chunker: TextChunker) -> Self {
        self.chunker = chunker;
        self
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    /// Chunk `text` and ingest every chunk in one batch
    pub async fn ingest_document(&self, text: &str) -> Result<Vec<DocumentId>> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Err(HagakureError::InvalidInput {
                reason: "document has no text to ingest".to_string(),
            });
        }

        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let ids = self.store.ingest_batch(&refs).await?;
        tracing::info!(chunks = ids.len(), "Document ingested");
        Ok(ids)
    }

    /// Ingest the sample knowledge base
    pub async fn seed_knowledge_base(&self) -> Result<Vec<DocumentId>> {
        let ids = self.store.ingest_batch(&SAMPLE_DOCUMENTS).await?;
        tracing::info!(documents = ids.len(), "Knowledge base seeded");
        Ok(ids)
    }

    /// Retrieve context for `prompt` and render the final prompt
    pub async fn augment(&self, prompt: &str, top_k: usize) -> Result<AugmentedPrompt> {
        let retrieval = self.store.retrieve(prompt, top_k).await?;
        let final_prompt = self.template.render(&retrieval.context, prompt);

        tracing::debug!(
            matches = retrieval.matches.len(),
            final_prompt = %final_prompt,
            "Prompt augmented"
        );

        Ok(AugmentedPrompt {
            prompt: prompt.to_string(),
            final_prompt,
            retrieval,
        })
    }
}
