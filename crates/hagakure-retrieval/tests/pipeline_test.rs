use hagakure_core::models::DocumentId;
use hagakure_core::ErrorKind;
use hagakure_llm::HashingEmbedder;
use hagakure_retrieval::{PromptTemplate, RetrievalPipeline, TextChunker, SAMPLE_DOCUMENTS};
use hagakure_store::ContextStore;
use std::sync::Arc;
use tempfile::TempDir;

async fn pipeline(dir: &TempDir) -> RetrievalPipeline {
    let embedder = Arc::new(HashingEmbedder::new(384).unwrap());
    let store = ContextStore::open(dir.path().join("store.json"), embedder).await.unwrap();
    RetrievalPipeline::new(Arc::new(store))
}

#[tokio::test]
async fn test_augment_on_empty_store_keeps_prompt_frame() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir).await;

    let augmented = pipeline.augment("hello there", 3).await.unwrap();

    assert_eq!(augmented.final_prompt, "Context:\n\n\nUser Prompt: hello there");
    assert!(augmented.retrieval.is_empty());

    let trace = augmented.debug_trace();
    assert!(trace.contains("[WARNING] no documents indexed"));
    assert!(trace.ends_with("[INFO] Final prompt sent to LLM:\nContext:\n\n\nUser Prompt: hello there\n"));
}

#[tokio::test]
async fn test_seed_then_augment() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir).await;

    let ids = pipeline.seed_knowledge_base().await.unwrap();
    assert_eq!(ids, vec![DocumentId(0), DocumentId(1), DocumentId(2)]);

    let query = "FAISS library for similarity search";
    let augmented = pipeline.augment(query, 1).await.unwrap();

    assert_eq!(augmented.retrieval.passages, vec![SAMPLE_DOCUMENTS[1].to_string()]);
    assert_eq!(
        augmented.final_prompt,
        format!("Context:\n{}\n\nUser Prompt: {}", SAMPLE_DOCUMENTS[1], query)
    );

    let trace = augmented.debug_trace();
    assert!(trace.contains("[INFO] Retrieving context for query: 'FAISS library for similarity search'"));
    assert!(trace.contains("[DEBUG] Query embedding shape: (1, 384)"));
    assert!(trace.contains("[DEBUG] Retrieved indices: [1]"));
    assert!(trace.contains("[INFO] Retrieved documents: 1"));
}

#[tokio::test]
async fn test_ingest_document_chunks_input() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir).await.with_chunker(TextChunker::new(60).unwrap());

    let text = "The way of the samurai is found in death.\n\n\
                Meditation on inevitable death should be performed daily.\n\n\
                Short closing line.";
    let ids = pipeline.ingest_document(text).await.unwrap();

    assert_eq!(ids.len(), 3);
    assert_eq!(pipeline.store().len().await, 3);
    for document in pipeline.store().documents().await {
        assert!(document.text.chars().count() <= 60);
    }
}

#[tokio::test]
async fn test_ingest_document_rejects_blank_input() {
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&dir).await;

    let err = pipeline.ingest_document("\n\n  \n").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(pipeline.store().is_empty().await);
}

#[tokio::test]
async fn test_custom_template_frames_final_prompt() {
    let dir = TempDir::new().unwrap();
    let template = PromptTemplate::new("Answer using only:\n{context}\n---\nQuestion: {prompt}");
    let pipeline = pipeline(&dir).await.with_template(template);
    pipeline.seed_knowledge_base().await.unwrap();

    let query = "FAISS library for similarity search";
    let augmented = pipeline.augment(query, 1).await.unwrap();

    assert_eq!(
        augmented.final_prompt,
        format!("Answer using only:\n{}\n---\nQuestion: {}", SAMPLE_DOCUMENTS[1], query)
    );
    assert!(augmented
        .debug_trace()
        .ends_with(&format!("[INFO] Final prompt sent to LLM:\n{}\n", augmented.final_prompt)));
}
