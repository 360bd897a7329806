//! Ollama adapter tests against a mock HTTP server

use hagakure_core::error::HagakureError;
use hagakure_core::ErrorKind;
use hagakure_llm::{Embedder, OllamaEmbedder};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_embeds_each_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({ "model": "all-minilm", "prompt": "first" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [1.0, 0.0, 0.0] })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({ "model": "all-minilm", "prompt": "second" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [0.0, 1.0, 0.0] })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(server.uri(), "all-minilm", 3);
    let vectors = embedder.embed(&["first", "second"]).await.unwrap();

    assert_eq!(vectors, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
}

#[tokio::test]
async fn test_api_error_is_embedding_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'missing' not found"))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(server.uri(), "missing", 384);
    let err = embedder.embed(&["hello"]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Embedding);
    assert!(err.to_string().contains("404"));
    assert!(err.to_string().contains("ollama list"));
}

#[tokio::test]
async fn test_undecodable_body_is_unavailable_with_remediation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vectors": "nope" })))
        .mount(&server)
        .await;

    let embedder = OllamaEmbedder::new(server.uri(), "all-minilm", 384);
    let err = embedder.embed(&["hello"]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Embedding);
    assert!(matches!(err, HagakureError::EmbedderUnavailable { .. }));
    assert!(err.to_string().contains("Failed to parse Ollama response"));
    assert!(err.to_string().contains("embedding model"));
}

#[tokio::test]
async fn test_unreachable_server_is_embedding_error() {
    // Nothing listens on the discard port
    let embedder = OllamaEmbedder::new("http://127.0.0.1:9", "all-minilm", 384);
    let err = embedder.embed(&["hello"]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Embedding);
    assert!(err.to_string().contains("ollama pull all-minilm"));
}
