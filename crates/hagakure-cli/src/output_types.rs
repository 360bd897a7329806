use hagakure_core::models::RetrievalDiagnostics;
use serde::Serialize;
use tabled::Tabled;

/// Output for ingest and seed commands
#[derive(Debug, Serialize)]
pub struct IngestOutput {
    pub document_ids: Vec<usize>,
    pub total_documents: usize,
    pub store_path: String,
}

/// Output for query command
#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub query: String,
    pub top_k: usize,
    pub matches: Vec<MatchItem>,
    pub context: String,
    pub final_prompt: Option<String>,
    pub diagnostics: Option<RetrievalDiagnostics>,
}

#[derive(Debug, Serialize)]
pub struct MatchItem {
    pub rank: usize,
    pub document_id: usize,
    pub distance: f32,
    pub similarity: f32,
    pub text: String,
}

/// Output for status command
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub store_path: String,
    pub store_exists: bool,
    pub document_count: usize,
    pub index_size: usize,
    pub dimensions: usize,
    pub embedder: String,
    pub config: Vec<ConfigEntry>,
}

/// An effective configuration value and where it came from
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
