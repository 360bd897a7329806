//! Seed command implementation

use crate::config_loader::open_store;
use crate::output::OutputWriter;
use crate::output_types::IngestOutput;
use anyhow::{Context, Result};
use hagakure_core::config::LayeredConfig;
use hagakure_retrieval::RetrievalPipeline;

pub async fn execute(config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let store = open_store(&config).await?;
    let pipeline = RetrievalPipeline::new(store.clone());

    let ids = pipeline
        .seed_knowledge_base()
        .await
        .context("Failed to seed the knowledge base")?;

    let total_documents = store.len().await;
    if output.is_json() {
        output.result(IngestOutput {
            document_ids: ids.iter().map(|id| id.0).collect(),
            total_documents,
            store_path: store.path().display().to_string(),
        })?;
    } else {
        output.success(format!("Seeded {} sample documents", ids.len()));
        output.kv("Store", store.path().display());
        output.kv("Total documents", total_documents);
    }

    Ok(())
}
