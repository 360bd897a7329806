//! Ingest command implementation

use crate::cli::IngestArgs;
use crate::config_loader::open_store;
use crate::output::OutputWriter;
use crate::output_types::IngestOutput;
use crate::progress::{create_progress_bar, create_spinner, finish_error, finish_success, hidden_if};
use anyhow::{bail, Context, Result};
use hagakure_core::config::LayeredConfig;
use hagakure_retrieval::{RetrievalPipeline, TextChunker};

pub async fn execute(args: IngestArgs, config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    if args.texts.is_empty() && args.file.is_none() {
        bail!("Nothing to ingest: pass one or more texts or --file <PATH>");
    }

    let chunker = TextChunker::new(args.max_chars).context("Invalid --max-chars")?;
    let store = open_store(&config).await?;
    let pipeline = RetrievalPipeline::new(store.clone()).with_chunker(chunker);

    let mut document_ids = Vec::new();

    // Literal texts are ingested one by one, each persisted before the next
    if !args.texts.is_empty() {
        let pb = hidden_if(
            output.is_json(),
            create_progress_bar(args.texts.len() as u64, "Ingesting documents"),
        );
        for text in &args.texts {
            match store.ingest(text).await {
                Ok(id) => {
                    document_ids.push(id.0);
                    pb.inc(1);
                }
                Err(e) => {
                    finish_error(&pb, "Ingestion stopped");
                    return Err(e).context("Failed to ingest document");
                }
            }
        }
        finish_success(&pb, &format!("Ingested {} documents", args.texts.len()));
    }

    if let Some(path) = &args.file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let pb = hidden_if(
            output.is_json(),
            create_spinner(&format!("Embedding {}...", path.display())),
        );
        match pipeline.ingest_document(&text).await {
            Ok(ids) => {
                finish_success(&pb, &format!("Ingested {} chunks from {}", ids.len(), path.display()));
                document_ids.extend(ids.iter().map(|id| id.0));
            }
            Err(e) => {
                finish_error(&pb, "Ingestion failed");
                return Err(e).with_context(|| format!("Failed to ingest {}", path.display()));
            }
        }
    }

    let total_documents = store.len().await;
    if output.is_json() {
        output.result(IngestOutput {
            document_ids,
            total_documents,
            store_path: store.path().display().to_string(),
        })?;
    } else {
        output.success(format!("Added {} documents", document_ids.len()));
        output.kv("Store", store.path().display());
        output.kv("Total documents", total_documents);
    }

    Ok(())
}
