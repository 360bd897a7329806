//! Query command implementation

use crate::cli::QueryArgs;
use crate::config_loader::open_store;
use crate::output::OutputWriter;
use crate::output_types::{MatchItem, QueryOutput};
use anyhow::{Context, Result};
use hagakure_core::config::{CliConfigOverrides, LayeredConfig};
use hagakure_core::models::excerpt;
use hagakure_retrieval::RetrievalPipeline;
use tabled::Tabled;

pub async fn execute(args: QueryArgs, mut config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    config.update_from_cli(CliConfigOverrides {
        top_k: args.top_k,
        ..Default::default()
    });
    let top_k = config.top_k.value;

    let store = open_store(&config).await?;
    let pipeline = RetrievalPipeline::new(store);

    let augmented = pipeline
        .augment(&args.query, top_k)
        .await
        .context("Failed to retrieve context")?;
    let retrieval = &augmented.retrieval;

    let matches: Vec<MatchItem> = retrieval
        .matches
        .iter()
        .zip(&retrieval.passages)
        .enumerate()
        .map(|(i, (m, text))| MatchItem {
            rank: i + 1,
            document_id: m.document_id.0,
            distance: m.distance,
            similarity: m.cosine_similarity(),
            text: text.clone(),
        })
        .collect();

    if output.is_json() {
        output.result(QueryOutput {
            query: args.query.clone(),
            top_k,
            matches,
            context: retrieval.context.clone(),
            final_prompt: args.prompt.then(|| augmented.final_prompt.clone()),
            diagnostics: args.explain.then(|| retrieval.diagnostics.clone()),
        })?;
        return Ok(());
    }

    output.section("Query");
    output.kv("Query", &args.query);
    output.kv("Top K", top_k);
    output.kv("Documents indexed", retrieval.diagnostics.documents_indexed);

    if retrieval.is_empty() {
        output.info("No documents in the store. Run 'hagakure ingest' or 'hagakure seed' first.");
    } else {
        #[derive(Tabled)]
        struct MatchRow {
            #[tabled(rename = "Rank")]
            rank: usize,
            #[tabled(rename = "Doc")]
            document_id: usize,
            #[tabled(rename = "Distance")]
            distance: String,
            #[tabled(rename = "Similarity")]
            similarity: String,
            #[tabled(rename = "Text")]
            text: String,
        }

        output.section("Matches");
        let rows: Vec<MatchRow> = matches
            .iter()
            .map(|m| MatchRow {
                rank: m.rank,
                document_id: m.document_id,
                distance: format!("{:.4}", m.distance),
                similarity: format!("{:.4}", m.similarity),
                text: excerpt(&m.text, 60),
            })
            .collect();
        output.table(rows);

        output.section("Context");
        output.block(&retrieval.context);
    }

    if args.prompt {
        output.section("Augmented Prompt");
        output.block(&augmented.final_prompt);
    }

    if args.explain {
        output.section("Diagnostics");
        output.block(augmented.debug_trace().trim_end());
    }

    Ok(())
}
