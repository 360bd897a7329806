//! Status command implementation

use crate::config_loader::open_store;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, StatusOutput};
use anyhow::Result;
use hagakure_core::config::LayeredConfig;

pub async fn execute(config: LayeredConfig, output: &OutputWriter) -> Result<()> {
    let store = open_store(&config).await?;
    let stats = store.stats().await;
    let store_exists = store.path().exists();

    let mut entries: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry {
            key,
            value,
            source: source.to_string(),
        })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        output.result(StatusOutput {
            store_path: store.path().display().to_string(),
            store_exists,
            document_count: stats.document_count,
            index_size: stats.index_size,
            dimensions: stats.dimensions,
            embedder: stats.embedder,
            config: entries,
        })?;
        return Ok(());
    }

    output.section("Store Status");
    output.kv("Location", store.path().display());
    output.kv("Saved", if store_exists { "yes" } else { "no (nothing ingested yet)" });
    output.kv("Documents", stats.document_count);
    output.kv("Index size", stats.index_size);
    output.kv("Dimensions", stats.dimensions);
    output.kv("Embedder", &stats.embedder);

    output.section("Configuration");
    output.table(entries);

    Ok(())
}
