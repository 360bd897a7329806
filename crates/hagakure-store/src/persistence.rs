//! Versioned on-disk format for the context store
//!
//! The whole store is one JSON document, replaced atomically on every save:
//! the new content goes to a sibling temp file, is fsynced, then renamed
//! over the old file. A crash mid-save leaves the previous file intact.

use chrono::{DateTime, Utc};
use hagakure_core::error::{HagakureError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::index::FlatL2Index;
use crate::snapshot::StoreSnapshot;

pub const FORMAT_VERSION: u32 = 1;

pub const METRIC: &str = "squared_l2";

#[derive(Serialize)]
struct PersistedStoreRef<'a> {
    format_version: u32,
    saved_at: DateTime<Utc>,
    embedder: &'a str,
    metric: &'a str,
    dimensions: usize,
    document_count: usize,
    index: &'a FlatL2Index,
    documents: &'a [String],
}

#[derive(Deserialize)]
struct PersistedStore {
    saved_at: DateTime<Utc>,
    embedder: String,
    metric: String,
    dimensions: usize,
    document_count: usize,
    index: FlatL2Index,
    documents: Vec<String>,
}

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

/// A snapshot read back from disk, with its header
#[derive(Debug)]
pub struct LoadedStore {
    pub snapshot: StoreSnapshot,
    pub embedder: String,
    pub saved_at: DateTime<Utc>,
}

/// Sibling path the next version of `path` is written to before the rename
pub fn temp_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Read and validate the store at `path`; `None` if no file exists
pub async fn load(path: &Path) -> Result<Option<LoadedStore>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(HagakureError::persistence(path, e)),
    };

    let probe: VersionProbe = serde_json::from_slice(&bytes)
        .map_err(|e| HagakureError::persistence(path, format!("corrupt store file: {}", e)))?;
    if probe.format_version != FORMAT_VERSION {
        return Err(HagakureError::UnsupportedFormat {
            path: path.to_path_buf(),
            found: probe.format_version,
            expected: FORMAT_VERSION,
        });
    }

    let persisted: PersistedStore = serde_json::from_slice(&bytes)
        .map_err(|e| HagakureError::persistence(path, format!("corrupt store file: {}", e)))?;

    validate(path, &persisted)?;

    Ok(Some(LoadedStore {
        snapshot: StoreSnapshot::from_parts(persisted.index, persisted.documents),
        embedder: persisted.embedder,
        saved_at: persisted.saved_at,
    }))
}

fn validate(path: &Path, persisted: &PersistedStore) -> Result<()> {
    if persisted.metric != METRIC {
        return Err(HagakureError::persistence(
            path,
            format!("unknown metric '{}', expected '{}'", persisted.metric, METRIC),
        ));
    }

    persisted.index.validate().map_err(|reason| HagakureError::persistence(path, reason))?;

    if persisted.index.dimensions() != persisted.dimensions {
        return Err(HagakureError::persistence(
            path,
            format!(
                "header declares {} dimensions but the index holds {}-dimensional vectors",
                persisted.dimensions,
                persisted.index.dimensions()
            ),
        ));
    }

    let index_len = persisted.index.len();
    let documents = persisted.documents.len();
    if index_len != documents || documents != persisted.document_count {
        return Err(HagakureError::persistence(
            path,
            format!(
                "size mismatch: header says {} documents, index holds {}, document list holds {}",
                persisted.document_count, index_len, documents
            ),
        ));
    }

    Ok(())
}

/// Atomically replace the store at `path` with `snapshot`
pub async fn save(path: &Path, snapshot: &StoreSnapshot, embedder: &str) -> Result<()> {
    let persisted = PersistedStoreRef {
        format_version: FORMAT_VERSION,
        saved_at: Utc::now(),
        embedder,
        metric: METRIC,
        dimensions: snapshot.dimensions(),
        document_count: snapshot.len(),
        index: snapshot.index(),
        documents: snapshot.texts(),
    };
    let bytes = serde_json::to_vec(&persisted)
        .map_err(|e| HagakureError::persistence(path, format!("failed to encode store: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HagakureError::persistence(path, e))?;
        }
    }

    let tmp = temp_path(path);
    if let Err(e) = write_synced(&tmp, &bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(HagakureError::persistence(path, e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(HagakureError::persistence(path, e));
    }
    sync_parent_dir(path)
        .await
        .map_err(|e| HagakureError::persistence(path, format!("failed to sync directory: {}", e)))?;

    tracing::debug!(path = %path.display(), documents = snapshot.len(), "Context store saved");
    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

/// Flush the directory entry of `path` so a completed rename survives a crash
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    tokio::fs::File::open(parent).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hagakure_core::ErrorKind;
    use tempfile::TempDir;

    fn sample_snapshot() -> StoreSnapshot {
        let mut snapshot = StoreSnapshot::new(2);
        snapshot.push("north".to_string(), &[0.0, 1.0]).unwrap();
        snapshot.push("east".to_string(), &[1.0, 0.0]).unwrap();
        snapshot
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("absent.json")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let snapshot = sample_snapshot();

        save(&path, &snapshot, "hash-2").await.unwrap();
        assert!(!temp_path(&path).exists());

        let loaded = load(&path).await.unwrap().unwrap();
        assert_eq!(loaded.snapshot, snapshot);
        assert_eq!(loaded.embedder, "hash-2");
    }

    #[tokio::test]
    async fn test_file_header_is_versioned() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        save(&path, &sample_snapshot(), "hash-2").await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["format_version"], 1);
        assert_eq!(raw["metric"], "squared_l2");
        assert_eq!(raw["document_count"], 2);
        assert_eq!(raw["documents"][1], "east");
    }

    #[tokio::test]
    async fn test_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"format_version": 7}"#).unwrap();

        let err = load(&path).await.unwrap_err();
        assert!(matches!(err, HagakureError::UnsupportedFormat { found: 7, expected: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"\x80\x04pickle").unwrap();

        let err = load(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{
                "format_version": 1,
                "saved_at": "2025-01-01T00:00:00Z",
                "embedder": "hash-2",
                "metric": "squared_l2",
                "dimensions": 2,
                "document_count": 2,
                "index": { "dimensions": 2, "data": [1.0, 0.0, 0.0, 1.0] },
                "documents": ["only one"]
            }"#,
        )
        .unwrap();

        let err = load(&path).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.to_string().contains("size mismatch"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        save(&path, &sample_snapshot(), "hash-2").await.unwrap();

        // A directory squatting on the temp path makes the write fail
        std::fs::create_dir(temp_path(&path)).unwrap();
        let mut bigger = sample_snapshot();
        bigger.push("south".to_string(), &[0.0, -1.0]).unwrap();

        let err = save(&path, &bigger, "hash-2").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);

        let loaded = load(&path).await.unwrap().unwrap();
        assert_eq!(loaded.snapshot.len(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_parent_dir_sync() {
        let dir = TempDir::new().unwrap();
        sync_parent_dir(&dir.path().join("store.json")).await.unwrap();

        let err = sync_parent_dir(&dir.path().join("gone").join("store.json")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_save_relative_path_syncs_current_dir() {
        let dir = TempDir::new().unwrap();
        let relative = Path::new("store.json");
        assert!(relative.parent().unwrap().as_os_str().is_empty());

        // Relative names resolve against "." for the directory sync
        sync_parent_dir(relative).await.unwrap();
        save(&dir.path().join(relative), &sample_snapshot(), "hash-2").await.unwrap();
        assert_eq!(load(&dir.path().join(relative)).await.unwrap().unwrap().snapshot.len(), 2);
    }
}
