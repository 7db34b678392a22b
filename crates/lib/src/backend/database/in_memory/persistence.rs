//! Persistence operations for the InMemory store
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory state to/from JSON files.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::InMemory;
use crate::{Error, Result, backend::BackendError};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk shape of the store. Values are hex encoded so the file stays readable.
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    entries: HashMap<String, String>,
}

/// Saves a snapshot of `entries` to `path` as JSON.
///
/// The snapshot is written to a sibling temporary file, flushed to stable
/// storage, and renamed into place; the parent directory is then synced so the
/// rename itself survives a power loss. A crash mid-write never leaves a
/// truncated file behind.
pub(crate) async fn save_to_file<P: AsRef<Path>>(
    entries: &HashMap<String, Vec<u8>>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        entries: entries
            .iter()
            .map(|(k, v)| (k.clone(), hex::encode(v)))
            .collect(),
    };

    let json = serde_json::to_vec_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;

    let tmp_path = path.with_extension("tmp");
    if let Err(e) = write_synced(&tmp_path, &json).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(BackendError::FileIo { source: e }.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(BackendError::FileIo { source: e }.into());
    }
    sync_parent_dir(path)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
}

/// Writes `bytes` to a fresh file at `path` and waits for them to reach disk.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

/// Persists directory entry changes (the rename) for the directory holding `path`.
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

/// Loads the store state from a specified JSON file.
///
/// If the file does not exist, a new, empty `InMemory` store is returned.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    let path = path.as_ref();
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(InMemory::new()),
        Err(e) => return Err(BackendError::FileIo { source: e }.into()),
    };

    let serializable: SerializableStore = serde_json::from_str(&json)
        .map_err(|e| -> Error { BackendError::DeserializationFailed { source: e }.into() })?;

    let mut entries = HashMap::with_capacity(serializable.entries.len());
    for (key, value) in serializable.entries {
        let bytes = hex::decode(&value).map_err(|e| BackendError::CorruptRecord {
            key: key.clone(),
            reason: format!("invalid hex value: {e}"),
        })?;
        entries.insert(key, bytes);
    }

    tracing::info!(path = %path.display(), keys = entries.len(), "Loaded in-memory store");

    Ok(InMemory {
        entries: RwLock::new(entries),
        path: None,
    })
}
