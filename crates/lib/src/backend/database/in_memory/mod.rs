//! In-memory storage engine
//!
//! This module provides an in-memory implementation of the `KvStore` trait,
//! suitable for testing, development, or small single-process deployments.
//! State can optionally be mirrored to a JSON file.

mod persistence;

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::{BackendError, KvStore};

/// A simple in-memory store using a `HashMap` for storage.
///
/// Created with [`InMemory::new`] the store is purely ephemeral. Created with
/// [`InMemory::open`] it is bound to a JSON file and every mutation is written
/// through to that file before the call returns, so acknowledged writes survive
/// a restart.
///
/// Writes are serialized by the map's write lock, which also makes
/// `put_if_absent` atomic with respect to every other operation on the store.
#[derive(Debug, Default)]
pub struct InMemory {
    /// Stored values with read-write lock for concurrent access
    pub(crate) entries: RwLock<HashMap<String, Vec<u8>>>,
    /// File mirrored on every mutation, if any
    pub(crate) path: Option<PathBuf>,
}

impl InMemory {
    /// Creates a new, empty, unbacked `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store backed by the JSON file at `path`.
    ///
    /// Existing contents are loaded; a missing file yields an empty store and the
    /// file is created on the first write.
    ///
    /// Every mutation rewrites and fsyncs the whole file while holding the write
    /// lock, so each write costs time proportional to the number of stored keys
    /// and blocks readers for the duration. Sessions are never removed, so the
    /// file only grows. Use the SQLite backend for anything beyond small or
    /// development deployments.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut store = persistence::load_from_file(&path).await?;
        store.path = Some(path);
        Ok(store)
    }

    /// The file this store writes through to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns all keys currently stored, in no particular order.
    pub async fn all_keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Saves the entire store to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let entries = self.entries.read().await;
        persistence::save_to_file(&entries, path).await
    }

    /// Loads the store state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` store is returned.
    /// The returned store is not bound to the file; use [`InMemory::open`] for that.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }

    /// Writes the current map to the backing file, if there is one.
    async fn write_through(&self, entries: &HashMap<String, Vec<u8>>) -> Result<()> {
        match &self.path {
            Some(path) => persistence::save_to_file(entries, path).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KvStore for InMemory {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let entries = self.entries.read().await;
        entries.get(key).cloned().ok_or_else(|| {
            BackendError::KeyNotFound {
                key: key.to_string(),
            }
            .into()
        })
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        let previous = entries.insert(key.to_string(), value);
        if let Err(e) = self.write_through(&entries).await {
            // Keep memory in line with what is on disk
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value);
        if let Err(e) = self.write_through(&entries).await {
            entries.remove(key);
            return Err(e);
        }
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
