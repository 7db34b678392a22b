//! Backend creation and utility functions.

use std::{path::PathBuf, sync::Arc};

use identd::backend::{
    KvStore,
    database::{InMemory, Sqlite},
};

use crate::cli::{Backend, ServeArgs};

pub const SQLITE_FILE: &str = "identd.db";
pub const JSON_FILE: &str = "identd.json";

/// Path of the storage file for the configured backend
pub fn storage_path(args: &ServeArgs) -> PathBuf {
    match args.backend {
        Backend::Sqlite => args.data_dir.join(SQLITE_FILE),
        Backend::Inmemory => args.data_dir.join(JSON_FILE),
    }
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    args: &ServeArgs,
) -> Result<Arc<dyn KvStore>, Box<dyn std::error::Error>> {
    // Ensure data directory exists
    tokio::fs::create_dir_all(&args.data_dir).await?;

    let path = storage_path(args);
    match args.backend {
        Backend::Sqlite => {
            tracing::info!("Using SQLite backend at {}", path.display());
            Ok(Arc::new(Sqlite::open(&path).await?))
        }
        Backend::Inmemory => {
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                path.display()
            );
            Ok(Arc::new(InMemory::open(&path).await?))
        }
    }
}

/// Short backend name reported by the health endpoint
pub fn backend_name(backend: &dyn KvStore) -> &'static str {
    let any = backend.as_any();
    if any.is::<Sqlite>() {
        "sqlite"
    } else if any.is::<InMemory>() {
        "inmemory"
    } else {
        "unknown"
    }
}

/// Flush and release the backend before exit.
///
/// InMemory stores are saved to their backing file; SQLite pools are closed.
pub async fn shutdown_backend(backend: &dyn KvStore) {
    let any = backend.as_any();
    if let Some(in_memory) = any.downcast_ref::<InMemory>() {
        if let Some(path) = in_memory.path() {
            match in_memory.save_to_file(path).await {
                Ok(()) => tracing::info!("Database saved to {}", path.display()),
                Err(e) => tracing::error!("Failed to save database: {e}"),
            }
        }
    } else if let Some(sqlite) = any.downcast_ref::<Sqlite>() {
        sqlite.close().await;
        tracing::info!("SQLite pool closed");
    }
}
