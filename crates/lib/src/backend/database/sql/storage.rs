//! Key-value operations for the SQLite engine.

use crate::Result;
use crate::backend::errors::BackendError;

use super::{Sqlite, SqlxResultExt};

/// Get the value stored under `key`.
pub async fn get(store: &Sqlite, key: &str) -> Result<Vec<u8>> {
    let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
        .bind(key)
        .fetch_optional(store.pool())
        .await
        .sql_context("Failed to get value")?;

    match row {
        Some((value,)) => Ok(value),
        None => Err(BackendError::KeyNotFound {
            key: key.to_string(),
        }
        .into()),
    }
}

/// Store `value` under `key`, replacing any previous value.
pub async fn put(store: &Sqlite, key: &str, value: Vec<u8>) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(value)
        .execute(store.pool())
        .await
        .sql_context("Failed to put value")?;
    Ok(())
}

/// Check whether `key` has a stored value.
pub async fn exists(store: &Sqlite, key: &str) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM kv WHERE key = ?")
        .bind(key)
        .fetch_optional(store.pool())
        .await
        .sql_context("Failed to check key")?;
    Ok(row.is_some())
}

/// Insert `value` under `key` unless the key already exists.
///
/// Returns whether a row was inserted.
pub async fn put_if_absent(store: &Sqlite, key: &str, value: Vec<u8>) -> Result<bool> {
    let result = sqlx::query("INSERT OR IGNORE INTO kv (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(value)
        .execute(store.pool())
        .await
        .sql_context("Failed to insert value")?;
    Ok(result.rows_affected() == 1)
}
