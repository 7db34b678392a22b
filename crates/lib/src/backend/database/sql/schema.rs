//! SQL schema definitions and version check.
//!
//! The schema version is recorded in `schema_version` when the database is first
//! created. Opening a database written with any other version fails; there is no
//! migration path yet.

use crate::Result;
use crate::backend::errors::BackendError;

use super::Sqlite;

/// Current schema version.
///
/// Increment this when making schema changes that require migration.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL statements to create the schema tables.
pub const CREATE_TABLES: &[&str] = &[
    // Schema version tracking
    "CREATE TABLE IF NOT EXISTS schema_version (
        version BIGINT PRIMARY KEY
    )",
    // Flat key space; namespacing is done with key prefixes by the caller
    "CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY NOT NULL,
        value BLOB NOT NULL
    )",
];

/// Initialize the database schema.
///
/// Creates tables if they don't exist and records the schema version. A database
/// stamped with a different version is rejected.
pub async fn initialize(store: &Sqlite) -> Result<()> {
    let pool = store.pool();

    for statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Schema creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to check schema version: {e}"),
            source: Some(e),
        })?;

    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .map_err(|e| BackendError::SqlxError {
                    reason: format!("Failed to initialize schema version: {e}"),
                    source: Some(e),
                })?;
            tracing::info!(version = SCHEMA_VERSION, "Initialized SQLite schema");
        }
        Some((current_version,)) if current_version != SCHEMA_VERSION => {
            return Err(BackendError::SqlxError {
                reason: format!(
                    "Unsupported database schema v{current_version}; this build supports v{SCHEMA_VERSION}"
                ),
                source: None,
            }
            .into());
        }
        Some(_) => {}
    }

    Ok(())
}
