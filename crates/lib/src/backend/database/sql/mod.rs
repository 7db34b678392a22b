//! SQLite storage engine for identd.
//!
//! Stores every key in a single `kv` table through a sqlx connection pool.
//!
//! ## Schema
//!
//! The schema is defined in the [`schema`] module and automatically initialized
//! when connecting. Databases stamped with another schema version are refused.

mod storage;

/// Schema definition and version check.
pub mod schema;

use std::any::Any;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::Result;
use crate::backend::KvStore;
use crate::backend::errors::BackendError;

/// Extension trait for sqlx Result types to simplify error handling.
///
/// Similar to `anyhow::Context`, this trait adds a method to convert
/// sqlx errors to `BackendError::SqlxError` with a context message.
pub(crate) trait SqlxResultExt<T> {
    /// Convert sqlx error to BackendError with context message.
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            BackendError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

/// SQLite-backed `KvStore`.
///
/// # Thread Safety
///
/// `Sqlite` is `Send + Sync` as required by `KvStore`. The underlying sqlx pool
/// handles connection pooling, and SQLite serializes writers, so
/// `put_if_absent` is atomic across connections.
#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use identd::backend::database::Sqlite;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let store = Sqlite::open("identd.db").await.unwrap();
    /// }
    /// ```
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        // Taken as a literal filename, not parsed as a URL
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        Self::connect_with(options, false).await
    }

    /// Connect to a SQLite database using a connection URL.
    ///
    /// # Arguments
    ///
    /// * `url` - SQLite connection URL (e.g., "sqlite:./identd.db?mode=rwc")
    pub async fn connect(url: &str) -> Result<Self> {
        let is_in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let options = SqliteConnectOptions::from_str(url).sql_context("Invalid SQLite URL")?;
        Self::connect_with(options, is_in_memory).await
    }

    async fn connect_with(options: SqliteConnectOptions, is_in_memory: bool) -> Result<Self> {
        let mut options = options.busy_timeout(Duration::from_secs(5));

        // An in-memory database lives only as long as its connection, so the
        // pool keeps exactly one connection open for the lifetime of the store.
        let pool = if is_in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
                .sql_context("Failed to connect to SQLite")?
        } else {
            // - journal_mode=WAL: Write-Ahead Logging for better concurrency
            // - synchronous=FULL: a committed write survives power loss
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Full);
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await
                .sql_context("Failed to connect to SQLite")?
        };

        let store = Self { pool };

        schema::initialize(&store).await?;

        Ok(store)
    }

    /// Create an in-memory SQLite database.
    ///
    /// The database exists only for the lifetime of this store.
    /// Useful for testing.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KvStore for Sqlite {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        storage::get(self, key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        storage::put(self, key, value).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        storage::exists(self, key).await
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool> {
        storage::put_if_absent(self, key, value).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
