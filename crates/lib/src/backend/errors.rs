//! Backend error types for identd storage engines.
//!
//! Structured errors for key-value operations, so callers can tell a missing key
//! apart from an I/O failure without matching on strings.

use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// No value is stored under the key.
    #[error("Key not found: {key}")]
    KeyNotFound {
        /// The key that was looked up
        key: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A stored record could not be decoded into its expected shape.
    #[error("Corrupt record at {key}: {reason}")]
    CorruptRecord {
        /// The key holding the record
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Error from the SQL driver.
    #[cfg(feature = "sqlite")]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Context and driver message
        reason: String,
        /// The underlying sqlx error, when there is one
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl BackendError {
    /// Check if this error indicates a key was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::KeyNotFound { .. })
    }

    /// Check if this error is related to I/O or encoding.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error indicates stored data is damaged.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, BackendError::CorruptRecord { .. })
    }

    /// Get the key if this error is about a specific key.
    pub fn key(&self) -> Option<&str> {
        match self {
            BackendError::KeyNotFound { key } | BackendError::CorruptRecord { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
