//! Typed persistence for user and session records
//!
//! [`IdentityStore`] owns all identity state. It maps records onto a
//! [`KvStore`] under two key prefixes in one flat key space:
//!
//! - `users/<username>` holds a JSON encoded [`UserRecord`]
//! - `sessions/<token>` holds a JSON encoded [`Session`]

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{Session, UserRecord};
use crate::{
    Error, Result,
    backend::{BackendError, KvStore},
    constants::{SESSIONS_PREFIX, USERS_PREFIX},
};

/// Storage key for a user record.
pub fn user_key(username: &str) -> String {
    format!("{USERS_PREFIX}{username}")
}

/// Storage key for a session record.
pub fn session_key(token: &str) -> String {
    format!("{SESSIONS_PREFIX}{token}")
}

/// Record-level access to identity state over a shared [`KvStore`].
///
/// Cloning is cheap; clones share the same underlying store.
#[derive(Clone)]
pub struct IdentityStore {
    backend: Arc<dyn KvStore>,
}

impl IdentityStore {
    /// Wrap a storage backend.
    pub fn new(backend: Arc<dyn KvStore>) -> Self {
        Self { backend }
    }

    /// Get a reference to the backend
    pub fn backend(&self) -> &Arc<dyn KvStore> {
        &self.backend
    }

    /// Check whether a user record exists for `username`.
    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        self.backend.exists(&user_key(username)).await
    }

    /// Load the user record for `username`, or `None` if there is none.
    pub async fn get_user(&self, username: &str) -> Result<Option<UserRecord>> {
        self.load(&user_key(username)).await
    }

    /// Persist a new user record unless one already exists for the username.
    ///
    /// # Returns
    /// `true` if the record was written, `false` if the username was taken.
    pub async fn insert_user(&self, record: &UserRecord) -> Result<bool> {
        let bytes = encode(record)?;
        self.backend
            .put_if_absent(&user_key(&record.username), bytes)
            .await
    }

    /// Persist a session record, keyed by its token.
    pub async fn put_session(&self, session: &Session) -> Result<()> {
        let bytes = encode(session)?;
        self.backend.put(&session_key(&session.token), bytes).await
    }

    /// Load the session record for `token`, or `None` if it was never issued.
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        self.load(&session_key(token)).await
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let bytes = match self.backend.get(key).await {
            Ok(bytes) => bytes,
            Err(Error::Backend(BackendError::KeyNotFound { .. })) => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            BackendError::CorruptRecord {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(record)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })
}
