//! Core data types for the identity service

use serde::{Deserialize, Serialize};

use super::crypto::PasswordDigest;

/// User record as persisted under `users/<username>`.
///
/// Created once by registration and never updated. The digest never leaves the
/// service; callers only ever see a [`PublicUser`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique username (primary key)
    pub username: String,

    /// SHA-256 digest of the password
    pub password_digest: PasswordDigest,
}

impl UserRecord {
    /// The view of this record that is safe to return to any caller.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            username: self.username.clone(),
        }
    }
}

/// The subset of a user record safe to return to any caller.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PublicUser {
    pub username: String,
}

/// A session issued by a successful login.
///
/// Persisted under `sessions/<token>`. The token is the only credential; when
/// a session is presented back to the service only the token is trusted and the
/// username is re-read from the stored record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Opaque, unguessable session token
    pub token: String,

    /// Username the session was issued to
    #[serde(default)]
    pub username: String,
}

impl Session {
    /// A session value carrying only a token, as presented by a caller.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: String::new(),
        }
    }
}
