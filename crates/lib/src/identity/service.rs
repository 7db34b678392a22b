//! Registration, login and session resolution
//!
//! [`IdentityService`] is stateless: every operation reads or writes through its
//! [`IdentityStore`] and nothing is cached between calls. It spawns no tasks and
//! holds no locks of its own, so it can be shared freely between request
//! handlers. Dropping an operation's future cancels it at the next store call.

use std::sync::Arc;

use super::{
    crypto::{digest_password, generate_token},
    errors::IdentityError,
    store::IdentityStore,
    types::{PublicUser, Session, UserRecord},
};
use crate::{Result, backend::KvStore};

/// The identity service: register, login, user lookup and session lookup.
#[derive(Clone)]
pub struct IdentityService {
    store: IdentityStore,
}

impl IdentityService {
    /// Create a service over a storage backend.
    pub fn new(backend: Arc<dyn KvStore>) -> Self {
        Self::with_store(IdentityStore::new(backend))
    }

    /// Create a service over an existing [`IdentityStore`].
    pub fn with_store(store: IdentityStore) -> Self {
        Self { store }
    }

    /// Get a reference to the identity store
    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    /// Register a new username with a password.
    ///
    /// # Errors
    /// - `InvalidArgument` if `username` or `password` is empty (checked in that
    ///   order, before storage is touched)
    /// - `AlreadyExists` if the username is taken; the existing record is left
    ///   untouched
    ///
    /// Concurrent registrations of the same username are decided by the store's
    /// atomic insert: exactly one succeeds, the rest get `AlreadyExists`.
    pub async fn register(&self, username: &str, password: &str) -> Result<PublicUser> {
        if username.is_empty() {
            return Err(IdentityError::MissingArgument { field: "username" }.into());
        }
        if password.is_empty() {
            return Err(IdentityError::MissingArgument { field: "password" }.into());
        }

        if self.store.user_exists(username).await? {
            tracing::debug!(username, "Registration refused: username taken");
            return Err(already_exists(username));
        }

        let record = UserRecord {
            username: username.to_string(),
            password_digest: digest_password(password),
        };

        if !self.store.insert_user(&record).await? {
            tracing::warn!(username, "Registration lost race for username");
            return Err(already_exists(username));
        }

        tracing::info!(username, "Registered user");
        Ok(record.to_public())
    }

    /// Authenticate a user and issue a new session.
    ///
    /// Every successful call creates a fresh session; earlier sessions stay valid.
    ///
    /// # Errors
    /// `PermissionDenied` with "bad username" when no such user exists and
    /// "bad password" when the password does not match.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let Some(user) = self.store.get_user(username).await? else {
            tracing::warn!(username, "Login failed: unknown username");
            return Err(IdentityError::BadUsername.into());
        };

        if !user.password_digest.verify(password) {
            tracing::warn!(username, "Login failed: password mismatch");
            return Err(IdentityError::BadPassword.into());
        }

        let session = Session {
            token: generate_token(),
            username: user.username,
        };
        self.store.put_session(&session).await?;

        tracing::info!(username = %session.username, "Issued session");
        Ok(session)
    }

    /// Look up the public view of a user.
    ///
    /// # Errors
    /// `NotFound` if no such user exists.
    pub async fn lookup_user(&self, username: &str) -> Result<PublicUser> {
        tracing::debug!(username, "Looking up user");
        match self.store.get_user(username).await? {
            Some(user) => Ok(user.to_public()),
            None => Err(IdentityError::UserNotFound {
                username: username.to_string(),
            }
            .into()),
        }
    }

    /// Resolve a session to the user it was issued to.
    ///
    /// Only `session.token` is checked. The username is taken from the stored
    /// session record; whatever the caller put in `session.username` is ignored.
    ///
    /// # Errors
    /// - `PermissionDenied` ("invalid session token") if the token was never issued
    /// - `NotFound` if the session's user no longer exists
    pub async fn lookup_by_session(&self, session: &Session) -> Result<PublicUser> {
        let Some(stored) = self.store.get_session(&session.token).await? else {
            tracing::warn!("Rejected unknown session token");
            return Err(IdentityError::InvalidSessionToken.into());
        };

        if !session.username.is_empty() && session.username != stored.username {
            tracing::warn!(
                claimed = %session.username,
                actual = %stored.username,
                "Session presented with mismatched username; using stored username"
            );
        }

        self.lookup_user(&stored.username).await
    }
}

fn already_exists(username: &str) -> crate::Error {
    IdentityError::UsernameAlreadyExists {
        username: username.to_string(),
    }
    .into()
}
