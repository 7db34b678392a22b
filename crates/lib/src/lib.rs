//!
//! identd: a minimal identity service.
//! This library registers usernames with passwords, authenticates logins, issues
//! opaque session tokens and resolves a session token back to its user.
//!
//! ## Core Concepts
//!
//! * **Backends (`backend::KvStore`)**: A pluggable byte-oriented key-value store.
//!   `InMemory` (optionally mirrored to a JSON file) and `Sqlite` are provided.
//! * **IdentityStore (`identity::IdentityStore`)**: Typed user and session records
//!   on top of a backend, namespaced as `users/<username>` and `sessions/<token>`.
//! * **IdentityService (`identity::IdentityService`)**: The operations: register,
//!   login, look up a user, look up the user behind a session.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use identd::{ErrorKind, backend::database::InMemory, identity::{IdentityService, Session}};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> identd::Result<()> {
//! let service = IdentityService::new(Arc::new(InMemory::new()));
//!
//! service.register("eric", "Shhh").await?;
//! let session = service.login("eric", "Shhh").await?;
//!
//! let user = service.lookup_by_session(&Session::from_token(&session.token)).await?;
//! assert_eq!(user.username, "eric");
//!
//! let err = service.login("eric", "wrong").await.unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::PermissionDenied);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod constants;
pub mod identity;

/// Result type used throughout the identd library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the identd library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured identity errors from the identity module
    #[error(transparent)]
    Identity(identity::IdentityError),
}

/// Stable failure categories exposed to callers.
///
/// Callers (and transports) should branch on the kind, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required request field was missing or empty
    InvalidArgument,
    /// The resource being created already exists
    AlreadyExists,
    /// Authentication failed
    PermissionDenied,
    /// The requested resource does not exist
    NotFound,
    /// Anything else, typically a storage failure
    Internal,
}

impl ErrorKind {
    /// Snake-case code for this kind, e.g. `"permission_denied"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Identity(_) => "identity",
        }
    }

    /// The stable failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Identity(identity_err) => identity_err.kind(),
            Error::Backend(backend_err) if backend_err.is_not_found() => ErrorKind::NotFound,
            _ => ErrorKind::Internal,
        }
    }

    /// The name of the offending request field, for `InvalidArgument` errors.
    pub fn argument(&self) -> Option<&'static str> {
        match self {
            Error::Identity(identity_err) => identity_err.argument(),
            _ => None,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        self.kind() == ErrorKind::PermissionDenied
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }

    /// Check if this error is caused by invalid caller input.
    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    /// Check if this error came from the storage layer.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_io_error(),
            Error::Identity(_) => false,
        }
    }
}
