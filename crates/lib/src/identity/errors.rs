//! Error types for the identity service
use thiserror::Error;

use crate::ErrorKind;

/// Failures produced by [`IdentityService`](super::IdentityService) operations.
///
/// Storage failures are not represented here; they surface unchanged as
/// [`crate::Error::Backend`].
///
/// The three authentication failures deliberately share the
/// [`ErrorKind::PermissionDenied`] kind. Their messages still differ, which
/// tells anyone reading raw messages whether a username exists.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{field} is required")]
    MissingArgument { field: &'static str },

    #[error("Username: {username} already exists")]
    UsernameAlreadyExists { username: String },

    #[error("bad username")]
    BadUsername,

    #[error("bad password")]
    BadPassword,

    #[error("invalid session token")]
    InvalidSessionToken,

    #[error("{username} not found")]
    UserNotFound { username: String },
}

impl IdentityError {
    /// The stable failure category callers should branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::MissingArgument { .. } => ErrorKind::InvalidArgument,
            IdentityError::UsernameAlreadyExists { .. } => ErrorKind::AlreadyExists,
            IdentityError::BadUsername
            | IdentityError::BadPassword
            | IdentityError::InvalidSessionToken => ErrorKind::PermissionDenied,
            IdentityError::UserNotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, IdentityError::UserNotFound { .. })
    }

    /// Check if this error is an authentication failure.
    pub fn is_permission_denied(&self) -> bool {
        self.kind() == ErrorKind::PermissionDenied
    }

    /// The name of the offending request field, for `InvalidArgument` failures.
    pub fn argument(&self) -> Option<&'static str> {
        match self {
            IdentityError::MissingArgument { field } => Some(field),
            _ => None,
        }
    }
}

impl From<IdentityError> for crate::Error {
    fn from(err: IdentityError) -> Self {
        crate::Error::Identity(err)
    }
}
