//! Constants used throughout the identd library.
//!
//! Central definitions for key prefixes and fixed sizes shared by the storage
//! layer and the identity service.

/// Key prefix for user records (`users/<username>`).
pub const USERS_PREFIX: &str = "users/";

/// Key prefix for session records (`sessions/<token>`).
pub const SESSIONS_PREFIX: &str = "sessions/";

/// Length in bytes of a password digest (SHA-256).
pub const DIGEST_LENGTH: usize = 32;

/// Number of random bytes in a session token (128 bits).
pub const TOKEN_BYTES: usize = 16;
