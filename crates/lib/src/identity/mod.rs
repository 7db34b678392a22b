//! Identity system for identd
//!
//! Username/password registration, login with opaque session tokens, and
//! resolution of a session token back to its user.

pub mod crypto;
pub mod errors;
pub mod service;
pub mod store;
pub mod types;

pub use errors::IdentityError;
pub use service::IdentityService;
pub use store::IdentityStore;
pub use types::*;
