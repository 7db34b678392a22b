//! Database-style storage engines
//!
//! These engines provide persistent key-value storage similar to traditional databases.

mod in_memory;
#[cfg(feature = "sqlite")]
pub mod sql;

pub use in_memory::InMemory;
#[cfg(feature = "sqlite")]
pub use sql::Sqlite;
