//! Storage backends for identd
//!
//! This module provides the `KvStore` trait and its implementations under
//! `database`.
//!
//! The `KvStore` trait is a flat byte-oriented key-value interface. It knows
//! nothing about users or sessions; key namespacing and record encoding live in
//! [`crate::identity::store`]. This keeps the identity logic independent of the
//! specific storage mechanism.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Key-value storage abstraction used by the identity layer.
///
/// Keys are UTF-8 strings, values are opaque bytes. Implementations must be
/// safe for concurrent use from many tasks (`Send + Sync`) and implement `Any`
/// so the host can downcast, e.g. to persist an `InMemory` store at shutdown.
///
/// Every mutating call is durable before it returns: once `put` or
/// `put_if_absent` resolves `Ok`, a subsequent `get` (from any task, or after a
/// reopen for persistent engines) observes the write.
#[async_trait]
pub trait KvStore: Send + Sync + Any {
    /// Retrieves the value stored under `key`.
    ///
    /// # Returns
    /// The stored bytes, or `BackendError::KeyNotFound` when the key is absent.
    /// Any other error is a store-level failure.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Stores `value` under `key`, overwriting any existing value.
    ///
    /// Callers that need uniqueness must use [`KvStore::put_if_absent`] instead.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Checks whether a value is stored under `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Atomically stores `value` under `key` only if the key is absent.
    ///
    /// # Returns
    /// `true` if this call created the key, `false` if the key already existed.
    /// When `false` is returned nothing was written.
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool>;

    /// Returns a reference to the store as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
