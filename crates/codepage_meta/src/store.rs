//! Metadata store trait definition.

use crate::error::MetaResult;
use crate::id::EntityId;

/// The host content system's per-entry key/value metadata facility.
///
/// Stores are **opaque text maps**. Values are kept byte-for-byte as given;
/// no trimming, escaping or unescaping happens at this layer.
///
/// # Invariants
///
/// - `get` after `set` on the same `(entity, key)` returns the value just set
/// - concurrent `set` calls on the same key are last-writer-wins
/// - `purge` removes every key of an entity
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryMetaStore`] - For testing
/// - [`super::FileMetaStore`] - For persistent storage
pub trait MetaStore: Send + Sync {
    /// Reads the value of `key` for `entity`, or `None` if never set.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, entity: EntityId, key: &str) -> MetaResult<Option<String>>;

    /// Overwrites the value of `key` for `entity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the write fails.
    fn set(&self, entity: EntityId, key: &str, value: &str) -> MetaResult<()>;

    /// Removes `key` from `entity`. Returns whether the key existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete(&self, entity: EntityId, key: &str) -> MetaResult<bool>;

    /// Lists the keys currently set for `entity`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn keys(&self, entity: EntityId) -> MetaResult<Vec<String>>;

    /// Lists every entity that has at least one key, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn entities(&self) -> MetaResult<Vec<EntityId>>;

    /// Removes every key of `entity`. Returns the number of keys removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn purge(&self, entity: EntityId) -> MetaResult<usize>;

    /// Makes all previous writes durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&self) -> MetaResult<()>;
}
