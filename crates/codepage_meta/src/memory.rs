//! In-memory metadata store for testing.

use crate::error::{MetaError, MetaResult};
use crate::id::EntityId;
use crate::store::MetaStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Key/value table shared by the in-memory and file-backed stores.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Table {
    rows: BTreeMap<EntityId, BTreeMap<String, String>>,
}

impl Table {
    pub(crate) fn get(&self, entity: EntityId, key: &str) -> Option<String> {
        self.rows.get(&entity).and_then(|row| row.get(key)).cloned()
    }

    pub(crate) fn set(&mut self, entity: EntityId, key: &str, value: &str) {
        self.rows
            .entry(entity)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub(crate) fn delete(&mut self, entity: EntityId, key: &str) -> bool {
        let Some(row) = self.rows.get_mut(&entity) else {
            return false;
        };
        let existed = row.remove(key).is_some();
        if row.is_empty() {
            self.rows.remove(&entity);
        }
        existed
    }

    pub(crate) fn keys(&self, entity: EntityId) -> Vec<String> {
        self.rows
            .get(&entity)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn entities(&self) -> Vec<EntityId> {
        self.rows.keys().copied().collect()
    }

    pub(crate) fn purge(&mut self, entity: EntityId) -> usize {
        self.rows.remove(&entity).map(|row| row.len()).unwrap_or(0)
    }
}

pub(crate) fn check_key(key: &str) -> MetaResult<()> {
    if key.is_empty() {
        return Err(MetaError::EmptyKey);
    }
    Ok(())
}

/// An in-memory metadata store.
///
/// This store keeps all values in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral sites that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use codepage_meta::{EntityId, InMemoryMetaStore, MetaStore};
///
/// let store = InMemoryMetaStore::new();
/// store.set(EntityId::new(1), "_css_code", "h1{color:red}").unwrap();
/// assert_eq!(store.entities().unwrap(), vec![EntityId::new(1)]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryMetaStore {
    table: RwLock<Table>,
}

impl InMemoryMetaStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entities with at least one key.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    /// Returns true if no entity has any key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().rows.is_empty()
    }

    /// Removes everything from the store.
    pub fn clear(&self) {
        self.table.write().rows.clear();
    }
}

impl MetaStore for InMemoryMetaStore {
    fn get(&self, entity: EntityId, key: &str) -> MetaResult<Option<String>> {
        Ok(self.table.read().get(entity, key))
    }

    fn set(&self, entity: EntityId, key: &str, value: &str) -> MetaResult<()> {
        check_key(key)?;
        self.table.write().set(entity, key, value);
        Ok(())
    }

    fn delete(&self, entity: EntityId, key: &str) -> MetaResult<bool> {
        Ok(self.table.write().delete(entity, key))
    }

    fn keys(&self, entity: EntityId) -> MetaResult<Vec<String>> {
        Ok(self.table.read().keys(entity))
    }

    fn entities(&self) -> MetaResult<Vec<EntityId>> {
        Ok(self.table.read().entities())
    }

    fn purge(&self, entity: EntityId) -> MetaResult<usize> {
        Ok(self.table.write().purge(entity))
    }

    fn flush(&self) -> MetaResult<()> {
        // Nothing is buffered
        Ok(())
    }
}
