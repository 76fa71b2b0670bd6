//! Content directory: which entries exist, their kind, title and status.
//!
//! The directory stands in for the host content system. [`MetaDirectory`]
//! keeps entry records in the same metadata facility as the code fields,
//! under reserved keys:
//!
//! | key       | value                                       |
//! |-----------|---------------------------------------------|
//! | `_kind`   | content kind name                           |
//! | `_title`  | display title                               |
//! | `_status` | `draft`, `pending`, `private`, `published`  |
//! | `_author` | numeric user id                             |
//!
//! Entity `0` is never an entry; it holds the directory's own `_next_id`
//! high-water mark so identifiers of removed entries are not handed out again.

use crate::error::{CoreError, CoreResult};
use crate::routing::slugify;
use codepage_meta::{EntityId, MetaStore};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

const KIND_KEY: &str = "_kind";
const TITLE_KEY: &str = "_title";
const STATUS_KEY: &str = "_status";
const AUTHOR_KEY: &str = "_author";

const DIRECTORY_RECORD: EntityId = EntityId::new(0);
const NEXT_ID_KEY: &str = "_next_id";

/// Publication state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Work in progress, never shown publicly.
    Draft,
    /// Awaiting review.
    Pending,
    /// Visible only to editors.
    Private,
    /// Publicly reachable.
    Published,
}

impl EntryStatus {
    /// Returns the stored name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Pending => "pending",
            EntryStatus::Private => "private",
            EntryStatus::Published => "published",
        }
    }

    /// Returns true only for [`EntryStatus::Published`].
    #[must_use]
    pub const fn is_published(&self) -> bool {
        matches!(self, EntryStatus::Published)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EntryStatus::Draft),
            "pending" => Ok(EntryStatus::Pending),
            "private" => Ok(EntryStatus::Private),
            "published" | "publish" => Ok(EntryStatus::Published),
            other => Err(CoreError::InvalidInput(format!("unknown status: {other}"))),
        }
    }
}

/// A content entry as known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable identifier.
    pub id: EntityId,
    /// Content kind name.
    pub kind: String,
    /// Display title.
    pub title: String,
    /// Publication state.
    pub status: EntryStatus,
    /// User id of the author.
    pub author: u64,
}

impl Entry {
    /// URL slug derived from the title, or the id when the title has no
    /// usable characters.
    #[must_use]
    pub fn slug(&self) -> String {
        let slug = slugify(&self.title);
        if slug.is_empty() {
            self.id.to_string()
        } else {
            slug
        }
    }
}

/// Registry of content entries.
///
/// Identifier allocation belongs to the directory; the snippet store and the
/// renderer only ever read from it.
pub trait ContentDirectory: Send + Sync {
    /// Looks up one entry.
    fn entry(&self, id: EntityId) -> CoreResult<Option<Entry>>;

    /// Lists all entries in id order.
    fn entries(&self) -> CoreResult<Vec<Entry>>;

    /// Creates a draft entry and assigns it a fresh identifier.
    fn create(&self, kind: &str, title: &str, author: u64) -> CoreResult<Entry>;

    /// Registers an entry under an identifier assigned elsewhere.
    fn insert(&self, entry: &Entry) -> CoreResult<()>;

    /// Changes the publication state of an entry.
    fn set_status(&self, id: EntityId, status: EntryStatus) -> CoreResult<Entry>;

    /// Changes the title of an entry.
    fn set_title(&self, id: EntityId, title: &str) -> CoreResult<Entry>;

    /// Deletes an entry together with all of its metadata.
    /// Returns whether the entry existed.
    fn remove(&self, id: EntityId) -> CoreResult<bool>;

    /// Finds the entry of `kind` whose slug is `slug`. The lowest id wins
    /// when several titles produce the same slug.
    fn find_by_slug(&self, kind: &str, slug: &str) -> CoreResult<Option<Entry>> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|entry| entry.kind == kind && entry.slug() == slug))
    }
}

/// A [`ContentDirectory`] stored in a [`MetaStore`].
pub struct MetaDirectory {
    meta: Arc<dyn MetaStore>,
    alloc: Mutex<()>,
}

impl MetaDirectory {
    /// Creates a directory over `meta`.
    pub fn new(meta: Arc<dyn MetaStore>) -> Self {
        Self {
            meta,
            alloc: Mutex::new(()),
        }
    }

    fn write(&self, entry: &Entry) -> CoreResult<()> {
        self.meta.set(entry.id, KIND_KEY, &entry.kind)?;
        self.meta.set(entry.id, TITLE_KEY, &entry.title)?;
        self.meta.set(entry.id, STATUS_KEY, entry.status.as_str())?;
        self.meta.set(entry.id, AUTHOR_KEY, &entry.author.to_string())?;
        Ok(())
    }

    fn next_id(&self) -> CoreResult<u64> {
        match self.meta.get(DIRECTORY_RECORD, NEXT_ID_KEY)? {
            Some(raw) => raw.parse().map_err(|_| CoreError::InvalidRecord {
                id: DIRECTORY_RECORD,
                message: format!("bad next id {raw:?}"),
            }),
            None => Ok(1),
        }
    }

    /// Picks an id above both the high-water mark and every id in use, and
    /// moves the mark past it. Callers hold `alloc`.
    fn allocate(&self) -> CoreResult<EntityId> {
        let exhausted = || CoreError::InvalidInput("entity ids exhausted".into());
        let above_existing = match self.meta.entities()?.last() {
            Some(last) => last.as_u64().checked_add(1).ok_or_else(exhausted)?,
            None => 1,
        };
        let id = self.next_id()?.max(above_existing);
        let next = id.checked_add(1).ok_or_else(exhausted)?;
        self.meta.set(DIRECTORY_RECORD, NEXT_ID_KEY, &next.to_string())?;
        Ok(EntityId::new(id))
    }

    fn require(&self, id: EntityId) -> CoreResult<Entry> {
        self.entry(id)?.ok_or(CoreError::EntityNotFound(id))
    }
}

impl ContentDirectory for MetaDirectory {
    fn entry(&self, id: EntityId) -> CoreResult<Option<Entry>> {
        let Some(kind) = self.meta.get(id, KIND_KEY)? else {
            return Ok(None);
        };
        let title = self.meta.get(id, TITLE_KEY)?.unwrap_or_default();
        let status = match self.meta.get(id, STATUS_KEY)? {
            Some(raw) => raw.parse().map_err(|_| CoreError::InvalidRecord {
                id,
                message: format!("unknown status {raw:?}"),
            })?,
            None => EntryStatus::Draft,
        };
        let author = match self.meta.get(id, AUTHOR_KEY)? {
            Some(raw) => raw.parse().map_err(|_| CoreError::InvalidRecord {
                id,
                message: format!("bad author {raw:?}"),
            })?,
            None => 0,
        };

        Ok(Some(Entry {
            id,
            kind,
            title,
            status,
            author,
        }))
    }

    fn entries(&self) -> CoreResult<Vec<Entry>> {
        let mut entries = Vec::new();
        for id in self.meta.entities()? {
            if let Some(entry) = self.entry(id)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn create(&self, kind: &str, title: &str, author: u64) -> CoreResult<Entry> {
        if kind.is_empty() {
            return Err(CoreError::InvalidInput("content kind must not be empty".into()));
        }

        let _guard = self.alloc.lock();
        let id = self.allocate()?;

        let entry = Entry {
            id,
            kind: kind.to_string(),
            title: title.to_string(),
            status: EntryStatus::Draft,
            author,
        };
        self.write(&entry)?;
        debug!(%id, kind, "entry created");
        Ok(entry)
    }

    fn insert(&self, entry: &Entry) -> CoreResult<()> {
        if entry.kind.is_empty() {
            return Err(CoreError::InvalidInput("content kind must not be empty".into()));
        }

        if entry.id == DIRECTORY_RECORD {
            return Err(CoreError::InvalidInput("entry id 0 is reserved".into()));
        }

        let _guard = self.alloc.lock();
        if self.entry(entry.id)?.is_some() {
            return Err(CoreError::InvalidInput(format!("entry {} already exists", entry.id)));
        }
        self.write(entry)?;
        if let Some(next) = entry.id.as_u64().checked_add(1) {
            if next > self.next_id()? {
                self.meta.set(DIRECTORY_RECORD, NEXT_ID_KEY, &next.to_string())?;
            }
        }
        debug!(id = %entry.id, kind = %entry.kind, "entry inserted");
        Ok(())
    }

    fn set_status(&self, id: EntityId, status: EntryStatus) -> CoreResult<Entry> {
        let mut entry = self.require(id)?;
        self.meta.set(id, STATUS_KEY, status.as_str())?;
        entry.status = status;
        debug!(%id, %status, "entry status changed");
        Ok(entry)
    }

    fn set_title(&self, id: EntityId, title: &str) -> CoreResult<Entry> {
        let mut entry = self.require(id)?;
        self.meta.set(id, TITLE_KEY, title)?;
        entry.title = title.to_string();
        Ok(entry)
    }

    fn remove(&self, id: EntityId) -> CoreResult<bool> {
        if self.entry(id)?.is_none() {
            return Ok(false);
        }
        let removed = self.meta.purge(id)?;
        debug!(%id, keys = removed, "entry removed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CODE_PAGE_KIND;
    use codepage_meta::InMemoryMetaStore;

    fn directory() -> (Arc<InMemoryMetaStore>, MetaDirectory) {
        let meta = Arc::new(InMemoryMetaStore::new());
        let dir = MetaDirectory::new(meta.clone());
        (meta, dir)
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let (_, dir) = directory();
        let a = dir.create(CODE_PAGE_KIND, "First", 1).unwrap();
        let b = dir.create(CODE_PAGE_KIND, "Second", 1).unwrap();

        assert_eq!(a.id, EntityId::new(1));
        assert_eq!(b.id, EntityId::new(2));
        assert_eq!(a.status, EntryStatus::Draft);
    }

    #[test]
    fn create_skips_ids_used_by_other_metadata() {
        let (meta, dir) = directory();
        meta.set(EntityId::new(41), "_html_code", "orphan").unwrap();

        let entry = dir.create(CODE_PAGE_KIND, "After", 1).unwrap();
        assert_eq!(entry.id, EntityId::new(42));
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let (_, dir) = directory();
        dir.create(CODE_PAGE_KIND, "Keep", 1).unwrap();
        let last = dir.create(CODE_PAGE_KIND, "Gone", 1).unwrap();
        assert!(dir.remove(last.id).unwrap());

        let entry = dir.create(CODE_PAGE_KIND, "Fresh", 1).unwrap();
        assert_eq!(entry.id, EntityId::new(3));
        assert!(dir.entry(EntityId::new(0)).unwrap().is_none());
        assert_eq!(dir.entries().unwrap().len(), 2);
    }

    #[test]
    fn create_fails_when_ids_run_out() {
        let (meta, dir) = directory();
        let top = EntityId::new(u64::MAX);
        meta.set(top, KIND_KEY, CODE_PAGE_KIND).unwrap();
        meta.set(top, TITLE_KEY, "Last").unwrap();

        let result = dir.create(CODE_PAGE_KIND, "Overflow", 1);
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
        assert_eq!(dir.entry(top).unwrap().unwrap().title, "Last");
    }

    #[test]
    fn insert_rejects_reserved_id() {
        let (_, dir) = directory();
        let entry = Entry {
            id: EntityId::new(0),
            kind: CODE_PAGE_KIND.into(),
            title: "Zero".into(),
            status: EntryStatus::Draft,
            author: 1,
        };
        assert!(matches!(dir.insert(&entry), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn entry_round_trip() {
        let (_, dir) = directory();
        let created = dir.create(CODE_PAGE_KIND, "Landing", 7).unwrap();
        let loaded = dir.entry(created.id).unwrap().unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn metadata_without_kind_is_not_an_entry() {
        let (meta, dir) = directory();
        meta.set(EntityId::new(3), "_html_code", "x").unwrap();
        assert!(dir.entry(EntityId::new(3)).unwrap().is_none());
        assert!(dir.entries().unwrap().is_empty());
    }

    #[test]
    fn status_and_title_updates() {
        let (_, dir) = directory();
        let entry = dir.create(CODE_PAGE_KIND, "Old", 1).unwrap();

        let entry = dir.set_status(entry.id, EntryStatus::Published).unwrap();
        assert!(entry.status.is_published());

        let entry = dir.set_title(entry.id, "New").unwrap();
        assert_eq!(dir.entry(entry.id).unwrap().unwrap().title, "New");
    }

    #[test]
    fn updating_missing_entry_fails() {
        let (_, dir) = directory();
        let result = dir.set_status(EntityId::new(99), EntryStatus::Published);
        assert!(matches!(result, Err(CoreError::EntityNotFound(_))));
    }

    #[test]
    fn remove_purges_code_fields() {
        let (meta, dir) = directory();
        let entry = dir.create(CODE_PAGE_KIND, "Doomed", 1).unwrap();
        meta.set(entry.id, "_html_code", "<p>bye</p>").unwrap();

        assert!(dir.remove(entry.id).unwrap());
        assert!(!dir.remove(entry.id).unwrap());
        assert!(meta.keys(entry.id).unwrap().is_empty());
    }

    #[test]
    fn corrupt_status_is_reported() {
        let (meta, dir) = directory();
        let entry = dir.create(CODE_PAGE_KIND, "Broken", 1).unwrap();
        meta.set(entry.id, STATUS_KEY, "sideways").unwrap();

        let result = dir.entry(entry.id);
        assert!(matches!(result, Err(CoreError::InvalidRecord { .. })));
    }

    #[test]
    fn find_by_slug_prefers_lowest_id() {
        let (_, dir) = directory();
        dir.create("post", "About Us", 1).unwrap();
        let first = dir.create(CODE_PAGE_KIND, "About Us", 1).unwrap();
        dir.create(CODE_PAGE_KIND, "About us!", 1).unwrap();

        let found = dir.find_by_slug(CODE_PAGE_KIND, "about-us").unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn slug_falls_back_to_id() {
        let (_, dir) = directory();
        let entry = dir.create(CODE_PAGE_KIND, "???", 1).unwrap();
        assert_eq!(entry.slug(), entry.id.to_string());
    }

    #[test]
    fn insert_keeps_assigned_id() {
        let (_, dir) = directory();
        let entry = Entry {
            id: EntityId::new(42),
            kind: CODE_PAGE_KIND.into(),
            title: "Imported".into(),
            status: EntryStatus::Published,
            author: 3,
        };
        dir.insert(&entry).unwrap();

        assert_eq!(dir.entry(EntityId::new(42)).unwrap(), Some(entry.clone()));
        assert!(dir.insert(&entry).is_err());
        assert_eq!(dir.create(CODE_PAGE_KIND, "Next", 1).unwrap().id, EntityId::new(43));
    }

    #[test]
    fn status_parsing() {
        assert_eq!("publish".parse::<EntryStatus>().unwrap(), EntryStatus::Published);
        assert_eq!("private".parse::<EntryStatus>().unwrap(), EntryStatus::Private);
        assert!("live".parse::<EntryStatus>().is_err());
    }
}
