//! # Codepage Meta
//!
//! Key/value metadata facility for Codepage entries.
//!
//! This crate models the host content system's generic per-entry metadata
//! table: every value is a text blob addressed by an entity identifier and a
//! key. Stores do not interpret the values they hold.
//!
//! ## Design Principles
//!
//! - Stores are simple text maps (get, set, delete)
//! - No knowledge of code fields, entry status or rendering
//! - Must be `Send + Sync` for concurrent access
//! - Last writer wins per key
//!
//! ## Available Stores
//!
//! - [`InMemoryMetaStore`] - For testing and ephemeral sites
//! - [`FileMetaStore`] - Append-only JSON Lines log, replayed on open
//!
//! ## Example
//!
//! ```rust
//! use codepage_meta::{EntityId, InMemoryMetaStore, MetaStore};
//!
//! let store = InMemoryMetaStore::new();
//! let id = EntityId::new(42);
//! store.set(id, "_html_code", "<h1>Hi</h1>").unwrap();
//! assert_eq!(store.get(id, "_html_code").unwrap().as_deref(), Some("<h1>Hi</h1>"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod id;
mod memory;
mod store;

pub use error::{MetaError, MetaResult};
pub use file::FileMetaStore;
pub use id::EntityId;
pub use memory::InMemoryMetaStore;
pub use store::MetaStore;
