//! # Codepage Core
//!
//! Snippet entity and rendering pipeline for Codepage.
//!
//! This crate provides:
//! - A content directory (entry kind, title, status, author)
//! - The snippet store and its save contract (edit token, autosave
//!   suppression, edit permission, partial update)
//! - The page renderer that assembles a standalone HTML document
//! - The view router that picks the renderer for published code pages
//!
//! Code fields are stored under `_html_code`, `_css_code` and `_js_code` in
//! the metadata facility of [`codepage_meta`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod access;
mod config;
mod directory;
mod error;
mod pages;
mod render;
mod routing;
mod slashes;
mod snippet;
mod store;
mod token;

pub use access::{AccessPolicy, Principal, Role, RolePolicy};
pub use codepage_meta::EntityId;
pub use config::{Config, CODE_PAGE_KIND};
pub use directory::{ContentDirectory, Entry, EntryStatus, MetaDirectory};
pub use error::{CoreError, CoreResult};
pub use pages::{CodePages, View};
pub use render::{escape_html, PageRenderer};
pub use routing::{slugify, Resolution, ViewRouter, ViewTarget};
pub use slashes::{add_slashes, strip_slashes};
pub use snippet::{CodeField, SaveRequest, Snippet};
pub use store::{SaveContext, SnippetStore};
pub use token::{EditTokens, SiteSecret, TokenAge, TokenRejection, TOKEN_BYTES};
