//! View routing: decides whether a request is served by the page renderer
//! or left to the site's default template resolution.

use crate::directory::{ContentDirectory, Entry};
use crate::error::CoreResult;
use codepage_meta::EntityId;
use std::sync::Arc;
use tracing::debug;

/// What a page view asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewTarget {
    /// The site front page.
    Home,
    /// A single entry by identifier.
    Entry(EntityId),
    /// A single entry by URL slug.
    Slug(String),
    /// Nothing recognisable.
    NotFound,
}

/// Outcome of template resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Render this entry with the page renderer.
    CodePage(EntityId),
    /// Fall through to the default template path.
    Default(ViewTarget),
}

/// Routes views of published code pages to the renderer.
pub struct ViewRouter {
    directory: Arc<dyn ContentDirectory>,
    kind: String,
}

impl ViewRouter {
    /// Creates a router for content kind `kind`.
    pub fn new(directory: Arc<dyn ContentDirectory>, kind: impl Into<String>) -> Self {
        Self {
            directory,
            kind: kind.into(),
        }
    }

    /// Resolves the entry a target refers to, of any kind or status.
    ///
    /// Numeric slugs are treated as identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn lookup(&self, target: &ViewTarget) -> CoreResult<Option<Entry>> {
        match target {
            ViewTarget::Entry(id) => self.directory.entry(*id),
            ViewTarget::Slug(slug) => match slug.parse::<EntityId>() {
                Ok(id) => self.directory.entry(id),
                Err(_) => self.directory.find_by_slug(&self.kind, slug),
            },
            ViewTarget::Home | ViewTarget::NotFound => Ok(None),
        }
    }

    /// Chooses the renderer iff the target is a published entry of the
    /// managed kind; anything else resolves to [`Resolution::Default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn resolve(&self, target: ViewTarget) -> CoreResult<Resolution> {
        let resolution = match self.lookup(&target)? {
            Some(entry) if entry.kind == self.kind && entry.status.is_published() => {
                Resolution::CodePage(entry.id)
            }
            _ => Resolution::Default(target),
        };
        debug!(?resolution, "view resolved");
        Ok(resolution)
    }
}

/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single `-`, trimming dashes at both ends.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
