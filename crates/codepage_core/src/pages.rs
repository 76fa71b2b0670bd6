//! Wiring of directory, store, renderer and router over one metadata store.

use crate::access::{AccessPolicy, RolePolicy};
use crate::config::Config;
use crate::directory::{ContentDirectory, MetaDirectory};
use crate::error::CoreResult;
use crate::render::PageRenderer;
use crate::routing::{Resolution, ViewRouter, ViewTarget};
use crate::store::SnippetStore;
use crate::token::{EditTokens, SiteSecret};
use codepage_meta::MetaStore;
use std::sync::Arc;

/// Result of a page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// A rendered code page document.
    Page(String),
    /// Not a published code page; use the default template path.
    Default(ViewTarget),
}

/// The code page pipeline, constructed once and shared by request handlers.
///
/// # Example
///
/// ```rust
/// use codepage_core::{CodePages, Config, ContentDirectory, EntryStatus, SiteSecret, View, ViewTarget};
/// use codepage_meta::InMemoryMetaStore;
/// use std::sync::Arc;
///
/// let pages = CodePages::new(
///     Config::default(),
///     Arc::new(InMemoryMetaStore::new()),
///     SiteSecret::generate(),
/// );
/// let entry = pages.directory().create("code_page", "Hello", 1).unwrap();
/// pages.directory().set_status(entry.id, EntryStatus::Published).unwrap();
///
/// let view = pages.view(ViewTarget::Entry(entry.id)).unwrap();
/// assert!(matches!(view, View::Page(_)));
/// ```
pub struct CodePages {
    config: Config,
    meta: Arc<dyn MetaStore>,
    directory: Arc<dyn ContentDirectory>,
    store: SnippetStore,
    renderer: PageRenderer,
    router: ViewRouter,
}

impl CodePages {
    /// Wires the pipeline with the default [`RolePolicy`].
    pub fn new(config: Config, meta: Arc<dyn MetaStore>, secret: SiteSecret) -> Self {
        Self::with_policy(config, meta, secret, Arc::new(RolePolicy))
    }

    /// Wires the pipeline with a custom access policy.
    pub fn with_policy(
        config: Config,
        meta: Arc<dyn MetaStore>,
        secret: SiteSecret,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        let directory: Arc<dyn ContentDirectory> = Arc::new(MetaDirectory::new(Arc::clone(&meta)));
        let tokens = Arc::new(EditTokens::new(secret, config.token_lifetime));

        let store = SnippetStore::new(
            Arc::clone(&meta),
            Arc::clone(&directory),
            tokens,
            policy,
            config.content_kind.clone(),
        );
        let renderer = PageRenderer::new(Arc::clone(&meta), Arc::clone(&directory), &config);
        let router = ViewRouter::new(Arc::clone(&directory), config.content_kind.clone());

        Self {
            config,
            meta,
            directory,
            store,
            renderer,
            router,
        }
    }

    /// Resolves a view and renders it if it is a published code page.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or metadata cannot be read.
    pub fn view(&self, target: ViewTarget) -> CoreResult<View> {
        match self.router.resolve(target)? {
            Resolution::CodePage(id) => Ok(View::Page(self.renderer.render(id)?)),
            Resolution::Default(target) => Ok(View::Default(target)),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the metadata store.
    pub fn meta(&self) -> &Arc<dyn MetaStore> {
        &self.meta
    }

    /// Returns the content directory.
    pub fn directory(&self) -> &dyn ContentDirectory {
        self.directory.as_ref()
    }

    /// Returns the snippet store.
    pub fn store(&self) -> &SnippetStore {
        &self.store
    }

    /// Returns the page renderer.
    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    /// Returns the view router.
    pub fn router(&self) -> &ViewRouter {
        &self.router
    }
}
