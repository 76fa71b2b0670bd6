//! Test fixtures and site helpers.
//!
//! Provides a fully wired site and helpers that drive the HTTP surface the
//! way a browser session would.

use codepage_core::{
    CodeField, CodePages, Config, ContentDirectory, EntityId, EntryStatus, Principal, Role,
    SiteSecret, CODE_PAGE_KIND,
};
use codepage_meta::{FileMetaStore, InMemoryMetaStore, MetaStore};
use codepage_server::{
    encode_form, CodepageServer, HttpRequest, HttpResponse, ServerConfig, NONCE_FIELD,
    SESSION_COOKIE,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// User id every helper logs in as unless told otherwise.
pub const TEST_USER: u64 = 1;

/// A test site with automatic cleanup.
pub struct TestSite {
    /// The server under test.
    pub server: CodepageServer,
    /// The metadata store behind the site.
    pub meta: Arc<dyn MetaStore>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestSite {
    /// Creates a site over an in-memory store.
    pub fn memory() -> Self {
        Self::build(
            Config::default(),
            ServerConfig::default(),
            Arc::new(InMemoryMetaStore::new()),
            None,
        )
    }

    /// Creates a site over a file store in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileMetaStore::open(&temp_dir.path().join("meta.jsonl"))
            .expect("Failed to open file store");
        Self::build(
            Config::default(),
            ServerConfig::default(),
            Arc::new(store),
            Some(temp_dir),
        )
    }

    /// Creates an in-memory site with custom configuration.
    pub fn with_config(config: Config, server_config: ServerConfig) -> Self {
        Self::build(config, server_config, Arc::new(InMemoryMetaStore::new()), None)
    }

    fn build(
        config: Config,
        server_config: ServerConfig,
        meta: Arc<dyn MetaStore>,
        temp_dir: Option<TempDir>,
    ) -> Self {
        let secret = test_secret();
        let pages = CodePages::new(config, Arc::clone(&meta), secret.clone());
        let server = CodepageServer::new(server_config, Arc::new(pages), secret);
        Self {
            server,
            meta,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the metadata log path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("meta.jsonl"))
    }

    /// Returns the code page pipeline.
    pub fn pages(&self) -> &CodePages {
        self.server.pages()
    }

    /// Creates a draft code page authored by [`TEST_USER`].
    pub fn page(&self, title: &str) -> EntityId {
        self.pages()
            .directory()
            .create(&self.pages().config().content_kind, title, TEST_USER)
            .expect("Failed to create entry")
            .id
    }

    /// Creates a published code page authored by [`TEST_USER`].
    pub fn published_page(&self, title: &str) -> EntityId {
        let id = self.page(title);
        self.set_status(id, EntryStatus::Published);
        id
    }

    /// Creates an entry of another kind.
    pub fn entry_of_kind(&self, kind: &str, title: &str, status: EntryStatus) -> EntityId {
        let directory = self.pages().directory();
        let entry = directory
            .create(kind, title, TEST_USER)
            .expect("Failed to create entry");
        directory
            .set_status(entry.id, status)
            .expect("Failed to set status");
        entry.id
    }

    /// Changes an entry's status.
    pub fn set_status(&self, id: EntityId, status: EntryStatus) {
        self.pages()
            .directory()
            .set_status(id, status)
            .expect("Failed to set status");
    }

    /// Issues a session cookie value for [`TEST_USER`] with `role`.
    pub fn login(&self, role: Role) -> String {
        self.login_as(Principal::new(TEST_USER, role))
    }

    /// Issues a session cookie value for `principal`.
    pub fn login_as(&self, principal: Principal) -> String {
        self.server.login(&principal)
    }

    /// Sends an anonymous `GET`.
    pub fn get(&self, url: &str) -> HttpResponse {
        self.server.handle(&HttpRequest::get(url))
    }

    /// Sends a `GET` with a session cookie.
    pub fn get_as(&self, url: &str, cookie: &str) -> HttpResponse {
        self.server
            .handle(&HttpRequest::get(url).with_cookie(SESSION_COOKIE, cookie))
    }

    /// Loads the edit form of `id` and returns the edit token it carries.
    pub fn nonce(&self, id: EntityId, cookie: &str) -> String {
        let form = self.get_as(&format!("/edit/{id}"), cookie);
        assert_eq!(form.status, 200, "edit form not served: {}", form.body);
        form_nonce(&form.body).expect("edit form has no nonce")
    }

    /// Posts `pairs` to the edit endpoint exactly as given.
    pub fn post(&self, id: EntityId, cookie: &str, pairs: &[(&str, &str)]) -> HttpResponse {
        let body = encode_form(pairs.iter().copied());
        self.server.handle(
            &HttpRequest::post_form(format!("/edit/{id}"), body).with_cookie(SESSION_COOKIE, cookie),
        )
    }

    /// Loads the edit form, then posts `pairs` with its edit token.
    pub fn submit(&self, id: EntityId, cookie: &str, pairs: &[(&str, &str)]) -> HttpResponse {
        let nonce = self.nonce(id, cookie);
        let mut all = pairs.to_vec();
        all.push((NONCE_FIELD, nonce.as_str()));
        self.post(id, cookie, &all)
    }

    /// Reads a stored code field directly from the metadata store.
    pub fn stored(&self, id: EntityId, field: CodeField) -> Option<String> {
        self.meta
            .get(id, field.meta_key())
            .expect("Failed to read metadata")
    }
}

impl std::ops::Deref for TestSite {
    type Target = CodepageServer;

    fn deref(&self) -> &Self::Target {
        &self.server
    }
}

/// The fixed secret test sites sign with.
pub fn test_secret() -> SiteSecret {
    SiteSecret::new(b"codepage-testkit-secret".to_vec()).expect("secret is not empty")
}

/// Extracts the edit token from an edit form page.
pub fn form_nonce(page: &str) -> Option<String> {
    let marker = format!("name=\"{NONCE_FIELD}\" value=\"");
    let start = page.find(&marker)? + marker.len();
    let end = page[start..].find('"')? + start;
    Some(page[start..end].to_string())
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a site with `count` published code pages titled `Page {n}`.
    pub fn populated_site(count: usize) -> (TestSite, Vec<EntityId>) {
        let site = TestSite::memory();
        let ids = (0..count)
            .map(|n| site.published_page(&format!("Page {n}")))
            .collect();
        (site, ids)
    }

    /// Creates a site whose page 42 is a published code page, the id
    /// assigned by the host rather than the directory.
    pub fn site_with_page_42() -> (TestSite, EntityId) {
        let site = TestSite::memory();
        let entry = codepage_core::Entry {
            id: EntityId::new(42),
            kind: CODE_PAGE_KIND.to_string(),
            title: "Forty-Two".to_string(),
            status: EntryStatus::Published,
            author: TEST_USER,
        };
        site.pages()
            .directory()
            .insert(&entry)
            .expect("Failed to insert entry");
        (site, entry.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_site_serves_health() {
        let site = TestSite::memory();
        assert_eq!(site.get("/health").status, 200);
        assert!(site.path().is_none());
    }

    #[test]
    fn file_site_has_path() {
        let site = TestSite::file();
        site.page("Persisted");
        assert!(site.path().unwrap().exists());
    }

    #[test]
    fn submit_round_trip() {
        let site = TestSite::memory();
        let id = site.page("Draft");
        let cookie = site.login(Role::Editor);

        let response = site.submit(id, &cookie, &[("js_code", "alert(1)")]);
        assert_eq!(response.status, 303);
        assert_eq!(site.stored(id, CodeField::Js).as_deref(), Some("alert(1)"));
    }

    #[test]
    fn nonce_extraction() {
        let page = r#"<input type="hidden" name="codepage_nonce" value="0123abcd">"#;
        assert_eq!(form_nonce(page).as_deref(), Some("0123abcd"));
        assert_eq!(form_nonce("<form></form>"), None);
    }

    #[test]
    fn populated_scenario() {
        let (site, ids) = scenarios::populated_site(3);
        assert_eq!(ids.len(), 3);
        assert_eq!(site.get("/p/page-1").status, 200);
    }
}
