//! Snippet store: the save contract for code fields.
//!
//! `save` is fail-silent. A request that misses any precondition (valid edit
//! token, not an autosave pass, edit permission on a managed entry) leaves
//! the stored fields untouched and reports nothing to the caller. The reason
//! is only logged.

use crate::access::{AccessPolicy, Principal};
use crate::directory::{ContentDirectory, Entry};
use crate::error::{CoreError, CoreResult};
use crate::snippet::{CodeField, SaveRequest, Snippet};
use crate::token::{EditTokens, TokenRejection};
use codepage_meta::{EntityId, MetaStore};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything about a save request that is not the payload.
#[derive(Debug, Clone)]
pub struct SaveContext {
    /// The user submitting the request.
    pub principal: Principal,
    /// Login session the edit form was served in.
    pub session: String,
    /// Edit token echoed back by the form.
    pub token: Option<String>,
    /// True for automated background saves.
    pub autosave: bool,
}

impl SaveContext {
    /// Creates an explicit (non-autosave) save context.
    pub fn new(principal: Principal, session: impl Into<String>, token: Option<String>) -> Self {
        Self {
            principal,
            session: session.into(),
            token,
            autosave: false,
        }
    }

    /// Marks the request as an autosave pass.
    #[must_use]
    pub fn autosave(mut self) -> Self {
        self.autosave = true;
        self
    }
}

#[derive(Debug)]
enum Rejection {
    Token(TokenRejection),
    Autosave,
    UnknownEntry,
    WrongKind,
    Forbidden,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Token(reason) => write!(f, "{reason}"),
            Rejection::Autosave => f.write_str("autosave"),
            Rejection::UnknownEntry => f.write_str("unknown entry"),
            Rejection::WrongKind => f.write_str("not a code page"),
            Rejection::Forbidden => f.write_str("forbidden"),
        }
    }
}

/// Reads a snippet: directory entry plus stored fields, missing ones empty.
pub(crate) fn load_snippet(
    meta: &dyn MetaStore,
    directory: &dyn ContentDirectory,
    id: EntityId,
) -> CoreResult<Snippet> {
    let entry = directory.entry(id)?.ok_or(CoreError::EntityNotFound(id))?;
    let read = |field: CodeField| -> CoreResult<String> {
        Ok(meta.get(id, field.meta_key())?.unwrap_or_default())
    };

    Ok(Snippet {
        html_code: read(CodeField::Html)?,
        css_code: read(CodeField::Css)?,
        js_code: read(CodeField::Js)?,
        entry,
    })
}

/// Validates and persists code fields.
pub struct SnippetStore {
    meta: Arc<dyn MetaStore>,
    directory: Arc<dyn ContentDirectory>,
    tokens: Arc<EditTokens>,
    policy: Arc<dyn AccessPolicy>,
    kind: String,
}

impl SnippetStore {
    /// Creates a store for entries of content kind `kind`.
    pub fn new(
        meta: Arc<dyn MetaStore>,
        directory: Arc<dyn ContentDirectory>,
        tokens: Arc<EditTokens>,
        policy: Arc<dyn AccessPolicy>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            meta,
            directory,
            tokens,
            policy,
            kind: kind.into(),
        }
    }

    /// Saves the submitted fields of `request` onto `id`.
    ///
    /// Fields absent from the request keep their stored value. Values are
    /// stored exactly as submitted. Nothing is written, and nothing is
    /// reported, unless the token is valid for this entry and session, the
    /// request is not an autosave pass, and the principal may edit the entry.
    pub fn save(&self, id: EntityId, request: &SaveRequest, ctx: &SaveContext) {
        if let Err(rejection) = self.admit(id, ctx) {
            debug!(%id, user = ctx.principal.user_id, %rejection, "save ignored");
            return;
        }

        let mut written = Vec::new();
        for (field, value) in request.fields() {
            if let Err(e) = self.meta.set(id, field.meta_key(), value) {
                warn!(%id, %field, error = %e, "failed to persist code field");
                return;
            }
            written.push(field);
        }

        info!(%id, user = ctx.principal.user_id, fields = ?written, "snippet saved");
    }

    /// Issues the edit token the form for `id` must echo back.
    pub fn issue_token(&self, id: EntityId, principal: &Principal, session: &str) -> String {
        self.tokens.issue(id, principal.user_id, session)
    }

    /// Returns the entry if `principal` may edit it through this store.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` or `WrongKind` when the entry is not a
    /// managed code page, or a metadata error.
    pub fn editable_entry(&self, id: EntityId, principal: &Principal) -> CoreResult<Option<Entry>> {
        let entry = self.managed_entry(id)?;
        Ok(self.policy.can_edit(principal, &entry).then_some(entry))
    }

    /// Loads a snippet with its stored (still escaped) fields.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the directory has no such entry, or a
    /// metadata error.
    pub fn load(&self, id: EntityId) -> CoreResult<Snippet> {
        load_snippet(self.meta.as_ref(), self.directory.as_ref(), id)
    }

    fn managed_entry(&self, id: EntityId) -> CoreResult<Entry> {
        let entry = self
            .directory
            .entry(id)?
            .ok_or(CoreError::EntityNotFound(id))?;
        if entry.kind != self.kind {
            return Err(CoreError::WrongKind {
                id,
                kind: entry.kind,
            });
        }
        Ok(entry)
    }

    fn admit(&self, id: EntityId, ctx: &SaveContext) -> Result<(), Rejection> {
        self.tokens
            .verify(ctx.token.as_deref(), id, ctx.principal.user_id, &ctx.session)
            .map_err(Rejection::Token)?;

        if ctx.autosave {
            return Err(Rejection::Autosave);
        }

        let entry = match self.managed_entry(id) {
            Ok(entry) => entry,
            Err(CoreError::WrongKind { .. }) => return Err(Rejection::WrongKind),
            Err(_) => return Err(Rejection::UnknownEntry),
        };
        if !self.policy.can_edit(&ctx.principal, &entry) {
            return Err(Rejection::Forbidden);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Role, RolePolicy};
    use crate::config::CODE_PAGE_KIND;
    use crate::directory::MetaDirectory;
    use crate::token::SiteSecret;
    use codepage_meta::InMemoryMetaStore;
    use std::time::Duration;

    struct Fixture {
        meta: Arc<InMemoryMetaStore>,
        directory: Arc<MetaDirectory>,
        store: SnippetStore,
    }

    fn fixture() -> Fixture {
        let meta = Arc::new(InMemoryMetaStore::new());
        let directory = Arc::new(MetaDirectory::new(meta.clone()));
        let tokens = Arc::new(EditTokens::new(
            SiteSecret::new(b"store-tests".to_vec()).unwrap(),
            Duration::from_secs(86_400),
        ));
        let store = SnippetStore::new(
            meta.clone(),
            directory.clone(),
            tokens,
            Arc::new(RolePolicy),
            CODE_PAGE_KIND,
        );
        Fixture {
            meta,
            directory,
            store,
        }
    }

    fn editor() -> Principal {
        Principal::new(1, Role::Editor)
    }

    fn valid_ctx(f: &Fixture, id: EntityId, principal: Principal) -> SaveContext {
        let token = f.store.issue_token(id, &principal, "sess");
        SaveContext::new(principal, "sess", Some(token))
    }

    #[test]
    fn save_writes_submitted_fields() {
        let f = fixture();
        let entry = f.directory.create(CODE_PAGE_KIND, "Page", 1).unwrap();
        let ctx = valid_ctx(&f, entry.id, editor());

        f.store.save(
            entry.id,
            &SaveRequest::new().with_html("<p>x</p>").with_css("p{}"),
            &ctx,
        );

        let snippet = f.store.load(entry.id).unwrap();
        assert_eq!(snippet.html_code, "<p>x</p>");
        assert_eq!(snippet.css_code, "p{}");
        assert_eq!(snippet.js_code, "");
    }

    #[test]
    fn save_can_clear_a_field() {
        let f = fixture();
        let entry = f.directory.create(CODE_PAGE_KIND, "Page", 1).unwrap();
        let ctx = valid_ctx(&f, entry.id, editor());

        f.store.save(entry.id, &SaveRequest::new().with_js("alert(1)"), &ctx);
        f.store.save(entry.id, &SaveRequest::new().with_js(""), &ctx);

        assert_eq!(f.meta.get(entry.id, "_js_code").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn save_ignores_wrong_kind() {
        let f = fixture();
        let entry = f.directory.create("post", "Blog", 1).unwrap();
        let ctx = valid_ctx(&f, entry.id, editor());

        f.store.save(entry.id, &SaveRequest::new().with_html("x"), &ctx);
        assert_eq!(f.meta.get(entry.id, "_html_code").unwrap(), None);
    }

    #[test]
    fn save_ignores_unknown_entry() {
        let f = fixture();
        let id = EntityId::new(77);
        let ctx = valid_ctx(&f, id, editor());

        f.store.save(id, &SaveRequest::new().with_html("x"), &ctx);
        assert!(f.meta.is_empty());
    }

    #[test]
    fn save_ignores_forbidden_author() {
        let f = fixture();
        let entry = f.directory.create(CODE_PAGE_KIND, "Theirs", 5).unwrap();
        let ctx = valid_ctx(&f, entry.id, Principal::new(6, Role::Author));

        f.store.save(entry.id, &SaveRequest::new().with_html("x"), &ctx);
        assert_eq!(f.meta.get(entry.id, "_html_code").unwrap(), None);
    }

    #[test]
    fn author_saves_own_entry() {
        let f = fixture();
        let entry = f.directory.create(CODE_PAGE_KIND, "Mine", 5).unwrap();
        let ctx = valid_ctx(&f, entry.id, Principal::new(5, Role::Author));

        f.store.save(entry.id, &SaveRequest::new().with_html("mine"), &ctx);
        assert_eq!(
            f.meta.get(entry.id, "_html_code").unwrap().as_deref(),
            Some("mine")
        );
    }

    #[test]
    fn editable_entry_applies_policy() {
        let f = fixture();
        let entry = f.directory.create(CODE_PAGE_KIND, "Mine", 5).unwrap();

        assert!(f.store.editable_entry(entry.id, &editor()).unwrap().is_some());
        assert!(f
            .store
            .editable_entry(entry.id, &Principal::new(9, Role::Subscriber))
            .unwrap()
            .is_none());
        assert!(matches!(
            f.store.editable_entry(EntityId::new(99), &editor()),
            Err(CoreError::EntityNotFound(_))
        ));
    }

    #[test]
    fn load_missing_entry_fails() {
        let f = fixture();
        assert!(matches!(
            f.store.load(EntityId::new(3)),
            Err(CoreError::EntityNotFound(_))
        ));
    }
}
