//! Request routing and endpoint handlers.

use crate::auth::{Session, SessionTokens, SESSION_COOKIE};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::form::EditSubmission;
use crate::http::{HttpRequest, HttpResponse, Method};
use crate::templates;
use codepage_core::{CodePages, EntityId, Entry, SaveContext, View, ViewTarget};
use std::sync::Arc;
use tracing::{debug, warn};

/// Context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// The code page pipeline (shared across all handlers).
    pub pages: Arc<CodePages>,
    /// Login session authority.
    pub sessions: SessionTokens,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, pages: Arc<CodePages>, sessions: SessionTokens) -> Self {
        Self {
            config,
            pages,
            sessions,
        }
    }

    /// Validates the session cookie of a request.
    fn session(&self, request: &HttpRequest) -> ServerResult<Session> {
        let token = request
            .cookie(SESSION_COOKIE)
            .ok_or_else(|| ServerError::Unauthenticated("no session cookie".into()))?;
        self.sessions.validate(token)
    }
}

/// Handler for HTTP requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Handles a request, turning errors into error pages.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        match self.route(request) {
            Ok(response) => response,
            Err(e) => self.error_response(request, &e),
        }
    }

    /// Dispatches a request to its endpoint.
    ///
    /// # Errors
    ///
    /// Returns the error the endpoint failed with.
    pub fn route(&self, request: &HttpRequest) -> ServerResult<HttpResponse> {
        let limit = self.context.config.max_body_bytes;
        if request.body.len() > limit {
            return Err(ServerError::PayloadTooLarge {
                size: request.body.len(),
                limit,
            });
        }

        let path = request.path();
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let reading = matches!(request.method, Method::Get | Method::Head);

        match segments.as_slice() {
            ["health"] if reading => Ok(HttpResponse::text(200, "OK\n")),
            ["edit", id] => {
                let id = parse_id(id)?;
                match request.method {
                    Method::Get | Method::Head => self.handle_edit_form(request, id),
                    Method::Post => self.handle_save(request, id),
                    Method::Other(ref name) => Err(ServerError::MethodNotAllowed(name.clone())),
                }
            }
            _ if !reading => Err(ServerError::MethodNotAllowed(format!("{:?}", request.method))),
            [""] => {
                let target = match request.query_param("p") {
                    Some(raw) => ViewTarget::Entry(parse_id(&raw)?),
                    None => ViewTarget::Home,
                };
                self.handle_view(target)
            }
            [prefix, slug] if *prefix == self.context.pages.config().url_slug => {
                self.handle_view(ViewTarget::Slug((*slug).to_string()))
            }
            _ => self.handle_view(ViewTarget::NotFound),
        }
    }

    /// Serves a page view: the code page document if routed, otherwise the
    /// fallback theme.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when nothing published matches, or a core error.
    pub fn handle_view(&self, target: ViewTarget) -> ServerResult<HttpResponse> {
        match self.context.pages.view(target)? {
            View::Page(document) => Ok(HttpResponse::html(200, document)),
            View::Default(target) => self.fallback(&target),
        }
    }

    /// Serves the edit form.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a valid session, `Forbidden` if the
    /// session may not edit the entry, `NotFound` for anything that is not a
    /// managed code page.
    pub fn handle_edit_form(&self, request: &HttpRequest, id: EntityId) -> ServerResult<HttpResponse> {
        let session = self.context.session(request)?;
        let store = self.context.pages.store();

        if store.editable_entry(id, &session.principal)?.is_none() {
            return Err(ServerError::Forbidden(format!(
                "user {} may not edit entry {id}",
                session.principal.user_id
            )));
        }

        let snippet = store.load(id)?;
        let nonce = store.issue_token(id, &session.principal, &session.id);
        let form = templates::edit_form(&snippet, &nonce, &edit_path(id));
        Ok(HttpResponse::html(200, form))
    }

    /// Accepts an edit form submission.
    ///
    /// The save itself is fail-silent: whatever the outcome, the response
    /// redirects back to the edit form.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a valid session.
    pub fn handle_save(&self, request: &HttpRequest, id: EntityId) -> ServerResult<HttpResponse> {
        let session = self.context.session(request)?;
        let submission = EditSubmission::parse(&request.body);

        let mut ctx = SaveContext::new(session.principal, session.id, submission.nonce);
        if submission.autosave {
            ctx = ctx.autosave();
        }
        self.context.pages.store().save(id, &submission.request, &ctx);

        Ok(HttpResponse::see_other(edit_path(id)))
    }

    /// Default template resolution for everything the renderer does not own.
    fn fallback(&self, target: &ViewTarget) -> ServerResult<HttpResponse> {
        let site_name = &self.context.config.site_name;

        if *target == ViewTarget::Home {
            let entries = self.context.pages.directory().entries()?;
            let links: Vec<(String, &Entry)> = entries
                .iter()
                .filter(|entry| entry.status.is_published())
                .map(|entry| (self.permalink(entry), entry))
                .collect();
            return Ok(HttpResponse::html(200, templates::home_page(site_name, &links)));
        }

        match self.context.pages.router().lookup(target)? {
            Some(entry) if entry.status.is_published() => {
                debug!(id = %entry.id, kind = %entry.kind, "themed view");
                Ok(HttpResponse::html(200, templates::entry_page(site_name, &entry)))
            }
            _ => Err(ServerError::NotFound(format!("{target:?}"))),
        }
    }

    /// Public URL of an entry.
    fn permalink(&self, entry: &Entry) -> String {
        let config = self.context.pages.config();
        if entry.kind == config.content_kind {
            format!("/{}/{}", config.url_slug, entry.slug())
        } else {
            format!("/?p={}", entry.id)
        }
    }

    fn error_response(&self, request: &HttpRequest, error: &ServerError) -> HttpResponse {
        let status = error.status_code();
        if error.is_server_error() {
            warn!(url = %request.url, %error, "request failed");
        } else {
            debug!(url = %request.url, status, %error, "request rejected");
        }

        match error {
            ServerError::NotFound(_) | ServerError::Core(_) if status == 404 => {
                HttpResponse::html(404, templates::not_found_page(&self.context.config.site_name))
            }
            _ if error.is_server_error() => HttpResponse::text(status, "internal error\n"),
            _ => HttpResponse::text(status, format!("{error}\n")),
        }
    }
}

fn parse_id(raw: &str) -> ServerResult<EntityId> {
    raw.parse()
        .map_err(|_| ServerError::NotFound(format!("invalid entry id {raw:?}")))
}

fn edit_path(id: EntityId) -> String {
    format!("/edit/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use codepage_core::{Config, ContentDirectory, EntryStatus, Principal, Role, SiteSecret};
    use codepage_meta::InMemoryMetaStore;

    fn create_handler() -> (RequestHandler, Arc<HandlerContext>) {
        let secret = SiteSecret::new(b"handler-tests".to_vec()).unwrap();
        let pages = Arc::new(CodePages::new(
            Config::default(),
            Arc::new(InMemoryMetaStore::new()),
            secret.clone(),
        ));
        let sessions = SessionTokens::new(AuthConfig::new(secret));
        let context = Arc::new(HandlerContext::new(ServerConfig::default(), pages, sessions));
        (RequestHandler::new(Arc::clone(&context)), context)
    }

    fn login(context: &HandlerContext, role: Role) -> String {
        context.sessions.create_token(&Principal::new(1, role))
    }

    #[test]
    fn health() {
        let (handler, _) = create_handler();
        let response = handler.handle(&HttpRequest::get("/health"));
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "OK\n");
    }

    #[test]
    fn unknown_path_is_not_found() {
        let (handler, _) = create_handler();
        let response = handler.handle(&HttpRequest::get("/nothing/here/at/all"));
        assert_eq!(response.status, 404);
        assert!(response.body.contains("Not Found"));
    }

    #[test]
    fn invalid_query_id_is_not_found() {
        let (handler, _) = create_handler();
        assert_eq!(handler.handle(&HttpRequest::get("/?p=abc")).status, 404);
    }

    #[test]
    fn edit_requires_session() {
        let (handler, context) = create_handler();
        let entry = context.pages.directory().create("code_page", "Page", 1).unwrap();

        let response = handler.handle(&HttpRequest::get(edit_path(entry.id)));
        assert_eq!(response.status, 401);
    }

    #[test]
    fn subscriber_is_forbidden() {
        let (handler, context) = create_handler();
        let entry = context.pages.directory().create("code_page", "Page", 1).unwrap();
        let cookie = login(&context, Role::Subscriber);

        let request = HttpRequest::get(edit_path(entry.id)).with_cookie(SESSION_COOKIE, &cookie);
        assert_eq!(handler.handle(&request).status, 403);
    }

    #[test]
    fn edit_form_for_other_kind_is_not_found() {
        let (handler, context) = create_handler();
        let entry = context.pages.directory().create("post", "Post", 1).unwrap();
        let cookie = login(&context, Role::Administrator);

        let request = HttpRequest::get(edit_path(entry.id)).with_cookie(SESSION_COOKIE, &cookie);
        assert_eq!(handler.handle(&request).status, 404);
    }

    #[test]
    fn save_redirects_back() {
        let (handler, context) = create_handler();
        let entry = context.pages.directory().create("code_page", "Page", 1).unwrap();
        let cookie = login(&context, Role::Editor);

        let request = HttpRequest::post_form(edit_path(entry.id), "html_code=x")
            .with_cookie(SESSION_COOKIE, &cookie);
        let response = handler.handle(&request);
        assert_eq!(response.status, 303);
        assert_eq!(response.header("location"), Some("/edit/1"));
    }

    #[test]
    fn oversized_body_is_rejected() {
        let (handler, context) = create_handler();
        let limit = context.config.max_body_bytes;
        let request = HttpRequest::post_form("/edit/1", vec![b'a'; limit + 1]);
        assert_eq!(handler.handle(&request).status, 413);
    }

    #[test]
    fn post_to_view_is_not_allowed() {
        let (handler, _) = create_handler();
        let request = HttpRequest::post_form("/", "x=1");
        assert_eq!(handler.handle(&request).status, 405);
    }

    #[test]
    fn published_post_gets_theme() {
        let (handler, context) = create_handler();
        let directory = context.pages.directory();
        let entry = directory.create("post", "News", 1).unwrap();
        directory.set_status(entry.id, EntryStatus::Published).unwrap();

        let response = handler.handle(&HttpRequest::get(format!("/?p={}", entry.id)));
        assert_eq!(response.status, 200);
        assert!(response.body.contains("<header><a href=\"/\">Codepage</a></header>"));
    }
}
