//! The HTTP server: a `tiny_http` loop in front of [`RequestHandler`].

use crate::auth::{AuthConfig, Session, SessionTokens};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use crate::http::{HttpRequest, HttpResponse, Method};
use codepage_core::{CodePages, Principal, SiteSecret};
use std::io::{self, Read};
use std::sync::Arc;
use tiny_http::{Header, Response, Server};
use tracing::{info, warn};

/// The Codepage HTTP server.
///
/// Requests are handled one at a time, in arrival order.
///
/// # Example
///
/// ```
/// use codepage_core::{CodePages, Config, SiteSecret};
/// use codepage_meta::InMemoryMetaStore;
/// use codepage_server::{CodepageServer, HttpRequest, ServerConfig};
/// use std::sync::Arc;
///
/// let secret = SiteSecret::generate();
/// let pages = CodePages::new(Config::default(), Arc::new(InMemoryMetaStore::new()), secret.clone());
/// let server = CodepageServer::new(ServerConfig::default(), Arc::new(pages), secret);
///
/// let response = server.handle(&HttpRequest::get("/health"));
/// assert_eq!(response.status, 200);
///
/// // In a real application you would call server.serve()
/// ```
pub struct CodepageServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl CodepageServer {
    /// Creates a server; sessions are signed with `secret`.
    pub fn new(config: ServerConfig, pages: Arc<CodePages>, secret: SiteSecret) -> Self {
        let sessions =
            SessionTokens::new(AuthConfig::new(secret).with_expiry(config.session_expiry));
        let context = Arc::new(HandlerContext::new(config, pages, sessions));
        let handler = RequestHandler::new(Arc::clone(&context));

        Self { handler, context }
    }

    /// Handles one request without touching the network.
    pub fn handle(&self, request: &HttpRequest) -> HttpResponse {
        self.handler.handle(request)
    }

    /// Issues a session token for `principal`, for the session cookie.
    pub fn login(&self, principal: &Principal) -> String {
        self.context.sessions.create_token(principal)
    }

    /// Validates a session token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if the token is malformed, forged or expired.
    pub fn session(&self, token: &str) -> ServerResult<Session> {
        self.context.sessions.validate(token)
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.context.config
    }

    /// Returns the code page pipeline.
    pub fn pages(&self) -> &Arc<CodePages> {
        &self.context.pages
    }

    /// Binds the configured address.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the address cannot be bound.
    pub fn bind(&self) -> ServerResult<Server> {
        let addr = self.context.config.bind_addr;
        let listener = Server::http(addr).map_err(io::Error::other)?;
        info!(%addr, "listening");
        Ok(listener)
    }

    /// Binds the configured address and serves forever.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or the listener fails.
    pub fn serve(&self) -> ServerResult<()> {
        let listener = self.bind()?;
        loop {
            if let Err(e) = self.serve_one(&listener) {
                warn!(error = %e, "http error");
            }
        }
    }

    /// Receives one request from `listener` and answers it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if receiving or responding fails.
    pub fn serve_one(&self, listener: &Server) -> ServerResult<()> {
        let mut rq = listener.recv()?;

        let response = match self.read_request(&mut rq) {
            Ok(request) => self.handle(&request),
            Err(e) => HttpResponse::text(e.status_code(), format!("{e}\n")),
        };
        rq.respond(to_tiny(response))?;
        Ok(())
    }

    fn read_request(&self, rq: &mut tiny_http::Request) -> ServerResult<HttpRequest> {
        let limit = self.context.config.max_body_bytes;
        if let Some(size) = rq.body_length().filter(|size| *size > limit) {
            return Err(ServerError::PayloadTooLarge { size, limit });
        }

        let mut body = Vec::new();
        rq.as_reader()
            .take(limit as u64 + 1)
            .read_to_end(&mut body)?;
        if body.len() > limit {
            return Err(ServerError::PayloadTooLarge {
                size: body.len(),
                limit,
            });
        }

        let headers = rq
            .headers()
            .iter()
            .map(|h| (h.field.as_str().as_str().to_string(), h.value.as_str().to_string()))
            .collect();

        Ok(HttpRequest {
            method: Method::parse(rq.method().as_str()),
            url: rq.url().to_string(),
            headers,
            body,
        })
    }
}

fn to_tiny(response: HttpResponse) -> Response<io::Cursor<Vec<u8>>> {
    let mut resp = Response::from_data(response.body.into_bytes()).with_status_code(response.status);
    for (name, value) in &response.headers {
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            resp.add_header(header);
        }
    }
    resp
}
