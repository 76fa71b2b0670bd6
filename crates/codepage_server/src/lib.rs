//! # Codepage Server
//!
//! HTTP surface for Codepage.
//!
//! This crate provides:
//! - Public page views (code pages through the renderer, everything else
//!   through a small fallback theme)
//! - The edit form and its save endpoint
//! - Signed login sessions (HMAC-SHA256 tokens in a cookie)
//! - A single-threaded `tiny_http` serve loop
//!
//! # Routes
//!
//! | method | path            | response                                  |
//! |--------|-----------------|-------------------------------------------|
//! | GET    | `/health`       | `200 OK`                                  |
//! | GET    | `/`             | home page, or `?p={id}` entry view        |
//! | GET    | `/{slug}/{x}`   | entry view by slug (`slug` is configured) |
//! | GET    | `/edit/{id}`    | edit form (session required)              |
//! | POST   | `/edit/{id}`    | save, then `303` back to the form         |
//!
//! # Authentication
//!
//! ```rust,ignore
//! use codepage_server::{AuthConfig, SessionTokens};
//!
//! let sessions = SessionTokens::new(AuthConfig::new(secret));
//! let cookie = sessions.create_token(&Principal::new(1, Role::Editor));
//! // send as `Cookie: codepage_session={cookie}`
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod error;
mod form;
mod handler;
mod http;
mod server;
mod templates;

pub use auth::{AuthConfig, Session, SessionTokens, SESSION_COOKIE};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use form::{encode_form, EditSubmission, AUTOSAVE_FIELD, NONCE_FIELD};
pub use handler::{HandlerContext, RequestHandler};
pub use http::{HttpRequest, HttpResponse, Method};
pub use server::CodepageServer;
