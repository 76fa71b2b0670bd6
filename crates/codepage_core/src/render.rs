//! Page renderer: turns a snippet into a standalone HTML document.
//!
//! # Trust boundary
//!
//! The three code fields are written into the document **verbatim**. No
//! encoding, escaping or sanitization is applied to them; whoever can edit a
//! code page can run script on the site. Only the title, which is not code,
//! is HTML-escaped.
//!
//! One layer of transport backslash escaping is removed from the HTML and
//! JavaScript fields before output. The CSS field is emitted as stored,
//! without that reversal. Stylesheets containing quotes or backslashes will
//! therefore carry the transport escapes; this matches the established
//! output and must not change without product sign-off.

use crate::config::Config;
use crate::directory::ContentDirectory;
use crate::error::CoreResult;
use crate::slashes::strip_slashes;
use crate::snippet::Snippet;
use crate::store::load_snippet;
use codepage_meta::{EntityId, MetaStore};
use std::fmt::Write;
use std::sync::Arc;

/// Renders code pages, replacing the site layout entirely.
pub struct PageRenderer {
    meta: Arc<dyn MetaStore>,
    directory: Arc<dyn ContentDirectory>,
    language: String,
    charset: String,
}

impl PageRenderer {
    /// Creates a renderer reading from `meta` and `directory`.
    pub fn new(meta: Arc<dyn MetaStore>, directory: Arc<dyn ContentDirectory>, config: &Config) -> Self {
        Self {
            meta,
            directory,
            language: config.language.clone(),
            charset: config.charset.clone(),
        }
    }

    /// Renders the document for `id`. Never mutates the entry.
    ///
    /// Fields that were never saved render as empty.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the directory has no such entry, or a
    /// metadata error if the fields cannot be read.
    pub fn render(&self, id: EntityId) -> CoreResult<String> {
        let snippet = load_snippet(self.meta.as_ref(), self.directory.as_ref(), id)?;
        Ok(self.render_snippet(&snippet))
    }

    /// Renders an already loaded snippet.
    #[must_use]
    pub fn render_snippet(&self, snippet: &Snippet) -> String {
        let html = strip_slashes(&snippet.html_code);
        let js = strip_slashes(&snippet.js_code);
        let css = &snippet.css_code;

        let mut doc = String::with_capacity(256 + html.len() + css.len() + js.len());
        // Writing to a String cannot fail.
        let _ = write!(
            doc,
            "<!DOCTYPE html>\n\
             <html lang=\"{lang}\">\n\
             <head>\n\
             \x20   <meta charset=\"{charset}\">\n\
             \x20   <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             \x20   <title>{title}</title>\n",
            lang = escape_html(&self.language),
            charset = escape_html(&self.charset),
            title = escape_html(&snippet.entry.title),
        );
        if !css.is_empty() {
            let _ = writeln!(doc, "    <style type=\"text/css\">{css}</style>");
        }
        doc.push_str("</head>\n<body>\n");
        doc.push_str(&html);
        doc.push('\n');
        if !js.is_empty() {
            let _ = writeln!(doc, "<script type=\"text/javascript\">{js}</script>");
        }
        doc.push_str("</body>\n</html>\n");
        doc
    }
}

/// Escapes text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
