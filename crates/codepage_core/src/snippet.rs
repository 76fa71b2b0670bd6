//! The snippet entity: three code fields attached to a directory entry.

use crate::directory::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three code fields of a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeField {
    /// Body markup.
    Html,
    /// Stylesheet for the document head.
    Css,
    /// Script appended to the body.
    Js,
}

impl CodeField {
    /// All fields, in document order.
    pub const ALL: [CodeField; 3] = [CodeField::Html, CodeField::Css, CodeField::Js];

    /// Metadata key the field is stored under.
    #[must_use]
    pub const fn meta_key(&self) -> &'static str {
        match self {
            CodeField::Html => "_html_code",
            CodeField::Css => "_css_code",
            CodeField::Js => "_js_code",
        }
    }

    /// Name of the form input carrying the field.
    #[must_use]
    pub const fn form_key(&self) -> &'static str {
        match self {
            CodeField::Html => "html_code",
            CodeField::Css => "css_code",
            CodeField::Js => "js_code",
        }
    }

    /// Looks a field up by form input name.
    #[must_use]
    pub fn from_form_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.form_key() == key)
    }
}

impl fmt::Display for CodeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodeField::Html => "html",
            CodeField::Css => "css",
            CodeField::Js => "js",
        })
    }
}

/// A code page with its stored fields.
///
/// Field values are as stored: still carrying the transport's backslash
/// escaping. Missing fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// The directory entry.
    pub entry: Entry,
    /// Stored HTML.
    pub html_code: String,
    /// Stored CSS.
    pub css_code: String,
    /// Stored JavaScript.
    pub js_code: String,
}

impl Snippet {
    /// Returns the stored value of `field`.
    #[must_use]
    pub fn field(&self, field: CodeField) -> &str {
        match field {
            CodeField::Html => &self.html_code,
            CodeField::Css => &self.css_code,
            CodeField::Js => &self.js_code,
        }
    }
}

/// A partial update of the code fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveRequest {
    /// New HTML, if submitted.
    pub html: Option<String>,
    /// New CSS, if submitted.
    pub css: Option<String>,
    /// New JavaScript, if submitted.
    pub js: Option<String>,
}

impl SaveRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTML field.
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Sets the CSS field.
    #[must_use]
    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    /// Sets the JavaScript field.
    #[must_use]
    pub fn with_js(mut self, js: impl Into<String>) -> Self {
        self.js = Some(js.into());
        self
    }

    /// Sets `field` to `value`.
    pub fn set(&mut self, field: CodeField, value: String) {
        match field {
            CodeField::Html => self.html = Some(value),
            CodeField::Css => self.css = Some(value),
            CodeField::Js => self.js = Some(value),
        }
    }

    /// Returns the submitted value of `field`, if any.
    #[must_use]
    pub fn get(&self, field: CodeField) -> Option<&str> {
        match field {
            CodeField::Html => self.html.as_deref(),
            CodeField::Css => self.css.as_deref(),
            CodeField::Js => self.js.as_deref(),
        }
    }

    /// Iterates over the submitted fields.
    pub fn fields(&self) -> impl Iterator<Item = (CodeField, &str)> + '_ {
        CodeField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field, value)))
    }

    /// Returns true if no field was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_stored_layout() {
        assert_eq!(CodeField::Html.meta_key(), "_html_code");
        assert_eq!(CodeField::Css.meta_key(), "_css_code");
        assert_eq!(CodeField::Js.meta_key(), "_js_code");
        assert_eq!(CodeField::from_form_key("css_code"), Some(CodeField::Css));
        assert_eq!(CodeField::from_form_key("_css_code"), None);
    }

    #[test]
    fn request_fields_skip_absent() {
        let request = SaveRequest::new().with_js("alert(1)").with_html("");
        let fields: Vec<_> = request.fields().collect();
        assert_eq!(fields, vec![(CodeField::Html, ""), (CodeField::Js, "alert(1)")]);
        assert!(!request.is_empty());
        assert!(SaveRequest::new().is_empty());
    }
}
