//! Decoding of the edit form submission.
//!
//! Submitted field values pass through the transport escaping layer here:
//! quotes, backslashes and NUL are backslash-escaped before the values reach
//! the snippet store. The renderer reverses that exactly once.

use codepage_core::{add_slashes, CodeField, SaveRequest};
use url::form_urlencoded;

/// Form input carrying the edit token.
pub const NONCE_FIELD: &str = "codepage_nonce";

/// Form input marking an autosave pass.
pub const AUTOSAVE_FIELD: &str = "autosave";

/// A decoded `application/x-www-form-urlencoded` edit submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSubmission {
    /// Code fields present in the form, transport-escaped.
    pub request: SaveRequest,
    /// Echoed edit token.
    pub nonce: Option<String>,
    /// Whether this is an autosave pass.
    pub autosave: bool,
}

impl EditSubmission {
    /// Decodes a form body. Unknown inputs are ignored; for repeated inputs
    /// the last value wins.
    pub fn parse(body: &[u8]) -> Self {
        let mut submission = Self::default();
        for (key, value) in form_urlencoded::parse(body) {
            if let Some(field) = CodeField::from_form_key(&key) {
                submission.request.set(field, add_slashes(&value));
            } else if key == NONCE_FIELD {
                submission.nonce = Some(value.into_owned());
            } else if key == AUTOSAVE_FIELD {
                submission.autosave = matches!(&*value, "1" | "true" | "on");
            }
        }
        submission
    }
}

/// Encodes name/value pairs as a form body.
pub fn encode_form<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
