//! Property-based test generators using proptest.
//!
//! Provides strategies for generating code field contents, titles and
//! principals.

use codepage_core::{Principal, Role, SaveRequest};
use proptest::prelude::*;

/// Strategy for code text that leans on the characters the transport
/// escaping touches: quotes, backslashes and NUL.
pub fn code_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            3 => any::<char>(),
            1 => prop::sample::select(vec!['\'', '"', '\\', '\0', '<', '>', '&', '\n']),
        ],
        0..256,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for HTML-ish markup with tags and attributes.
pub fn markup_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["p", "div", "h1", "span", "a"]),
            prop::string::string_regex("[a-zA-Z0-9 '\"\\\\]{0,20}").expect("Invalid regex"),
        ),
        0..8,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(tag, text)| format!("<{tag} title=\"{text}\">{text}</{tag}>"))
            .collect()
    })
}

/// Strategy for entry titles.
pub fn title_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9][A-Za-z0-9 ,.!?&'-]{0,40}").expect("Invalid regex")
}

/// Strategy for site roles.
pub fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(vec![
        Role::Administrator,
        Role::Editor,
        Role::Author,
        Role::Subscriber,
    ])
}

/// Strategy for principals with small user ids, so ownership collisions
/// happen often.
pub fn principal_strategy() -> impl Strategy<Value = Principal> {
    (1u64..4, role_strategy()).prop_map(|(user_id, role)| Principal::new(user_id, role))
}

/// Strategy for partial save requests: each field independently present.
pub fn save_request_strategy() -> impl Strategy<Value = SaveRequest> {
    (
        prop::option::of(code_text_strategy()),
        prop::option::of(code_text_strategy()),
        prop::option::of(code_text_strategy()),
    )
        .prop_map(|(html, css, js)| SaveRequest { html, css, js })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
