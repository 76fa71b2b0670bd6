//! Site configuration.

use std::time::Duration;

/// Content kind name of managed code pages.
pub const CODE_PAGE_KIND: &str = "code_page";

/// Configuration for the code page pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Content kind handled by the store and renderer.
    pub content_kind: String,

    /// First path segment of public code page URLs (`/{url_slug}/{slug}`).
    pub url_slug: String,

    /// How long an edit token stays valid.
    pub token_lifetime: Duration,

    /// Value of the `lang` attribute on rendered documents.
    pub language: String,

    /// Value of the `<meta charset>` on rendered documents.
    pub charset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_kind: CODE_PAGE_KIND.to_string(),
            url_slug: "p".to_string(),
            token_lifetime: Duration::from_secs(24 * 60 * 60), // 24 hours
            language: "en-US".to_string(),
            charset: "UTF-8".to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the managed content kind.
    #[must_use]
    pub fn content_kind(mut self, kind: impl Into<String>) -> Self {
        self.content_kind = kind.into();
        self
    }

    /// Sets the public URL prefix.
    #[must_use]
    pub fn url_slug(mut self, slug: impl Into<String>) -> Self {
        self.url_slug = slug.into();
        self
    }

    /// Sets the edit token lifetime.
    #[must_use]
    pub const fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Sets the document language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the document charset.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.content_kind, CODE_PAGE_KIND);
        assert_eq!(config.url_slug, "p");
        assert_eq!(config.token_lifetime, Duration::from_secs(86_400));
        assert_eq!(config.charset, "UTF-8");
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .url_slug("code")
            .language("pt-BR")
            .token_lifetime(Duration::from_secs(60));

        assert_eq!(config.url_slug, "code");
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.token_lifetime, Duration::from_secs(60));
    }
}
