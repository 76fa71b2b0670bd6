//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// How long a login session stays valid.
    pub session_expiry: Duration,
    /// Site name shown by the fallback template.
    pub site_name: String,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            max_body_bytes: 4 * 1024 * 1024,
            session_expiry: Duration::from_secs(24 * 60 * 60), // 24 hours
            site_name: "Codepage".to_string(),
        }
    }

    /// Sets the maximum request body size.
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Sets the session lifetime.
    pub fn with_session_expiry(mut self, expiry: Duration) -> Self {
        self.session_expiry = expiry;
        self
    }

    /// Sets the site name.
    pub fn with_site_name(mut self, name: impl Into<String>) -> Self {
        self.site_name = name.into();
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.max_body_bytes, 4_194_304);
        assert_eq!(config.session_expiry, Duration::from_secs(86_400));
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new("0.0.0.0:9000".parse().unwrap())
            .with_max_body_bytes(1024)
            .with_session_expiry(Duration::from_secs(60))
            .with_site_name("Docs");

        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.session_expiry, Duration::from_secs(60));
        assert_eq!(config.site_name, "Docs");
    }
}
