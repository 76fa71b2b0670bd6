//! CLI command implementations.

pub mod compact;
pub mod create;
pub mod entry;
pub mod import;
pub mod list;
pub mod render;
pub mod serve;
pub mod session;
pub mod status;

use codepage_core::{CodePages, Config, SiteSecret};
use codepage_meta::FileMetaStore;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A site opened from its metadata log.
pub struct Site {
    /// The metadata log.
    pub store: Arc<FileMetaStore>,
    /// The code page pipeline over `store`.
    pub pages: CodePages,
    /// Signing secret, if one was configured.
    pub secret: Option<SiteSecret>,
}

impl Site {
    /// Opens the log at `path`. Without a configured secret, the pipeline
    /// signs with a throwaway one.
    pub fn open(path: &Path, secret: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let secret = secret.map(SiteSecret::from_hex).transpose()?;
        let store = Arc::new(FileMetaStore::open(path)?);
        let signing = secret.clone().unwrap_or_else(SiteSecret::generate);
        let pages = CodePages::new(Config::default(), store.clone(), signing);
        debug!(path = %path.display(), "site opened");

        Ok(Self {
            store,
            pages,
            secret,
        })
    }

    /// Returns the configured secret.
    pub fn require_secret(&self) -> Result<SiteSecret, Box<dyn std::error::Error>> {
        self.secret
            .clone()
            .ok_or_else(|| "Site secret required (--secret or CODEPAGE_SECRET)".into())
    }
}
