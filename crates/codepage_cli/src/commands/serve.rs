//! Serve command implementation.

use super::Site;
use codepage_server::{CodepageServer, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Runs the serve command. Does not return unless binding fails.
pub fn run(site: Site, bind: &str) -> Result<(), Box<dyn std::error::Error>> {
    let secret = site.require_secret()?;
    let addr: SocketAddr = bind.parse()?;
    let path = site.store.path().display().to_string();

    let server = CodepageServer::new(ServerConfig::new(addr), Arc::new(site.pages), secret);
    info!(%addr, data = %path, "starting codepage server");
    println!("codepage listening on http://{addr}");
    server.serve()?;
    Ok(())
}
