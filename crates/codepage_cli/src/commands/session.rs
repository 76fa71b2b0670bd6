//! Session command implementation.

use codepage_core::{Principal, Role, SiteSecret};
use codepage_server::{AuthConfig, SessionTokens, SESSION_COOKIE};

/// Runs the session command.
pub fn run(secret: Option<&str>, user: u64, role: &str) -> Result<(), Box<dyn std::error::Error>> {
    let secret = secret.ok_or("Site secret required (--secret or CODEPAGE_SECRET)")?;
    let role: Role = role.parse()?;
    let token = issue(SiteSecret::from_hex(secret)?, Principal::new(user, role));
    println!("{SESSION_COOKIE}={token}");
    Ok(())
}

/// Issues a session token signed with `secret`.
pub fn issue(secret: SiteSecret, principal: Principal) -> String {
    SessionTokens::new(AuthConfig::new(secret)).create_token(&principal)
}
