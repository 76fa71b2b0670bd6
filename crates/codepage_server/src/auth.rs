//! Login sessions for the edit surface.
//!
//! Sessions are stateless signed tokens carried in the `codepage_session`
//! cookie. Tokens include a timestamp for expiration checking.
//!
//! ## Token Format
//!
//! Tokens are composed of:
//! - 8 bytes: user_id (big-endian)
//! - 1 byte: role code
//! - 8 bytes: issued-at timestamp (Unix millis, big-endian)
//! - 32 bytes: HMAC-SHA256 signature
//!
//! Total: 49 bytes, hex-encoded for transport (98 characters).
//!
//! The hex signature doubles as the session id that edit tokens are bound to.

use crate::error::{ServerError, ServerResult};
use codepage_core::{Principal, Role, SiteSecret};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "codepage_session";

const PAYLOAD_LEN: usize = 17;
const TOKEN_LEN: usize = PAYLOAD_LEN + 32;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC.
    pub secret: SiteSecret,
    /// Session expiration duration.
    pub session_expiry: Duration,
}

impl AuthConfig {
    /// Creates a new auth configuration.
    pub fn new(secret: SiteSecret) -> Self {
        Self {
            secret,
            session_expiry: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }

    /// Sets the session expiration duration.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.session_expiry = expiry;
        self
    }
}

/// A validated login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The logged-in user.
    pub principal: Principal,
    /// Session id: the hex-encoded token signature.
    pub id: String,
    /// Issue time in Unix millis.
    pub issued_at: u64,
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct SessionTokens {
    config: AuthConfig,
}

impl SessionTokens {
    /// Creates a new session authority.
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Creates a session token for `principal`, issued now.
    pub fn create_token(&self, principal: &Principal) -> String {
        self.create_token_at(principal, now_millis())
    }

    /// Creates a session token issued at `issued_at` (Unix millis).
    pub fn create_token_at(&self, principal: &Principal, issued_at: u64) -> String {
        let mut data = Vec::with_capacity(TOKEN_LEN);
        data.extend_from_slice(&principal.user_id.to_be_bytes());
        data.push(principal.role.code());
        data.extend_from_slice(&issued_at.to_be_bytes());

        let signature = self.mac(&data).finalize().into_bytes();
        data.extend_from_slice(&signature);
        hex::encode(data)
    }

    /// Validates a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if the token is malformed, forged or expired.
    pub fn validate(&self, token: &str) -> ServerResult<Session> {
        self.validate_at(token, now_millis())
    }

    /// Validates a token as of `now` (Unix millis).
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if the token is malformed, forged or expired.
    pub fn validate_at(&self, token: &str, now: u64) -> ServerResult<Session> {
        let bytes = hex::decode(token.trim())
            .map_err(|_| ServerError::Unauthenticated("malformed session".into()))?;
        if bytes.len() != TOKEN_LEN {
            return Err(ServerError::Unauthenticated("invalid session length".into()));
        }

        let (payload, signature) = bytes.split_at(PAYLOAD_LEN);
        self.mac(payload)
            .verify_slice(signature)
            .map_err(|_| ServerError::Unauthenticated("invalid signature".into()))?;

        let (user_bytes, rest) = payload.split_at(8);
        let (role_byte, issued_bytes) = rest.split_at(1);
        let user_id = u64::from_be_bytes(fixed(user_bytes)?);
        let issued_at = u64::from_be_bytes(fixed(issued_bytes)?);
        let role = Role::from_code(role_byte[0])
            .ok_or_else(|| ServerError::Unauthenticated("unknown role".into()))?;

        let expiry_millis = u64::try_from(self.config.session_expiry.as_millis()).unwrap_or(u64::MAX);
        if now > issued_at.saturating_add(expiry_millis) {
            return Err(ServerError::Unauthenticated("session expired".into()));
        }

        Ok(Session {
            principal: Principal::new(user_id, role),
            id: hex::encode(signature),
            issued_at,
        })
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.config.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(data);
        mac
    }
}

fn fixed(bytes: &[u8]) -> ServerResult<[u8; 8]> {
    bytes
        .try_into()
        .map_err(|_| ServerError::Unauthenticated("invalid session length".into()))
}

fn now_millis() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUED: u64 = 1_700_000_000_000;

    fn tokens() -> SessionTokens {
        let secret = SiteSecret::new(b"test-secret-key-32-bytes-long!!".to_vec()).unwrap();
        SessionTokens::new(AuthConfig::new(secret))
    }

    #[test]
    fn create_and_validate_token() {
        let tokens = tokens();
        let principal = Principal::new(7, Role::Editor);

        let token = tokens.create_token_at(&principal, ISSUED);
        assert_eq!(token.len(), 98);

        let session = tokens.validate_at(&token, ISSUED + 1_000).unwrap();
        assert_eq!(session.principal, principal);
        assert_eq!(session.issued_at, ISSUED);
        assert_eq!(session.id.len(), 64);
        assert!(token.ends_with(&session.id));
    }

    #[test]
    fn reject_tampered_token() {
        let tokens = tokens();
        let token = tokens.create_token_at(&Principal::new(7, Role::Subscriber), ISSUED);

        // Promote the role byte from subscriber (4) to administrator (1).
        let mut bytes = hex::decode(&token).unwrap();
        bytes[8] = 1;
        let forged = hex::encode(bytes);

        assert!(matches!(
            tokens.validate_at(&forged, ISSUED),
            Err(ServerError::Unauthenticated(_))
        ));
    }

    #[test]
    fn reject_other_secret() {
        let other = SessionTokens::new(AuthConfig::new(SiteSecret::new(b"other".to_vec()).unwrap()));
        let token = other.create_token_at(&Principal::new(1, Role::Administrator), ISSUED);
        assert!(tokens().validate_at(&token, ISSUED).is_err());
    }

    #[test]
    fn reject_expired_token() {
        let tokens = tokens();
        let token = tokens.create_token_at(&Principal::new(1, Role::Editor), ISSUED);

        let day = 86_400_000;
        assert!(tokens.validate_at(&token, ISSUED + day).is_ok());
        assert!(tokens.validate_at(&token, ISSUED + day + 1).is_err());
    }

    #[test]
    fn custom_expiry() {
        let secret = SiteSecret::new(b"k".to_vec()).unwrap();
        let tokens = SessionTokens::new(AuthConfig::new(secret).with_expiry(Duration::from_secs(1)));
        let token = tokens.create_token_at(&Principal::new(1, Role::Editor), ISSUED);

        assert!(tokens.validate_at(&token, ISSUED + 1_000).is_ok());
        assert!(tokens.validate_at(&token, ISSUED + 1_001).is_err());
    }

    #[test]
    fn reject_garbage() {
        let tokens = tokens();
        assert!(tokens.validate_at("", ISSUED).is_err());
        assert!(tokens.validate_at("not-hex", ISSUED).is_err());
        assert!(tokens.validate_at("abcd", ISSUED).is_err());
    }

    #[test]
    fn sessions_have_distinct_ids() {
        let tokens = tokens();
        let principal = Principal::new(1, Role::Editor);
        let a = tokens.validate_at(&tokens.create_token_at(&principal, ISSUED), ISSUED).unwrap();
        let b = tokens
            .validate_at(&tokens.create_token_at(&principal, ISSUED + 1), ISSUED + 1)
            .unwrap();
        assert_ne!(a.id, b.id);
    }
}
