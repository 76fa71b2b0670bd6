//! Edit tokens: per-form anti-forgery values.
//!
//! An edit token proves that a save request came from the edit form that was
//! served to this user, in this login session, for this entry, recently.
//!
//! ## Token Format
//!
//! ```text
//! HMAC-SHA256(secret, "{tick}|codepage-save:{entity}|{user_id}|{session}")[..12]
//! ```
//!
//! hex-encoded (24 characters). The tick is the current time divided into
//! half-lifetime windows; a token is accepted during the window it was
//! issued in and the following one. The tick is not carried in the token,
//! so verification recomputes the MAC for both windows.

use crate::error::{CoreError, CoreResult};
use codepage_meta::EntityId;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Number of MAC bytes kept in a token.
pub const TOKEN_BYTES: usize = 12;

/// Site-wide signing secret.
///
/// The secret is zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SiteSecret(Vec<u8>);

impl SiteSecret {
    /// Wraps raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty.
    pub fn new(bytes: Vec<u8>) -> CoreResult<Self> {
        if bytes.is_empty() {
            return Err(CoreError::InvalidInput("site secret must not be empty".into()));
        }
        Ok(Self(bytes))
    }

    /// Generates a random 32-byte secret from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parses a hex-encoded secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid hex or is empty.
    pub fn from_hex(hex_str: &str) -> CoreResult<Self> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| CoreError::InvalidInput(format!("site secret: {e}")))?;
        Self::new(bytes)
    }

    /// Hex-encodes the secret.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Returns the raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SiteSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SiteSecret(..)")
    }
}

/// Why a token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// No token was supplied.
    Missing,
    /// The token is not 24 hex characters.
    Malformed,
    /// The token does not match this entry, user, session and time window.
    Mismatch,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenRejection::Missing => "missing token",
            TokenRejection::Malformed => "malformed token",
            TokenRejection::Mismatch => "token mismatch",
        })
    }
}

/// How old an accepted token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAge {
    /// Issued in the current window.
    Fresh,
    /// Issued in the previous window.
    Aging,
}

/// Issues and verifies edit tokens.
#[derive(Clone, Debug)]
pub struct EditTokens {
    secret: SiteSecret,
    lifetime: Duration,
}

impl EditTokens {
    /// Creates a token authority.
    pub fn new(secret: SiteSecret, lifetime: Duration) -> Self {
        Self { secret, lifetime }
    }

    /// Issues a token for editing `entity` as `user_id` in `session`.
    pub fn issue(&self, entity: EntityId, user_id: u64, session: &str) -> String {
        self.issue_at(entity, user_id, session, SystemTime::now())
    }

    /// Issues a token as of `now`.
    pub fn issue_at(&self, entity: EntityId, user_id: u64, session: &str, now: SystemTime) -> String {
        let tag = self.mac(self.tick(now), entity, user_id, session).finalize().into_bytes();
        hex::encode(&tag[..TOKEN_BYTES])
    }

    /// Verifies a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns the reason the token was rejected.
    pub fn verify(
        &self,
        token: Option<&str>,
        entity: EntityId,
        user_id: u64,
        session: &str,
    ) -> Result<TokenAge, TokenRejection> {
        self.verify_at(token, entity, user_id, session, SystemTime::now())
    }

    /// Verifies a token as of `now`.
    ///
    /// # Errors
    ///
    /// Returns the reason the token was rejected.
    pub fn verify_at(
        &self,
        token: Option<&str>,
        entity: EntityId,
        user_id: u64,
        session: &str,
        now: SystemTime,
    ) -> Result<TokenAge, TokenRejection> {
        let token = token.ok_or(TokenRejection::Missing)?;
        if token.len() != TOKEN_BYTES * 2 {
            return Err(TokenRejection::Malformed);
        }
        let tag = hex::decode(token).map_err(|_| TokenRejection::Malformed)?;

        let tick = self.tick(now);
        if self
            .mac(tick, entity, user_id, session)
            .verify_truncated_left(&tag)
            .is_ok()
        {
            return Ok(TokenAge::Fresh);
        }
        if self
            .mac(tick.saturating_sub(1), entity, user_id, session)
            .verify_truncated_left(&tag)
            .is_ok()
        {
            return Ok(TokenAge::Aging);
        }
        Err(TokenRejection::Mismatch)
    }

    /// Current half-lifetime window number.
    fn tick(&self, now: SystemTime) -> u64 {
        let half = (self.lifetime.as_secs() / 2).max(1);
        let secs = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        secs.div_ceil(half)
    }

    fn mac(&self, tick: u64, entity: EntityId, user_id: u64, session: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(format!("{tick}|codepage-save:{entity}|{user_id}|{session}").as_bytes());
        mac
    }
}
