use base64::engine::{general_purpose, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::error::Result;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Session token lifetime in seconds (30 minutes)
pub const TOKEN_TTL_SECS: i64 = 30 * 60;

// Cost factor for bcrypt password hashing
const BCRYPT_COST: u32 = 7;

/// Issues and validates opaque session tokens.
///
/// A token is `base64(username:expires_at:nonce) . hex(hmac_sha256(payload))`.
/// The form/response core never inspects tokens; it only ever receives a
/// principal that was verified at the HTTP boundary.
#[derive(Clone)]
pub struct TokenAuth {
    secret: String,
}

impl TokenAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Generate a random nonce so two tokens for the same user differ
    pub fn generate_nonce() -> String {
        rand::thread_rng().gen_range(10000000..99999999).to_string()
    }

    /// Issue a signed session token for the given username
    pub fn issue_token(&self, username: &str) -> String {
        let expires_at = Utc::now().timestamp() + TOKEN_TTL_SECS;
        let payload = format!("{}:{}:{}", username, expires_at, Self::generate_nonce());
        let signature = self.sign(&payload);

        format!(
            "{}.{}",
            general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            signature
        )
    }

    /// Validate a token and return the username it was issued for.
    /// Returns `None` for malformed, tampered or expired tokens.
    pub fn verify_token(&self, token: &str) -> Option<String> {
        let (encoded, signature) = token.split_once('.')?;
        let payload_bytes = general_purpose::URL_SAFE_NO_PAD.decode(encoded).ok()?;
        let payload = String::from_utf8(payload_bytes).ok()?;

        if self.sign(&payload) != signature {
            return None;
        }

        // Usernames may contain ':' so split from the right
        let mut parts = payload.rsplitn(3, ':');
        let _nonce = parts.next()?;
        let expires_at: i64 = parts.next()?.parse().ok()?;
        let username = parts.next()?;

        if expires_at < Utc::now().timestamp() {
            return None;
        }

        Some(username.to_string())
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

/// Check a password attempt against a stored hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
