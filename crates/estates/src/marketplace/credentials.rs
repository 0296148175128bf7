//! Password hashing and signed-claims session tokens.
//!
//! Tokens are `base64url(claims).base64url(hmac-sha256)` over a JSON
//! claims payload of `{sub, exp}`. Verification never reports which check
//! failed: expiry, malformed input, and a bad signature all collapse to
//! [`CredentialError::InvalidCredential`].

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use ring::hmac;
use serde::{Deserialize, Serialize};

/// Session lifetime applied when no override is configured.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid authentication credentials")]
    InvalidCredential,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// One-way password digests via argon2 with a random per-password salt.
#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordVault;

impl PasswordVault {
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| CredentialError::Hashing(err.to_string()))?;
        Ok(digest.to_string())
    }

    /// The salt travels inside the digest, so verification needs no state.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and verifies signed subject/expiry claims without a store
/// round trip.
pub struct TokenSigner {
    key: hmac::Key,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &str) -> Self {
        Self::new(secret, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    pub fn issue(&self, subject_id: &str) -> Result<String, CredentialError> {
        let claims = Claims {
            sub: subject_id.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|err| CredentialError::Hashing(err.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(payload);
        let tag = hmac::sign(&self.key, payload.as_bytes());
        Ok(format!("{payload}.{}", URL_SAFE_NO_PAD.encode(tag.as_ref())))
    }

    /// Returns the subject id for a well-formed, unexpired token.
    pub fn verify(&self, token: &str) -> Result<String, CredentialError> {
        let (payload, signature) = token
            .split_once('.')
            .ok_or(CredentialError::InvalidCredential)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| CredentialError::InvalidCredential)?;
        hmac::verify(&self.key, payload.as_bytes(), &signature)
            .map_err(|_| CredentialError::InvalidCredential)?;

        let claims = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| CredentialError::InvalidCredential)?;
        let claims: Claims = serde_json::from_slice(&claims)
            .map_err(|_| CredentialError::InvalidCredential)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(CredentialError::InvalidCredential);
        }
        Ok(claims.sub)
    }
}
