//! JWT token issuing, verification and revocation.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::AuthError;
use super::revocation::RevocationStore;
use crate::models::auth::{Principal, TokenClaims};

/// Default access token lifetime: 30 minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

const INVALID_TOKEN: &str = "Token is invalid or has expired";

/// Issues, verifies and revokes access tokens.
///
/// Cheap to clone; the signing keys are fixed for the life of the process and
/// the revocation set is shared.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    revocations: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            revocations,
        }
    }

    /// Lifetime applied by [`TokenService::issue_default`].
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `username` expiring `ttl` from now (HS256).
    pub fn issue(&self, username: &str, is_admin: bool, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: username.to_string(),
            is_admin,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
    }

    pub fn issue_default(&self, username: &str, is_admin: bool) -> Result<String, AuthError> {
        self.issue(username, is_admin, self.ttl)
    }

    /// Verify signature, expiry and revocation status.
    ///
    /// Every failure collapses into the same `InvalidCredential` so callers
    /// cannot tell a forged token from an expired or revoked one.
    pub async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .decode_claims(token, true)
            .ok_or_else(|| AuthError::InvalidCredential(INVALID_TOKEN.into()))?;

        if self.revocations.is_revoked(&hash_token(token)).await? {
            debug!(user = %claims.sub, "rejected revoked token");
            return Err(AuthError::InvalidCredential(INVALID_TOKEN.into()));
        }

        Ok(Principal::from(claims))
    }

    /// Add a token to the revocation set. Idempotent.
    ///
    /// The entry keeps the token's own expiry so it can be collected once the
    /// token could no longer validate anyway. A token whose claims cannot be
    /// read is kept for one full lifetime.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let expires_at = self
            .decode_claims(token, false)
            .and_then(|c| DateTime::<Utc>::from_timestamp(c.exp, 0))
            .unwrap_or_else(|| Utc::now() + self.ttl);
        self.revocations.revoke(&hash_token(token), expires_at).await?;
        let purged = self.revocations.purge_expired(Utc::now()).await?;
        if purged > 0 {
            debug!(purged, "dropped expired revocation entries");
        }
        Ok(())
    }

    /// Drop revocation entries for tokens that have expired on their own.
    pub async fn purge_revocations(&self) -> Result<u64, AuthError> {
        self.revocations.purge_expired(Utc::now()).await
    }

    fn decode_claims(&self, token: &str, check_exp: bool) -> Option<TokenClaims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.validate_exp = check_exp;
        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .ok()
            .map(|data| data.claims)?;
        // jsonwebtoken accepts `exp == now`; a token is only valid strictly before expiry.
        if check_exp && claims.exp <= Utc::now().timestamp() {
            return None;
        }
        Some(claims)
    }
}

/// SHA-256 hash a token for the revocation set.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolve the JWT secret: env var `JWT_SECRET` → `AUTH_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(secret) = std::env::var("AUTH_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new JWT secret");
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stellar")
        .join("jwt-secret")
}
