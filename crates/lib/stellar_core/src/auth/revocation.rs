//! Revocation set for logged-out access tokens.
//!
//! Tokens are stored as SHA-256 hashes together with their original expiry.
//! Once that expiry passes the token can never validate again, so the entry
//! is eligible for garbage collection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::PgPool;

use super::AuthError;

/// Storage for revoked token hashes.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Add a token hash. Revoking an already revoked token is not an error.
    async fn revoke(&self, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError>;

    async fn is_revoked(&self, token_hash: &str) -> Result<bool, AuthError>;

    /// Drop entries whose original expiry is at or before `now`. Returns the
    /// number of entries removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// `revoked_tokens` table.
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn revoke(&self, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (token_hash, expires_at) VALUES ($1, $2) \
             ON CONFLICT (token_hash) DO NOTHING",
        )
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_revoked(&self, token_hash: &str) -> Result<bool, AuthError> {
        let revoked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token_hash = $1)",
        )
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(revoked)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// In-process revocation set.
#[derive(Default)]
pub struct MemoryRevocationStore {
    entries: DashMap<String, DateTime<Utc>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        self.entries
            .entry(token_hash.to_string())
            .or_insert(expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token_hash: &str) -> Result<bool, AuthError> {
        Ok(self.entries.contains_key(token_hash))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        Ok((before - self.entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let store = MemoryRevocationStore::new();
        let exp = Utc::now() + Duration::minutes(30);
        store.revoke("abc", exp).await.unwrap();
        store.revoke("abc", exp).await.unwrap();
        assert!(store.is_revoked("abc").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn purge_drops_only_expired_entries() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now();
        store.revoke("old", now - Duration::minutes(1)).await.unwrap();
        store.revoke("live", now + Duration::minutes(29)).await.unwrap();

        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert!(!store.is_revoked("old").await.unwrap());
        assert!(store.is_revoked("live").await.unwrap());
    }
}
