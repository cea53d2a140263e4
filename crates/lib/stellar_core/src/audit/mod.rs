//! Append-only audit log of star/planet mutations.
//!
//! [`AuditLog::record`] is best-effort: a failed append is reported with
//! `warn!` and never fails the mutation that triggered it.

pub mod memory;
pub mod pg;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub use memory::MemoryAuditStore;
pub use pg::PgAuditStore;

use crate::models::body::BodyKind;
use crate::models::log::{LogEntry, UserActivity};
use crate::pagination::Page;
use crate::uuid::{parse_id, uuidv7};

/// Audit log errors.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Storage for log entries. Listings are in append order.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> Result<(), AuditError>;

    async fn list(&self, page: Page) -> Result<Vec<LogEntry>, AuditError>;

    async fn list_for_user(&self, username: &str, page: Page)
    -> Result<Vec<LogEntry>, AuditError>;

    async fn exists(&self, id: Uuid) -> Result<bool, AuditError>;

    async fn delete(&self, id: Uuid) -> Result<u64, AuditError>;

    /// Remove every entry, returning how many were removed.
    async fn purge(&self) -> Result<u64, AuditError>;

    /// Entry counts grouped by user, ordered by username.
    async fn user_activity(&self) -> Result<Vec<UserActivity>, AuditError>;
}

/// What happened to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        })
    }
}

/// `The user {actor} {verb} the {kind} {id} at {time}`.
pub fn action_message(
    actor: &str,
    verb: Verb,
    kind: BodyKind,
    id: Uuid,
    time: DateTime<Utc>,
) -> String {
    format!(
        "The user {actor} {verb} the {kind} {id} at {}",
        time.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Audit log over a shared [`AuditStore`].
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn AuditStore>,
}

impl AuditLog {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Append an entry describing a mutation by `username`. Never fails.
    pub async fn record(&self, username: &str, verb: Verb, kind: BodyKind, id: Uuid) {
        let time = Utc::now();
        let entry = LogEntry {
            id: uuidv7(),
            user: username.to_string(),
            time,
            action: action_message(username, verb, kind, id, time),
        };
        match self.store.append(&entry).await {
            Ok(()) => debug!(user = username, action = %entry.action, "audit entry recorded"),
            Err(e) => warn!(user = username, action = %entry.action, "failed to record audit entry: {e}"),
        }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<LogEntry>, AuditError> {
        self.store.list(page).await
    }

    pub async fn list_for_user(
        &self,
        username: &str,
        page: Page,
    ) -> Result<Vec<LogEntry>, AuditError> {
        let entries = self.store.list_for_user(username, page).await?;
        if entries.is_empty() {
            return Err(AuditError::NotFound(
                "no logs contain the supplied username".into(),
            ));
        }
        Ok(entries)
    }

    pub async fn delete(&self, raw_id: &str) -> Result<Uuid, AuditError> {
        let id = parse_id(raw_id).ok_or_else(|| AuditError::InvalidId("invalid log ID".into()))?;
        if !self.store.exists(id).await? || self.store.delete(id).await? == 0 {
            return Err(AuditError::NotFound("log ID does not exist".into()));
        }
        Ok(id)
    }

    pub async fn purge(&self) -> Result<u64, AuditError> {
        let removed = self.store.purge().await?;
        debug!(removed, "audit log purged");
        Ok(removed)
    }

    pub async fn user_activity(&self) -> Result<Vec<UserActivity>, AuditError> {
        self.store.user_activity().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct FailingStore;

    #[async_trait]
    impl AuditStore for FailingStore {
        async fn append(&self, _: &LogEntry) -> Result<(), AuditError> {
            Err(AuditError::DbError(sqlx::Error::PoolTimedOut))
        }
        async fn list(&self, _: Page) -> Result<Vec<LogEntry>, AuditError> {
            Err(AuditError::DbError(sqlx::Error::PoolTimedOut))
        }
        async fn list_for_user(&self, _: &str, _: Page) -> Result<Vec<LogEntry>, AuditError> {
            Err(AuditError::DbError(sqlx::Error::PoolTimedOut))
        }
        async fn exists(&self, _: Uuid) -> Result<bool, AuditError> {
            Err(AuditError::DbError(sqlx::Error::PoolTimedOut))
        }
        async fn delete(&self, _: Uuid) -> Result<u64, AuditError> {
            Err(AuditError::DbError(sqlx::Error::PoolTimedOut))
        }
        async fn purge(&self) -> Result<u64, AuditError> {
            Err(AuditError::DbError(sqlx::Error::PoolTimedOut))
        }
        async fn user_activity(&self) -> Result<Vec<UserActivity>, AuditError> {
            Err(AuditError::DbError(sqlx::Error::PoolTimedOut))
        }
    }

    #[test]
    fn message_names_actor_verb_kind_and_id() {
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let msg = action_message("starlord34", Verb::Updated, BodyKind::Planet, Uuid::nil(), time);
        assert_eq!(
            msg,
            "The user starlord34 updated the planet 00000000-0000-0000-0000-000000000000 \
             at 2024-03-01 12:30:05"
        );
    }

    #[tokio::test]
    async fn record_swallows_store_failure() {
        let log = AuditLog::new(Arc::new(FailingStore));
        log.record("x", Verb::Created, BodyKind::Star, Uuid::nil()).await;
        assert!(log.list(Page::default()).await.is_err());
    }

    #[tokio::test]
    async fn records_are_listed_in_order() {
        let store = Arc::new(MemoryAuditStore::new());
        let log = AuditLog::new(store.clone());
        let id = uuidv7();
        log.record("a", Verb::Created, BodyKind::Star, id).await;
        log.record("b", Verb::Deleted, BodyKind::Star, id).await;

        let all = log.list(Page::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user, "a");
        assert!(all[0].action.starts_with(&format!("The user a created the star {id} at ")));
        assert!(all[1].action.contains("deleted"));
    }

    #[tokio::test]
    async fn unknown_user_has_no_logs() {
        let log = AuditLog::new(Arc::new(MemoryAuditStore::new()));
        log.record("a", Verb::Created, BodyKind::Star, Uuid::nil()).await;
        assert!(matches!(
            log.list_for_user("nobody", Page::default()).await,
            Err(AuditError::NotFound(_))
        ));
        assert_eq!(log.list_for_user("a", Page::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_checks_syntax_then_existence() {
        let store = Arc::new(MemoryAuditStore::new());
        let log = AuditLog::new(store.clone());
        assert!(matches!(log.delete("nope").await, Err(AuditError::InvalidId(_))));
        assert!(matches!(
            log.delete(&uuidv7().to_string()).await,
            Err(AuditError::NotFound(_))
        ));

        log.record("a", Verb::Created, BodyKind::Star, Uuid::nil()).await;
        let entry = log.list(Page::default()).await.unwrap().remove(0);
        assert_eq!(log.delete(&entry.id.to_string()).await.unwrap(), entry.id);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn activity_and_purge() {
        let log = AuditLog::new(Arc::new(MemoryAuditStore::new()));
        for user in ["b", "a", "b"] {
            log.record(user, Verb::Created, BodyKind::Planet, Uuid::nil()).await;
        }
        let activity = log.user_activity().await.unwrap();
        assert_eq!(
            activity,
            vec![
                UserActivity { user: "a".into(), count: 1 },
                UserActivity { user: "b".into(), count: 2 },
            ]
        );
        assert_eq!(log.purge().await.unwrap(), 3);
        assert_eq!(log.purge().await.unwrap(), 0);
    }
}
