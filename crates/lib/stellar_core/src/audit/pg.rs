//! `logs` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{AuditError, AuditStore};
use crate::models::log::{LogEntry, UserActivity};
use crate::pagination::Page;

pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LogRow {
    id: Uuid,
    username: String,
    time: DateTime<Utc>,
    action: String,
}

impl From<LogRow> for LogEntry {
    fn from(row: LogRow) -> Self {
        LogEntry {
            id: row.id,
            user: row.username,
            time: row.time,
            action: row.action,
        }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, entry: &LogEntry) -> Result<(), AuditError> {
        sqlx::query("INSERT INTO logs (id, username, time, action) VALUES ($1, $2, $3, $4)")
            .bind(entry.id)
            .bind(&entry.user)
            .bind(entry.time)
            .bind(&entry.action)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<LogEntry>, AuditError> {
        let rows = sqlx::query_as::<_, LogRow>(
            "SELECT id, username, time, action FROM logs ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.skip())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LogEntry::from).collect())
    }

    async fn list_for_user(
        &self,
        username: &str,
        page: Page,
    ) -> Result<Vec<LogEntry>, AuditError> {
        let rows = sqlx::query_as::<_, LogRow>(
            "SELECT id, username, time, action FROM logs WHERE username = $1 \
             ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(username)
        .bind(page.limit())
        .bind(page.skip())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LogEntry::from).collect())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AuditError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM logs WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AuditError> {
        let result = sqlx::query("DELETE FROM logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge(&self) -> Result<u64, AuditError> {
        let result = sqlx::query("DELETE FROM logs").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn user_activity(&self) -> Result<Vec<UserActivity>, AuditError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT username, COUNT(*) FROM logs GROUP BY username ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(user, count)| UserActivity { user, count })
            .collect())
    }
}
