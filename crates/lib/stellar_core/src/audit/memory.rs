//! In-process audit store.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuditError, AuditStore};
use crate::models::log::{LogEntry, UserActivity};
use crate::pagination::Page;

#[derive(Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<LogEntry>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &LogEntry) -> Result<(), AuditError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn list(&self, page: Page) -> Result<Vec<LogEntry>, AuditError> {
        Ok(page.slice(&self.entries.read().await))
    }

    async fn list_for_user(
        &self,
        username: &str,
        page: Page,
    ) -> Result<Vec<LogEntry>, AuditError> {
        let entries = self.entries.read().await;
        let matching: Vec<LogEntry> = entries
            .iter()
            .filter(|e| e.user == username)
            .cloned()
            .collect();
        Ok(page.slice(&matching))
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AuditError> {
        Ok(self.entries.read().await.iter().any(|e| e.id == id))
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AuditError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok((before - entries.len()) as u64)
    }

    async fn purge(&self) -> Result<u64, AuditError> {
        let mut entries = self.entries.write().await;
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }

    async fn user_activity(&self) -> Result<Vec<UserActivity>, AuditError> {
        let entries = self.entries.read().await;
        let mut activity: Vec<UserActivity> = Vec::new();
        for entry in entries.iter() {
            match activity.iter_mut().find(|a| a.user == entry.user) {
                Some(a) => a.count += 1,
                None => activity.push(UserActivity {
                    user: entry.user.clone(),
                    count: 1,
                }),
            }
        }
        activity.sort_by(|a, b| a.user.cmp(&b.user));
        Ok(activity)
    }
}
