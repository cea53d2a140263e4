//! A complete set of stores for one backend.

use std::sync::Arc;

use sqlx::PgPool;

use crate::audit::{AuditStore, MemoryAuditStore, PgAuditStore};
use crate::auth::revocation::{MemoryRevocationStore, PgRevocationStore, RevocationStore};
use crate::auth::users::{MemoryUserStore, PgUserStore, UserStore};
use crate::bodies::{BodyStore, MemoryBodyStore, PgBodyStore};

#[derive(Clone)]
pub struct Stores {
    pub bodies: Arc<dyn BodyStore>,
    pub users: Arc<dyn UserStore>,
    pub revocations: Arc<dyn RevocationStore>,
    pub logs: Arc<dyn AuditStore>,
}

impl Stores {
    /// Stores backed by PostgreSQL. The schema must already be migrated.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            bodies: Arc::new(PgBodyStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            revocations: Arc::new(PgRevocationStore::new(pool.clone())),
            logs: Arc::new(PgAuditStore::new(pool)),
        }
    }

    /// Process-local stores; contents are lost on exit.
    pub fn in_memory() -> Self {
        Self {
            bodies: Arc::new(MemoryBodyStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            revocations: Arc::new(MemoryRevocationStore::new()),
            logs: Arc::new(MemoryAuditStore::new()),
        }
    }
}
