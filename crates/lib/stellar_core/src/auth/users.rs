//! Account storage.

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{NewUser, User, UserWithPassword};

/// Storage for user accounts. Usernames and emails are unique.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str)
    -> Result<Option<UserWithPassword>, AuthError>;

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError>;

    /// Insert a new account. A uniqueness violation fails with
    /// `DuplicateUnique` even if a pre-check raced.
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    async fn list(&self) -> Result<Vec<User>, AuthError>;

    async fn exists(&self, id: Uuid) -> Result<bool, AuthError>;

    /// Returns the number of accounts removed.
    async fn delete(&self, id: Uuid) -> Result<u64, AuthError>;
}

/// `users` table.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    forename: String,
    surname: String,
    is_admin: bool,
    password_hash: String,
}

impl From<UserRow> for UserWithPassword {
    fn from(row: UserRow) -> Self {
        UserWithPassword {
            user: User {
                id: row.id,
                username: row.username,
                email: row.email,
                forename: row.forename,
                surname: row.surname,
                is_admin: row.is_admin,
            },
            password_hash: row.password_hash,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, forename, surname, is_admin, password_hash";

fn duplicate_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("email") => "email already exists".into(),
        _ => "username already exists".into(),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserWithPassword>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserWithPassword::from))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (username, email, forename, surname, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.forename)
        .bind(&user.surname)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(UserWithPassword::from(row).user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AuthError::DuplicateUnique(duplicate_message(db.constraint())))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<User>, AuthError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| UserWithPassword::from(r).user)
            .collect())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AuthError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// In-process account store. Uniqueness is checked under the write lock.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<UserWithPassword>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserWithPassword>, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user.username == username).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.user.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.user.email == email))
    }

    async fn create(&self, new: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user.username == new.username) {
            return Err(AuthError::DuplicateUnique(duplicate_message(None)));
        }
        if users.iter().any(|u| u.user.email == new.email) {
            return Err(AuthError::DuplicateUnique(duplicate_message(Some(
                "users_email_key",
            ))));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            forename: new.forename,
            surname: new.surname,
            is_admin: new.is_admin,
        };
        users.push(UserWithPassword {
            user: user.clone(),
            password_hash: new.password_hash,
        });
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, AuthError> {
        let users = self.users.read().await;
        let mut out: Vec<User> = users.iter().map(|u| u.user.clone()).collect();
        out.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(out)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, AuthError> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.user.id == id))
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AuthError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.user.id != id);
        Ok((before - users.len()) as u64)
    }
}
