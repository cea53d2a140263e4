//! Account flows: registration, login, logout and admin management.

use std::sync::Arc;

use tracing::info;

use super::AuthError;
use super::jwt::TokenService;
use super::password::{hash_password, verify_password};
use super::users::UserStore;
use crate::fields::{ACCOUNT_FIELDS, FormFields};
use crate::models::auth::{NewUser, User};
use crate::uuid::parse_id;

/// Account operations over a [`UserStore`].
#[derive(Clone)]
pub struct Accounts {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl Accounts {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Register an account from a form. Reports the first colliding unique
    /// field, username before email.
    pub async fn register(&self, form: &FormFields, is_admin: bool) -> Result<User, AuthError> {
        form.require(&ACCOUNT_FIELDS)?;
        let username = form.text("username")?;
        let email = form.text("email")?;

        if self.users.username_exists(&username).await? {
            return Err(AuthError::DuplicateUnique("username already exists".into()));
        }
        if self.users.email_exists(&email).await? {
            return Err(AuthError::DuplicateUnique("email already exists".into()));
        }

        let password_hash = hash_password(&form.text("password")?)?;
        let user = self
            .users
            .create(NewUser {
                username,
                email,
                forename: form.text("forename")?,
                surname: form.text("surname")?,
                password_hash,
                is_admin,
            })
            .await?;
        info!(user = %user.username, is_admin, "account registered");
        Ok(user)
    }

    /// Check credentials and issue a token with the default lifetime.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let record = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::InvalidCredential("incorrect username".into()))?;

        if !verify_password(password, &record.password_hash)? {
            return Err(AuthError::InvalidCredential("incorrect password".into()));
        }

        let token = self
            .tokens
            .issue_default(&record.user.username, record.user.is_admin)?;
        info!(user = %record.user.username, "login");
        Ok(token)
    }

    /// Revoke the caller's token.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.tokens.revoke(token).await
    }

    pub async fn list(&self) -> Result<Vec<User>, AuthError> {
        self.users.list().await
    }

    pub async fn find(&self, username: &str) -> Result<User, AuthError> {
        self.users
            .find_by_username(username)
            .await?
            .map(|u| u.user)
            .ok_or_else(|| AuthError::NotFound("user not found".into()))
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), AuthError> {
        let id = parse_id(raw_id).ok_or_else(|| AuthError::InvalidId("invalid user ID".into()))?;
        if !self.users.exists(id).await? {
            return Err(AuthError::NotFound("user ID does not exist".into()));
        }
        if self.users.delete(id).await? == 0 {
            return Err(AuthError::NotFound("user ID does not exist".into()));
        }
        info!(user_id = %id, "account deleted");
        Ok(())
    }
}
