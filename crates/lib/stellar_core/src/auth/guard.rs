//! Authorization checks run before a handler body.
//!
//! The checks form an ordered pipeline: [`Guard::authenticate`] always runs
//! first and yields a [`Principal`]; [`require_admin`] and
//! [`Principal::may_modify`] only ever look at that already-verified
//! principal and never touch the raw token again.

use tracing::debug;

use super::AuthError;
use super::jwt::TokenService;
use crate::models::auth::Principal;

/// Request header carrying the access token.
pub const TOKEN_HEADER: &str = "x-access-token";

/// Authentication front of the pipeline.
#[derive(Clone)]
pub struct Guard {
    tokens: TokenService,
}

impl Guard {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    /// Authenticated check: the token must be present and verify.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredential)?;
        self.tokens.verify(token).await
    }
}

/// AdminOnly check.
pub fn require_admin(principal: &Principal) -> Result<(), AuthError> {
    if principal.is_admin {
        Ok(())
    } else {
        debug!(user = %principal.username, "admin access denied");
        Err(AuthError::InsufficientRole("Admin access required".into()))
    }
}

impl Principal {
    /// OwnerOrAdmin check against a planet's contributor.
    pub fn may_modify(&self, contributed_by: &str) -> bool {
        self.is_admin || self.username == contributed_by
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::auth::revocation::MemoryRevocationStore;

    fn guard() -> (Guard, TokenService) {
        let tokens = TokenService::new(
            b"secret",
            Duration::minutes(30),
            Arc::new(MemoryRevocationStore::new()),
        );
        (Guard::new(tokens.clone()), tokens)
    }

    #[tokio::test]
    async fn missing_token_is_missing_credential() {
        let (guard, _) = guard();
        assert!(matches!(
            guard.authenticate(None).await,
            Err(AuthError::MissingCredential)
        ));
        assert!(matches!(
            guard.authenticate(Some("  ")).await,
            Err(AuthError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn bad_token_is_invalid_credential() {
        let (guard, _) = guard();
        assert!(matches!(
            guard.authenticate(Some("garbage")).await,
            Err(AuthError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn logged_out_token_fails_authentication() {
        let (guard, tokens) = guard();
        let token = tokens.issue_default("starlord34", false).unwrap();
        assert!(guard.authenticate(Some(&token)).await.is_ok());
        tokens.revoke(&token).await.unwrap();
        assert!(guard.authenticate(Some(&token)).await.is_err());
    }

    #[test]
    fn admin_check_uses_principal_only() {
        let admin = Principal {
            username: "stargal21".into(),
            is_admin: true,
        };
        let user = Principal {
            username: "starlord34".into(),
            is_admin: false,
        };
        assert!(require_admin(&admin).is_ok());
        assert!(matches!(
            require_admin(&user),
            Err(AuthError::InsufficientRole(_))
        ));
    }

    #[test]
    fn owner_or_admin() {
        let owner = Principal {
            username: "starlord34".into(),
            is_admin: false,
        };
        let other = Principal {
            username: "galaxycrusher59".into(),
            is_admin: false,
        };
        let admin = Principal {
            username: "stargal21".into(),
            is_admin: true,
        };
        assert!(owner.may_modify("starlord34"));
        assert!(!other.may_modify("starlord34"));
        assert!(admin.may_modify("starlord34"));
    }
}
