//! Authentication middleware: `x-access-token` extraction and role checks.
//!
//! [`require_auth`] must wrap [`require_admin`]; the admin check only reads
//! the principal that authentication placed in the request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use stellar_core::auth::guard::{TOKEN_HEADER, require_admin as check_admin};
use stellar_core::models::auth::Principal;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Verified caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

/// The raw token the caller authenticated with, needed to revoke it.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

/// Axum middleware: reads `x-access-token`, verifies it against signature,
/// expiry and the revocation set, and injects [`AuthenticatedUser`] and
/// [`AccessToken`] into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let principal = state.guard.authenticate(token.as_deref()).await?;
    debug!(user = %principal.username, "authenticated");

    if let Some(token) = token {
        request.extensions_mut().insert(AccessToken(token.trim().to_string()));
    }
    request.extensions_mut().insert(AuthenticatedUser(principal));

    Ok(next.run(request).await)
}

/// Axum middleware: admits only admins. Runs inside [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Token is missing".into()))?;
    check_admin(&user.0)?;
    Ok(next.run(request).await)
}
