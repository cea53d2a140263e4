//! Registration, login and logout handlers.

use std::collections::HashMap;

use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Form, Json};

use super::form_fields;
use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AccessToken;
use crate::models::{MessageResponse, TokenResponse};
use crate::services::auth::parse_basic_credentials;

/// `POST /register`: create a regular account.
pub async fn register(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.accounts.register(&form_fields(form), false).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("account registration successful")),
    ))
}

/// `POST /register_admin`: create an admin account. Admin only.
pub async fn register_admin(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.accounts.register(&form_fields(form), true).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("admin account registration successful")),
    ))
}

/// `GET /login`: exchange HTTP Basic credentials for an access token.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<TokenResponse>> {
    let (username, password) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_credentials)
        .ok_or_else(|| AppError::Unauthorized("authentication required".into()))?;
    let token = state.accounts.login(&username, &password).await?;
    Ok(Json(TokenResponse { token }))
}

/// `GET /logout`: revoke the token used for this request.
pub async fn logout(
    State(state): State<AppState>,
    Extension(AccessToken(token)): Extension<AccessToken>,
) -> AppResult<Json<MessageResponse>> {
    state.accounts.logout(&token).await?;
    Ok(Json(MessageResponse::new("logout successful")))
}
