//! Account administration handlers. All admin only.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use stellar_core::models::auth::User;

use crate::AppState;
use crate::error::AppResult;

/// `GET /accounts`
pub async fn list_accounts(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.accounts.list().await?))
}

/// `GET /accounts/{username}`
pub async fn get_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<User>> {
    Ok(Json(state.accounts.find(&username).await?))
}

/// `DELETE /accounts/{id}`
pub async fn delete_account(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<StatusCode> {
    state.accounts.delete(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
