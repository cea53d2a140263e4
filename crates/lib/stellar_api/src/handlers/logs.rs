//! Audit log handlers. All admin only.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use stellar_core::models::log::LogEntry;
use stellar_core::pagination::{Page, PageQuery};

use crate::AppState;
use crate::error::AppResult;
use crate::models::MessageResponse;

/// `GET /logs`
pub async fn list_logs(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Json<Vec<LogEntry>>> {
    let Query(q) = query?;
    let page = Page::try_from(&q)?;
    Ok(Json(state.audit.list(page).await?))
}

/// `GET /logs/{username}`
pub async fn list_user_logs(
    State(state): State<AppState>,
    Path(username): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> AppResult<Json<Vec<LogEntry>>> {
    let Query(q) = query?;
    let page = Page::try_from(&q)?;
    Ok(Json(state.audit.list_for_user(&username, page).await?))
}

/// `GET /logs/user_activity`: `{username: entry count}`.
pub async fn user_activity(
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<String, i64>>> {
    let activity = state.audit.user_activity().await?;
    Ok(Json(
        activity.into_iter().map(|a| (a.user, a.count)).collect(),
    ))
}

/// `DELETE /logs/{id}`
pub async fn delete_log(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
) -> AppResult<StatusCode> {
    state.audit.delete(&log_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /logs`: remove every entry and report how many went.
pub async fn purge_logs(State(state): State<AppState>) -> AppResult<Json<MessageResponse>> {
    let removed = state.audit.purge().await?;
    let message = if removed == 0 {
        "the logs collection is already empty".to_string()
    } else {
        format!("{removed} logs deleted")
    };
    Ok(Json(MessageResponse::new(message)))
}
