//! Star request handlers.

use std::collections::HashMap;

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Form, Json};
use stellar_core::bodies::view::{Presentation, StarOrder, StarView};
use stellar_core::pagination::Page;

use super::{flag, form_fields};
use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{DisplayQuery, StarListQuery, UrlResponse};
use crate::services::bodies as mutations;

/// `GET /bodies`: one page of stars.
pub async fn list_stars(
    State(state): State<AppState>,
    query: Result<Query<StarListQuery>, QueryRejection>,
) -> AppResult<Json<Vec<StarView>>> {
    let Query(q) = query?;
    let page = Page::new(q.pn, q.ps)?;
    let order = StarOrder::parse(q.order.as_deref())?;
    let presentation = Presentation {
        include_planets: flag("show_planets", q.show_planets.as_deref(), true)?,
        convert_units: flag("convert_units", q.convert_units.as_deref(), false)?,
    };
    let stars = state.bodies.list_stars(page, order, presentation).await?;
    Ok(Json(stars))
}

/// `GET /bodies/{star_id}`
pub async fn get_star(
    State(state): State<AppState>,
    Path(star_id): Path<String>,
    query: Result<Query<DisplayQuery>, QueryRejection>,
) -> AppResult<Json<StarView>> {
    let Query(q) = query?;
    let presentation = Presentation {
        include_planets: flag("show_planets", q.show_planets.as_deref(), true)?,
        convert_units: flag("convert_units", q.convert_units.as_deref(), false)?,
    };
    let star = state.bodies.find_star(&star_id).await?;
    Ok(Json(presentation.star(star)))
}

/// `POST /bodies`: admin only.
pub async fn create_star(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AppResult<(StatusCode, Json<UrlResponse>)> {
    let url = mutations::create_star(&state, &user.0, &form_fields(form)).await?;
    Ok((StatusCode::CREATED, Json(UrlResponse { url })))
}

/// `PUT /bodies/{star_id}`: admin only.
pub async fn update_star(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(star_id): Path<String>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AppResult<Json<UrlResponse>> {
    let url = mutations::update_star(&state, &user.0, &star_id, &form_fields(form)).await?;
    Ok(Json(UrlResponse { url }))
}

/// `DELETE /bodies/{star_id}`: admin only. Removes the star's planets too.
pub async fn delete_star(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(star_id): Path<String>,
) -> AppResult<StatusCode> {
    mutations::delete_star(&state, &user.0, &star_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
