//! Planet request handlers.

use std::collections::HashMap;

use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Form, Json};
use stellar_core::bodies::view::Presentation;
use stellar_core::models::body::Planet;

use super::{flag, form_fields};
use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{DisplayQuery, UrlResponse};
use crate::services::bodies as mutations;

/// `GET /bodies/{star_id}/planets`
pub async fn list_planets(
    State(state): State<AppState>,
    Path(star_id): Path<String>,
    query: Result<Query<DisplayQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Planet>>> {
    let Query(q) = query?;
    let convert = flag("convert_units", q.convert_units.as_deref(), false)?;
    Ok(Json(state.bodies.list_planets(&star_id, convert).await?))
}

/// `GET /bodies/{star_id}/planets/{planet_id}`
pub async fn get_planet(
    State(state): State<AppState>,
    Path((star_id, planet_id)): Path<(String, String)>,
    query: Result<Query<DisplayQuery>, QueryRejection>,
) -> AppResult<Json<Planet>> {
    let Query(q) = query?;
    let presentation = Presentation {
        include_planets: true,
        convert_units: flag("convert_units", q.convert_units.as_deref(), false)?,
    };
    let planet = state.bodies.find_planet(&star_id, &planet_id).await?;
    Ok(Json(presentation.planet(planet)))
}

/// `POST /bodies/{star_id}/planets`: any authenticated user; the caller
/// becomes the contributor.
pub async fn add_planet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(star_id): Path<String>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AppResult<(StatusCode, Json<UrlResponse>)> {
    let url = mutations::add_planet(&state, &user.0, &star_id, &form_fields(form)).await?;
    Ok((StatusCode::CREATED, Json(UrlResponse { url })))
}

/// `PUT /bodies/{star_id}/planets/{planet_id}`: contributor or admin.
pub async fn update_planet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((star_id, planet_id)): Path<(String, String)>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AppResult<Json<UrlResponse>> {
    let url =
        mutations::update_planet(&state, &user.0, &star_id, &planet_id, &form_fields(form)).await?;
    Ok(Json(UrlResponse { url }))
}

/// `DELETE /bodies/{star_id}/planets/{planet_id}`: admin only.
pub async fn remove_planet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((star_id, planet_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    mutations::remove_planet(&state, &user.0, &star_id, &planet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
