//! Star/planet mutations: repository write, then audit record, then the URL
//! of the affected resource.
//!
//! Authorization has already run in middleware by the time these are
//! called; ownership of planets is checked by the repository.

use stellar_core::audit::Verb;
use stellar_core::fields::FormFields;
use stellar_core::models::auth::Principal;
use stellar_core::models::body::BodyKind;
use tracing::info;

use crate::AppState;
use crate::error::AppResult;

pub async fn create_star(state: &AppState, actor: &Principal, form: &FormFields) -> AppResult<String> {
    let id = state.bodies.create_star(form).await?;
    state.audit.record(&actor.username, Verb::Created, BodyKind::Star, id).await;
    info!(user = %actor.username, star_id = %id, "star created");
    Ok(state.config.star_url(id))
}

pub async fn update_star(
    state: &AppState,
    actor: &Principal,
    star_id: &str,
    form: &FormFields,
) -> AppResult<String> {
    let id = state.bodies.update_star(star_id, form).await?;
    state.audit.record(&actor.username, Verb::Updated, BodyKind::Star, id).await;
    info!(user = %actor.username, star_id = %id, "star updated");
    Ok(state.config.star_url(id))
}

pub async fn delete_star(state: &AppState, actor: &Principal, star_id: &str) -> AppResult<()> {
    let id = state.bodies.delete_star(star_id).await?;
    state.audit.record(&actor.username, Verb::Deleted, BodyKind::Star, id).await;
    info!(user = %actor.username, star_id = %id, "star deleted");
    Ok(())
}

pub async fn add_planet(
    state: &AppState,
    actor: &Principal,
    star_id: &str,
    form: &FormFields,
) -> AppResult<String> {
    let planet_id = state.bodies.add_planet(star_id, form, actor).await?;
    state
        .audit
        .record(&actor.username, Verb::Created, BodyKind::Planet, planet_id)
        .await;
    info!(user = %actor.username, %planet_id, "planet added");
    planet_url(state, star_id, planet_id)
}

pub async fn update_planet(
    state: &AppState,
    actor: &Principal,
    star_id: &str,
    planet_id: &str,
    form: &FormFields,
) -> AppResult<String> {
    let planet_id = state
        .bodies
        .update_planet(star_id, planet_id, form, actor)
        .await?;
    state
        .audit
        .record(&actor.username, Verb::Updated, BodyKind::Planet, planet_id)
        .await;
    info!(user = %actor.username, %planet_id, "planet updated");
    planet_url(state, star_id, planet_id)
}

pub async fn remove_planet(
    state: &AppState,
    actor: &Principal,
    star_id: &str,
    planet_id: &str,
) -> AppResult<()> {
    let planet_id = state.bodies.remove_planet(star_id, planet_id).await?;
    state
        .audit
        .record(&actor.username, Verb::Deleted, BodyKind::Planet, planet_id)
        .await;
    info!(user = %actor.username, %planet_id, "planet removed");
    Ok(())
}

/// The star id has already been validated by the repository call.
fn planet_url(state: &AppState, star_id: &str, planet_id: uuid::Uuid) -> AppResult<String> {
    let star_id = stellar_core::uuid::parse_id(star_id)
        .ok_or_else(|| crate::error::AppError::InvalidId("invalid star ID".into()))?;
    Ok(state.config.planet_url(star_id, planet_id))
}
