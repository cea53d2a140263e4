//! PostgreSQL body store.
//!
//! A star is one row of `bodies`; its planets are a JSONB array on that row.
//! Every planet mutation is a single `UPDATE` of the parent row that rewrites
//! the array server-side, touching only the element matched by id, so each
//! write is atomic without a transaction.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::view::StarOrder;
use super::{BodyError, BodyStore};
use crate::models::body::{BodyKind, Planet, Star, StarFields};
use crate::pagination::Page;

pub struct PgBodyStore {
    pool: PgPool,
}

impl PgBodyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StarRow {
    id: Uuid,
    name: String,
    radius: f64,
    mass: f64,
    density: f64,
    surface_temperature: f64,
    distance: f64,
    spectral_classification: String,
    apparent_magnitude: f64,
    absolute_magnitude: f64,
    planets: Json<Vec<Planet>>,
}

impl From<StarRow> for Star {
    fn from(row: StarRow) -> Self {
        Star {
            id: row.id,
            kind: BodyKind::Star,
            fields: StarFields {
                name: row.name,
                radius: row.radius,
                mass: row.mass,
                density: row.density,
                surface_temperature: row.surface_temperature,
                distance: row.distance,
                spectral_classification: row.spectral_classification,
                apparent_magnitude: row.apparent_magnitude,
                absolute_magnitude: row.absolute_magnitude,
            },
            planets: row.planets.0,
        }
    }
}

const STAR_COLUMNS: &str = "id, name, radius, mass, density, surface_temperature, distance, \
     spectral_classification, apparent_magnitude, absolute_magnitude, planets";

/// Matches rows whose planet array contains an element with id `$2`.
const HAS_PLANET: &str = "planets @> jsonb_build_array(jsonb_build_object('id', $2::text))";

#[async_trait]
impl BodyStore for PgBodyStore {
    async fn find_star(&self, id: Uuid) -> Result<Option<Star>, BodyError> {
        let row = sqlx::query_as::<_, StarRow>(&format!(
            "SELECT {STAR_COLUMNS} FROM bodies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Star::from))
    }

    async fn star_exists(&self, id: Uuid) -> Result<bool, BodyError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM bodies WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list_stars(&self, order: StarOrder, page: Page) -> Result<Vec<Star>, BodyError> {
        // Column and direction come from closed enums, never from raw input.
        let order_by = match order.field {
            Some(field) => format!("{} {}, id", field.column(), order.direction.sql()),
            None => "id".to_string(),
        };
        let rows = sqlx::query_as::<_, StarRow>(&format!(
            "SELECT {STAR_COLUMNS} FROM bodies ORDER BY {order_by} LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.skip())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Star::from).collect())
    }

    async fn insert_star(&self, star: &Star) -> Result<(), BodyError> {
        let f = &star.fields;
        sqlx::query(
            r#"
            INSERT INTO bodies (id, name, radius, mass, density, surface_temperature, distance,
                                spectral_classification, apparent_magnitude, absolute_magnitude,
                                planets)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(star.id)
        .bind(&f.name)
        .bind(f.radius)
        .bind(f.mass)
        .bind(f.density)
        .bind(f.surface_temperature)
        .bind(f.distance)
        .bind(&f.spectral_classification)
        .bind(f.apparent_magnitude)
        .bind(f.absolute_magnitude)
        .bind(Json(&star.planets))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_star_fields(&self, id: Uuid, f: &StarFields) -> Result<u64, BodyError> {
        let result = sqlx::query(
            r#"
            UPDATE bodies
            SET name = $2, radius = $3, mass = $4, density = $5, surface_temperature = $6,
                distance = $7, spectral_classification = $8, apparent_magnitude = $9,
                absolute_magnitude = $10
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&f.name)
        .bind(f.radius)
        .bind(f.mass)
        .bind(f.density)
        .bind(f.surface_temperature)
        .bind(f.distance)
        .bind(&f.spectral_classification)
        .bind(f.apparent_magnitude)
        .bind(f.absolute_magnitude)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_star(&self, id: Uuid) -> Result<u64, BodyError> {
        let result = sqlx::query("DELETE FROM bodies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn planet_owner(&self, planet_id: Uuid) -> Result<Option<Uuid>, BodyError> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM bodies \
             WHERE planets @> jsonb_build_array(jsonb_build_object('id', $1::text))",
        )
        .bind(planet_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(owner)
    }

    async fn find_planet(
        &self,
        star_id: Uuid,
        planet_id: Uuid,
    ) -> Result<Option<Planet>, BodyError> {
        let planet = sqlx::query_scalar::<_, Json<Planet>>(
            r#"
            SELECT elem
            FROM bodies, jsonb_array_elements(planets) AS elem
            WHERE id = $1 AND elem->>'id' = $2
            "#,
        )
        .bind(star_id)
        .bind(planet_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(planet.map(|p| p.0))
    }

    async fn push_planet(&self, star_id: Uuid, planet: &Planet) -> Result<u64, BodyError> {
        let result = sqlx::query(
            "UPDATE bodies SET planets = planets || jsonb_build_array($2::jsonb) WHERE id = $1",
        )
        .bind(star_id)
        .bind(Json(planet))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn set_planet(&self, star_id: Uuid, planet: &Planet) -> Result<u64, BodyError> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE bodies
            SET planets = (
                SELECT jsonb_agg(CASE WHEN elem->>'id' = $2 THEN $3::jsonb ELSE elem END
                                 ORDER BY pos)
                FROM jsonb_array_elements(planets) WITH ORDINALITY AS t(elem, pos)
            )
            WHERE id = $1 AND {HAS_PLANET}
            "#
        ))
        .bind(star_id)
        .bind(planet.id.to_string())
        .bind(Json(planet))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn pull_planet(&self, star_id: Uuid, planet_id: Uuid) -> Result<u64, BodyError> {
        let result = sqlx::query(&format!(
            r#"
            UPDATE bodies
            SET planets = COALESCE((
                SELECT jsonb_agg(elem ORDER BY pos)
                FROM jsonb_array_elements(planets) WITH ORDINALITY AS t(elem, pos)
                WHERE elem->>'id' <> $2
            ), '[]'::jsonb)
            WHERE id = $1 AND {HAS_PLANET}
            "#
        ))
        .bind(star_id)
        .bind(planet_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
