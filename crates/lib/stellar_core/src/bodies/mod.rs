//! Star and planet documents.
//!
//! [`BodyStore`] is the storage seam: single-document primitives, each of
//! which is atomic on its own. [`BodyRepository`] layers the validation
//! order on top (id syntax, existence, ownership, fields) and turns a
//! zero affected-count after a confirmed existence check into
//! [`BodyError::ConcurrentModification`].

pub mod memory;
pub mod pg;
pub mod repository;
pub mod view;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryBodyStore;
pub use pg::PgBodyStore;
pub use repository::BodyRepository;

use crate::fields::FieldError;
use crate::models::body::{Planet, Star, StarFields};
use crate::pagination::Page;
use view::StarOrder;

/// Star/planet errors.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    ConcurrentModification(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

impl From<FieldError> for BodyError {
    fn from(e: FieldError) -> Self {
        BodyError::Validation(e.to_string())
    }
}

/// Single-document operations on the `bodies` collection.
///
/// Writes return the number of documents they changed so the repository can
/// detect a document that vanished between its existence check and the
/// write.
#[async_trait]
pub trait BodyStore: Send + Sync {
    async fn find_star(&self, id: Uuid) -> Result<Option<Star>, BodyError>;

    async fn star_exists(&self, id: Uuid) -> Result<bool, BodyError>;

    async fn list_stars(&self, order: StarOrder, page: Page) -> Result<Vec<Star>, BodyError>;

    async fn insert_star(&self, star: &Star) -> Result<(), BodyError>;

    /// Replace the scalar fields of a star, leaving its planets untouched.
    async fn update_star_fields(&self, id: Uuid, fields: &StarFields) -> Result<u64, BodyError>;

    /// Delete a star together with its embedded planets.
    async fn delete_star(&self, id: Uuid) -> Result<u64, BodyError>;

    /// The star embedding `planet_id`, searched across the whole collection.
    async fn planet_owner(&self, planet_id: Uuid) -> Result<Option<Uuid>, BodyError>;

    async fn find_planet(&self, star_id: Uuid, planet_id: Uuid)
    -> Result<Option<Planet>, BodyError>;

    /// Append to the star's planet array.
    async fn push_planet(&self, star_id: Uuid, planet: &Planet) -> Result<u64, BodyError>;

    /// Replace the one array element whose id is `planet.id`; every other
    /// element is left as is.
    async fn set_planet(&self, star_id: Uuid, planet: &Planet) -> Result<u64, BodyError>;

    /// Remove the array element whose id is `planet_id`.
    async fn pull_planet(&self, star_id: Uuid, planet_id: Uuid) -> Result<u64, BodyError>;
}
