//! In-process body store.
//!
//! Each star is one map entry; mutating an entry holds its shard lock, which
//! gives the same per-document atomicity the database provides.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::view::StarOrder;
use super::{BodyError, BodyStore};
use crate::models::body::{Planet, Star, StarFields};
use crate::pagination::Page;

#[derive(Default)]
pub struct MemoryBodyStore {
    stars: DashMap<Uuid, Star>,
}

impl MemoryBodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of star documents held.
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

#[async_trait]
impl BodyStore for MemoryBodyStore {
    async fn find_star(&self, id: Uuid) -> Result<Option<Star>, BodyError> {
        Ok(self.stars.get(&id).map(|s| s.clone()))
    }

    async fn star_exists(&self, id: Uuid) -> Result<bool, BodyError> {
        Ok(self.stars.contains_key(&id))
    }

    async fn list_stars(&self, order: StarOrder, page: Page) -> Result<Vec<Star>, BodyError> {
        let mut stars: Vec<Star> = self.stars.iter().map(|s| s.value().clone()).collect();
        stars.sort_by(|a, b| order.compare(a, b));
        Ok(page.slice(&stars))
    }

    async fn insert_star(&self, star: &Star) -> Result<(), BodyError> {
        self.stars.insert(star.id, star.clone());
        Ok(())
    }

    async fn update_star_fields(&self, id: Uuid, fields: &StarFields) -> Result<u64, BodyError> {
        match self.stars.get_mut(&id) {
            Some(mut star) => {
                star.fields = fields.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_star(&self, id: Uuid) -> Result<u64, BodyError> {
        Ok(self.stars.remove(&id).map_or(0, |_| 1))
    }

    async fn planet_owner(&self, planet_id: Uuid) -> Result<Option<Uuid>, BodyError> {
        Ok(self
            .stars
            .iter()
            .find(|s| s.planet(planet_id).is_some())
            .map(|s| s.id))
    }

    async fn find_planet(
        &self,
        star_id: Uuid,
        planet_id: Uuid,
    ) -> Result<Option<Planet>, BodyError> {
        Ok(self
            .stars
            .get(&star_id)
            .and_then(|s| s.planet(planet_id).cloned()))
    }

    async fn push_planet(&self, star_id: Uuid, planet: &Planet) -> Result<u64, BodyError> {
        match self.stars.get_mut(&star_id) {
            Some(mut star) => {
                star.planets.push(planet.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn set_planet(&self, star_id: Uuid, planet: &Planet) -> Result<u64, BodyError> {
        let Some(mut star) = self.stars.get_mut(&star_id) else {
            return Ok(0);
        };
        match star.planets.iter_mut().find(|p| p.id == planet.id) {
            Some(slot) => {
                *slot = planet.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn pull_planet(&self, star_id: Uuid, planet_id: Uuid) -> Result<u64, BodyError> {
        let Some(mut star) = self.stars.get_mut(&star_id) else {
            return Ok(0);
        };
        let before = star.planets.len();
        star.planets.retain(|p| p.id != planet_id);
        Ok(if star.planets.len() < before { 1 } else { 0 })
    }
}
