//! Star/planet operations with uniform validation ordering.
//!
//! Every operation checks, in this order: identifier syntax, existence (star,
//! then planet-within-star), ownership, field presence and values. Only then
//! does it write, and a write that affects nothing is reported as a
//! concurrent modification.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::view::{Presentation, StarOrder, StarView};
use super::{BodyError, BodyStore};
use crate::fields::FormFields;
use crate::models::auth::Principal;
use crate::models::body::{Planet, PlanetFields, Star, StarFields};
use crate::pagination::Page;
use crate::uuid::{parse_id, uuidv7};

const STAR_NOT_FOUND: &str = "star ID does not exist";
const PLANET_NOT_FOUND: &str = "planet ID does not exist in this star";

fn star_id(raw: &str) -> Result<Uuid, BodyError> {
    parse_id(raw).ok_or_else(|| BodyError::InvalidId("invalid star ID".into()))
}

fn planet_id(raw: &str) -> Result<Uuid, BodyError> {
    parse_id(raw).ok_or_else(|| BodyError::InvalidId("invalid planet ID".into()))
}

/// Fail if a write following a successful existence check changed nothing.
fn ensure_written(affected: u64, what: &str) -> Result<(), BodyError> {
    if affected == 0 {
        debug!(what, "write matched nothing after existence check");
        return Err(BodyError::ConcurrentModification(format!(
            "{what} was modified concurrently, try again"
        )));
    }
    Ok(())
}

/// Repository over a shared [`BodyStore`].
#[derive(Clone)]
pub struct BodyRepository {
    store: Arc<dyn BodyStore>,
}

impl BodyRepository {
    pub fn new(store: Arc<dyn BodyStore>) -> Self {
        Self { store }
    }

    async fn require_star(&self, raw_id: &str) -> Result<Uuid, BodyError> {
        let id = star_id(raw_id)?;
        if !self.store.star_exists(id).await? {
            return Err(BodyError::NotFound(STAR_NOT_FOUND.into()));
        }
        Ok(id)
    }

    /// Two-level existence: the star exists, and the planet id, looked up
    /// across every star, belongs to that star.
    async fn require_planet(
        &self,
        raw_star: &str,
        raw_planet: &str,
    ) -> Result<(Uuid, Planet), BodyError> {
        let sid = star_id(raw_star)?;
        let pid = planet_id(raw_planet)?;
        if !self.store.star_exists(sid).await? {
            return Err(BodyError::NotFound(STAR_NOT_FOUND.into()));
        }
        match self.store.planet_owner(pid).await? {
            Some(owner) if owner == sid => {}
            _ => return Err(BodyError::NotFound(PLANET_NOT_FOUND.into())),
        }
        let planet = self
            .store
            .find_planet(sid, pid)
            .await?
            .ok_or_else(|| BodyError::NotFound(PLANET_NOT_FOUND.into()))?;
        Ok((sid, planet))
    }

    pub async fn find_star(&self, raw_id: &str) -> Result<Star, BodyError> {
        let id = star_id(raw_id)?;
        self.store
            .find_star(id)
            .await?
            .ok_or_else(|| BodyError::NotFound(STAR_NOT_FOUND.into()))
    }

    pub async fn list_stars(
        &self,
        page: Page,
        order: StarOrder,
        presentation: Presentation,
    ) -> Result<Vec<StarView>, BodyError> {
        let stars = self.store.list_stars(order, page).await?;
        Ok(stars.into_iter().map(|s| presentation.star(s)).collect())
    }

    pub async fn create_star(&self, form: &FormFields) -> Result<Uuid, BodyError> {
        let fields = StarFields::from_form(form)?;
        let star = Star::new(uuidv7(), fields);
        self.store.insert_star(&star).await?;
        Ok(star.id)
    }

    pub async fn update_star(&self, raw_id: &str, form: &FormFields) -> Result<Uuid, BodyError> {
        let id = self.require_star(raw_id).await?;
        let fields = StarFields::from_form(form)?;
        ensure_written(self.store.update_star_fields(id, &fields).await?, "star")?;
        Ok(id)
    }

    /// Deletes the star document and, with it, every embedded planet.
    pub async fn delete_star(&self, raw_id: &str) -> Result<Uuid, BodyError> {
        let id = self.require_star(raw_id).await?;
        ensure_written(self.store.delete_star(id).await?, "star")?;
        Ok(id)
    }

    pub async fn find_planet(&self, raw_star: &str, raw_planet: &str) -> Result<Planet, BodyError> {
        let (_, planet) = self.require_planet(raw_star, raw_planet).await?;
        Ok(planet)
    }

    pub async fn list_planets(
        &self,
        raw_star: &str,
        convert_units: bool,
    ) -> Result<Vec<Planet>, BodyError> {
        let star = self.find_star(raw_star).await?;
        let presentation = Presentation {
            include_planets: true,
            convert_units,
        };
        Ok(star
            .planets
            .into_iter()
            .map(|p| presentation.planet(p))
            .collect())
    }

    /// Append a new planet contributed by `contributor`.
    pub async fn add_planet(
        &self,
        raw_star: &str,
        form: &FormFields,
        contributor: &Principal,
    ) -> Result<Uuid, BodyError> {
        let sid = self.require_star(raw_star).await?;
        let fields = PlanetFields::from_form(form)?;
        let planet = Planet::new(uuidv7(), fields, contributor.username.clone());
        ensure_written(self.store.push_planet(sid, &planet).await?, "star")?;
        Ok(planet.id)
    }

    /// Update one planet in place. Only its contributor or an admin may.
    pub async fn update_planet(
        &self,
        raw_star: &str,
        raw_planet: &str,
        form: &FormFields,
        principal: &Principal,
    ) -> Result<Uuid, BodyError> {
        let (sid, current) = self.require_planet(raw_star, raw_planet).await?;
        if !principal.may_modify(&current.contributed_by) {
            return Err(BodyError::Forbidden(
                "only the contributor or an admin may modify this planet".into(),
            ));
        }
        let fields = PlanetFields::from_form(form)?;
        let updated = current.with_fields(fields);
        ensure_written(self.store.set_planet(sid, &updated).await?, "planet")?;
        Ok(updated.id)
    }

    pub async fn remove_planet(&self, raw_star: &str, raw_planet: &str) -> Result<Uuid, BodyError> {
        let (sid, planet) = self.require_planet(raw_star, raw_planet).await?;
        ensure_written(self.store.pull_planet(sid, planet.id).await?, "planet")?;
        Ok(planet.id)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::bodies::MemoryBodyStore;

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn star_form() -> FormFields {
        star_form_with(&[])
    }

    /// A complete star form with some values replaced.
    fn star_form_with(overrides: &[(&str, &str)]) -> FormFields {
        let mut pairs = vec![
            ("name", "HIP100"),
            ("radius", "500000"),
            ("mass", "1.0"),
            ("density", "1.4"),
            ("surface_temperature", "5000"),
            ("distance", "10"),
            ("spectral_classification", "G"),
            ("apparent_magnitude", "4.8"),
            ("absolute_magnitude", "4.8"),
        ];
        for (key, value) in overrides {
            if let Some(slot) = pairs.iter_mut().find(|(k, _)| k == key) {
                slot.1 = *value;
            }
        }
        form(&pairs)
    }

    fn planet_form(name: &str, apoapsis: &str, periapsis: &str) -> FormFields {
        form(&[
            ("name", name),
            ("radius", "6371"),
            ("mass", "1.0"),
            ("density", "5.5"),
            ("surface_temperature", "288"),
            ("apoapsis", apoapsis),
            ("periapsis", periapsis),
            ("orbital_period", "365"),
            ("status", "candidate"),
            ("num_moons", "1"),
        ])
    }

    fn user(name: &str) -> Principal {
        Principal {
            username: name.into(),
            is_admin: false,
        }
    }

    fn admin() -> Principal {
        Principal {
            username: "stargal21".into(),
            is_admin: true,
        }
    }

    fn repo() -> (BodyRepository, Arc<MemoryBodyStore>) {
        let store = Arc::new(MemoryBodyStore::new());
        (BodyRepository::new(store.clone()), store)
    }

    #[tokio::test]
    async fn created_star_has_no_planets() {
        let (repo, _) = repo();
        let id = repo.create_star(&star_form()).await.unwrap();
        let star = repo.find_star(&id.to_string()).await.unwrap();
        assert_eq!(star.fields.name, "HIP100");
        assert_eq!(star.fields.radius, 500000.0);
        assert!(star.planets.is_empty());
    }

    #[tokio::test]
    async fn invalid_id_is_rejected_before_lookup() {
        let (repo, _) = repo();
        assert!(matches!(
            repo.find_star("65f1c2a9").await,
            Err(BodyError::InvalidId(_))
        ));
        assert!(matches!(
            repo.find_planet(&Uuid::nil().to_string(), "bad").await,
            Err(BodyError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn update_star_checks_existence_before_fields() {
        let (repo, _) = repo();
        let missing = uuidv7().to_string();
        assert!(matches!(
            repo.update_star(&missing, &FormFields::default()).await,
            Err(BodyError::NotFound(_))
        ));

        let id = repo.create_star(&star_form()).await.unwrap().to_string();
        assert!(matches!(
            repo.update_star(&id, &FormFields::default()).await,
            Err(BodyError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_star_keeps_planets() {
        let (repo, _) = repo();
        let sid = repo.create_star(&star_form()).await.unwrap().to_string();
        repo.add_planet(&sid, &planet_form("b", "3", "1"), &user("starlord34"))
            .await
            .unwrap();

        repo.update_star(&sid, &star_form_with(&[("name", "HIP101")]))
            .await
            .unwrap();

        let star = repo.find_star(&sid).await.unwrap();
        assert_eq!(star.fields.name, "HIP101");
        assert_eq!(star.planets.len(), 1);
    }

    #[tokio::test]
    async fn planet_is_found_only_under_its_own_star() {
        let (repo, _) = repo();
        let s1 = repo.create_star(&star_form()).await.unwrap().to_string();
        let s2 = repo.create_star(&star_form()).await.unwrap().to_string();
        let pid = repo
            .add_planet(&s1, &planet_form("b", "3", "1"), &user("starlord34"))
            .await
            .unwrap()
            .to_string();

        let planet = repo.find_planet(&s1, &pid).await.unwrap();
        assert_eq!(planet.eccentricity, 0.5);
        assert_eq!(planet.contributed_by, "starlord34");
        assert!(matches!(
            repo.find_planet(&s2, &pid).await,
            Err(BodyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn add_planet_to_missing_star_creates_nothing() {
        let (repo, store) = repo();
        let missing = uuidv7().to_string();
        assert!(matches!(
            repo.add_planet(&missing, &planet_form("b", "3", "1"), &user("x"))
                .await,
            Err(BodyError::NotFound(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn planets_keep_insertion_order() {
        let (repo, _) = repo();
        let sid = repo.create_star(&star_form()).await.unwrap().to_string();
        for name in ["b", "c", "d"] {
            repo.add_planet(&sid, &planet_form(name, "3", "1"), &user("x"))
                .await
                .unwrap();
        }
        let names: Vec<String> = repo
            .list_planets(&sid, false)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.fields.name)
            .collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[tokio::test]
    async fn update_planet_enforces_ownership_before_fields() {
        let (repo, _) = repo();
        let sid = repo.create_star(&star_form()).await.unwrap().to_string();
        let pid = repo
            .add_planet(&sid, &planet_form("b", "3", "1"), &user("starlord34"))
            .await
            .unwrap()
            .to_string();

        // Non-owner is refused even with an empty form.
        assert!(matches!(
            repo.update_planet(&sid, &pid, &FormFields::default(), &user("galaxycrusher59"))
                .await,
            Err(BodyError::Forbidden(_))
        ));
        assert!(matches!(
            repo.update_planet(
                &sid,
                &pid,
                &planet_form("b", "2", "1"),
                &user("galaxycrusher59")
            )
            .await,
            Err(BodyError::Forbidden(_))
        ));

        repo.update_planet(&sid, &pid, &planet_form("b2", "2", "1"), &user("starlord34"))
            .await
            .unwrap();
        repo.update_planet(&sid, &pid, &planet_form("b3", "4", "4"), &admin())
            .await
            .unwrap();

        let planet = repo.find_planet(&sid, &pid).await.unwrap();
        assert_eq!(planet.fields.name, "b3");
        assert_eq!(planet.eccentricity, 0.0);
        assert_eq!(planet.contributed_by, "starlord34");
    }

    #[tokio::test]
    async fn update_planet_leaves_siblings_untouched() {
        let (repo, _) = repo();
        let sid = repo.create_star(&star_form()).await.unwrap().to_string();
        let owner = user("starlord34");
        let first = repo
            .add_planet(&sid, &planet_form("b", "3", "1"), &owner)
            .await
            .unwrap();
        let second = repo
            .add_planet(&sid, &planet_form("c", "5", "5"), &owner)
            .await
            .unwrap();
        let before = repo.find_planet(&sid, &second.to_string()).await.unwrap();

        repo.update_planet(&sid, &first.to_string(), &planet_form("b!", "9", "1"), &owner)
            .await
            .unwrap();

        let planets = repo.list_planets(&sid, false).await.unwrap();
        assert_eq!(planets[0].fields.name, "b!");
        assert_eq!(planets[0].eccentricity, 0.8);
        assert_eq!(planets[1], before);
    }

    #[tokio::test]
    async fn remove_planet_pulls_only_that_planet() {
        let (repo, _) = repo();
        let sid = repo.create_star(&star_form()).await.unwrap().to_string();
        let b = repo
            .add_planet(&sid, &planet_form("b", "3", "1"), &user("x"))
            .await
            .unwrap()
            .to_string();
        repo.add_planet(&sid, &planet_form("c", "3", "1"), &user("x"))
            .await
            .unwrap();

        repo.remove_planet(&sid, &b).await.unwrap();
        let planets = repo.list_planets(&sid, false).await.unwrap();
        assert_eq!(planets.len(), 1);
        assert_eq!(planets[0].fields.name, "c");
        assert!(matches!(
            repo.remove_planet(&sid, &b).await,
            Err(BodyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_star_removes_its_planets() {
        let (repo, _) = repo();
        let sid = repo.create_star(&star_form()).await.unwrap().to_string();
        let pid = repo
            .add_planet(&sid, &planet_form("b", "3", "1"), &user("x"))
            .await
            .unwrap()
            .to_string();

        repo.delete_star(&sid).await.unwrap();
        assert!(matches!(
            repo.list_planets(&sid, false).await,
            Err(BodyError::NotFound(_))
        ));
        assert!(matches!(
            repo.find_planet(&sid, &pid).await,
            Err(BodyError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete_star(&sid).await,
            Err(BodyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_stars_pages_and_orders() {
        let (repo, _) = repo();
        for mass in ["3.0", "1.0", "2.0"] {
            repo.create_star(&star_form_with(&[("mass", mass)]))
                .await
                .unwrap();
        }
        let views = repo
            .list_stars(
                Page::new(Some(1), Some(2)).unwrap(),
                StarOrder::parse(Some("-mass")).unwrap(),
                Presentation::default(),
            )
            .await
            .unwrap();
        let masses: Vec<f64> = views.iter().map(|v| v.fields.mass).collect();
        assert_eq!(masses, vec![3.0, 2.0]);

        let second = repo
            .list_stars(
                Page::new(Some(2), Some(2)).unwrap(),
                StarOrder::default(),
                Presentation::default(),
            )
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].fields.mass, 2.0);
    }

    /// Reads from a real store, but every write reports zero rows, as if the
    /// document vanished right after the existence check.
    struct RacingStore(MemoryBodyStore);

    #[async_trait]
    impl BodyStore for RacingStore {
        async fn find_star(&self, id: Uuid) -> Result<Option<Star>, BodyError> {
            self.0.find_star(id).await
        }
        async fn star_exists(&self, id: Uuid) -> Result<bool, BodyError> {
            self.0.star_exists(id).await
        }
        async fn list_stars(&self, order: StarOrder, page: Page) -> Result<Vec<Star>, BodyError> {
            self.0.list_stars(order, page).await
        }
        async fn insert_star(&self, star: &Star) -> Result<(), BodyError> {
            self.0.insert_star(star).await
        }
        async fn update_star_fields(&self, _: Uuid, _: &StarFields) -> Result<u64, BodyError> {
            Ok(0)
        }
        async fn delete_star(&self, _: Uuid) -> Result<u64, BodyError> {
            Ok(0)
        }
        async fn planet_owner(&self, planet_id: Uuid) -> Result<Option<Uuid>, BodyError> {
            self.0.planet_owner(planet_id).await
        }
        async fn find_planet(&self, s: Uuid, p: Uuid) -> Result<Option<Planet>, BodyError> {
            self.0.find_planet(s, p).await
        }
        async fn push_planet(&self, _: Uuid, _: &Planet) -> Result<u64, BodyError> {
            Ok(0)
        }
        async fn set_planet(&self, _: Uuid, _: &Planet) -> Result<u64, BodyError> {
            Ok(0)
        }
        async fn pull_planet(&self, _: Uuid, _: Uuid) -> Result<u64, BodyError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn zero_affected_after_existence_check_is_concurrent_modification() {
        let inner = MemoryBodyStore::new();

        let star = Star::new(uuidv7(), StarFields::from_form(&star_form()).unwrap());
        let planet = Planet::new(
            uuidv7(),
            PlanetFields::from_form(&planet_form("b", "3", "1")).unwrap(),
            "starlord34",
        );
        inner.insert_star(&star).await.unwrap();
        inner.push_planet(star.id, &planet).await.unwrap();

        let repo = BodyRepository::new(Arc::new(RacingStore(inner)));
        let sid = star.id.to_string();
        let pid = planet.id.to_string();

        for result in [
            repo.update_star(&sid, &star_form()).await,
            repo.delete_star(&sid).await,
            repo.add_planet(&sid, &planet_form("c", "3", "1"), &admin()).await,
            repo.update_planet(&sid, &pid, &planet_form("b", "3", "1"), &admin())
                .await,
            repo.remove_planet(&sid, &pid).await,
        ] {
            assert!(
                matches!(result, Err(BodyError::ConcurrentModification(_))),
                "{result:?}"
            );
        }
    }
}
