//! Star and planet documents.
//!
//! A star is a top-level document; its planets live embedded inside it as an
//! ordered array. Planet ids are nevertheless unique across the whole
//! collection.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator written as `"type"` on every body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Star,
    Planet,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Star => "star",
            Self::Planet => "planet",
        })
    }
}

/// Observation status of a planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanetStatus {
    Confirmed,
    Candidate,
    Disproven,
}

impl PlanetStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Some(Self::Confirmed),
            "candidate" => Some(Self::Candidate),
            "disproven" => Some(Self::Disproven),
            _ => None,
        }
    }
}

/// The scalar part of a star: everything a client may set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarFields {
    pub name: String,
    pub radius: f64,
    /// Solar masses.
    pub mass: f64,
    pub density: f64,
    /// Kelvin.
    pub surface_temperature: f64,
    /// Light years.
    pub distance: f64,
    pub spectral_classification: String,
    pub apparent_magnitude: f64,
    pub absolute_magnitude: f64,
}

/// A star document including its embedded planets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: BodyKind,
    #[serde(flatten)]
    pub fields: StarFields,
    pub planets: Vec<Planet>,
}

impl Star {
    /// A freshly created star has no planets.
    pub fn new(id: Uuid, fields: StarFields) -> Self {
        Self {
            id,
            kind: BodyKind::Star,
            fields,
            planets: Vec::new(),
        }
    }

    pub fn planet(&self, planet_id: Uuid) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == planet_id)
    }
}

/// The client-settable part of a planet. Eccentricity and contributor are
/// derived server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetFields {
    pub name: String,
    pub radius: f64,
    pub mass: f64,
    pub density: f64,
    /// Kelvin.
    pub surface_temperature: f64,
    pub apoapsis: f64,
    pub periapsis: f64,
    pub orbital_period: f64,
    pub status: PlanetStatus,
    pub num_moons: u32,
}

impl PlanetFields {
    /// `(apoapsis - periapsis) / (apoapsis + periapsis)` rounded to two
    /// decimal places. A degenerate orbit with both distances at zero is
    /// circular.
    ///
    /// Both distances are halved first so the sum stays finite for any
    /// finite input.
    pub fn eccentricity(&self) -> f64 {
        let (a, p) = (self.apoapsis / 2.0, self.periapsis / 2.0);
        let sum = a + p;
        if sum == 0.0 {
            return 0.0;
        }
        let e = (a - p) / sum;
        (e * 100.0).round() / 100.0
    }
}

/// A planet as stored inside its parent star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: BodyKind,
    #[serde(flatten)]
    pub fields: PlanetFields,
    pub eccentricity: f64,
    pub contributed_by: String,
}

impl Planet {
    pub fn new(id: Uuid, fields: PlanetFields, contributed_by: impl Into<String>) -> Self {
        let eccentricity = fields.eccentricity();
        Self {
            id,
            kind: BodyKind::Planet,
            fields,
            eccentricity,
            contributed_by: contributed_by.into(),
        }
    }

    /// Replace the settable fields, re-deriving eccentricity. Id and
    /// contributor are kept.
    pub fn with_fields(&self, fields: PlanetFields) -> Self {
        Self::new(self.id, fields, self.contributed_by.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit(apoapsis: f64, periapsis: f64) -> PlanetFields {
        PlanetFields {
            name: "HIP100 b".into(),
            radius: 6000.0,
            mass: 1.0,
            density: 5.5,
            surface_temperature: 288.0,
            apoapsis,
            periapsis,
            orbital_period: 365.0,
            status: PlanetStatus::Confirmed,
            num_moons: 1,
        }
    }

    #[test]
    fn eccentricity_rounds_to_two_places() {
        assert_eq!(orbit(152_100_000.0, 147_095_000.0).eccentricity(), 0.02);
        assert_eq!(orbit(3.0, 1.0).eccentricity(), 0.5);
        assert_eq!(orbit(2.0, 1.0).eccentricity(), 0.33);
        assert_eq!(orbit(1.0, 1.0).eccentricity(), 0.0);
        assert_eq!(orbit(5.0, 0.0).eccentricity(), 1.0);
    }

    #[test]
    fn eccentricity_of_zero_orbit_is_zero() {
        assert_eq!(orbit(0.0, 0.0).eccentricity(), 0.0);
    }

    #[test]
    fn eccentricity_matches_formula_across_samples() {
        for (a, p) in [(10.0, 3.0), (1e9, 4e6), (7.5, 7.4), (123.0, 45.0)] {
            let expected = (((a - p) / (a + p)) * 100.0_f64).round() / 100.0;
            assert_eq!(orbit(a, p).eccentricity(), expected, "a={a} p={p}");
        }
    }

    #[test]
    fn eccentricity_of_huge_orbit_stays_finite() {
        assert_eq!(orbit(1.7e308, 1e308).eccentricity(), 0.26);
        assert_eq!(orbit(f64::MAX, f64::MAX).eccentricity(), 0.0);
        assert_eq!(orbit(f64::MAX, 0.0).eccentricity(), 1.0);
    }

    #[test]
    fn with_fields_keeps_identity_and_owner() {
        let planet = Planet::new(Uuid::nil(), orbit(3.0, 1.0), "starlord34");
        let updated = planet.with_fields(orbit(1.0, 1.0));
        assert_eq!(updated.id, planet.id);
        assert_eq!(updated.contributed_by, "starlord34");
        assert_eq!(updated.eccentricity, 0.0);
    }

    #[test]
    fn planet_serializes_with_type_tag_and_flat_fields() {
        let planet = Planet::new(Uuid::nil(), orbit(3.0, 1.0), "starlord34");
        let json = serde_json::to_value(&planet).unwrap();
        assert_eq!(json["type"], "planet");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["apoapsis"], 3.0);
        assert_eq!(json["eccentricity"], 0.5);

        let back: Planet = serde_json::from_value(json).unwrap();
        assert_eq!(back, planet);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(PlanetStatus::parse("Candidate"), Some(PlanetStatus::Candidate));
        assert_eq!(PlanetStatus::parse("maybe"), None);
    }
}
