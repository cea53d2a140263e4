//! Listing order and response presentation for bodies.

use std::cmp::Ordering;

use serde::Serialize;
use uuid::Uuid;

use crate::fields::FieldError;
use crate::models::body::{BodyKind, Planet, Star, StarFields};

/// Kilometres per light year.
const KM_PER_LIGHT_YEAR: f64 = 9.46e12;

/// Kelvin to Celsius offset (rounded, as the catalogue data is).
const KELVIN_OFFSET: f64 = 273.0;

/// Kilograms per solar mass.
const KG_PER_SOLAR_MASS: f64 = 1.99e30;

/// Star field a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Radius,
    Mass,
    Density,
    SurfaceTemperature,
    Distance,
    SpectralClassification,
    ApparentMagnitude,
    AbsoluteMagnitude,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "name" => Self::Name,
            "radius" => Self::Radius,
            "mass" => Self::Mass,
            "density" => Self::Density,
            "surface_temperature" => Self::SurfaceTemperature,
            "distance" => Self::Distance,
            "spectral_classification" => Self::SpectralClassification,
            "apparent_magnitude" => Self::ApparentMagnitude,
            "absolute_magnitude" => Self::AbsoluteMagnitude,
            _ => return None,
        })
    }

    /// Column name in the `bodies` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Radius => "radius",
            Self::Mass => "mass",
            Self::Density => "density",
            Self::SurfaceTemperature => "surface_temperature",
            Self::Distance => "distance",
            Self::SpectralClassification => "spectral_classification",
            Self::ApparentMagnitude => "apparent_magnitude",
            Self::AbsoluteMagnitude => "absolute_magnitude",
        }
    }

    fn compare(&self, a: &StarFields, b: &StarFields) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::SpectralClassification => a.spectral_classification.cmp(&b.spectral_classification),
            Self::Radius => a.radius.total_cmp(&b.radius),
            Self::Mass => a.mass.total_cmp(&b.mass),
            Self::Density => a.density.total_cmp(&b.density),
            Self::SurfaceTemperature => a.surface_temperature.total_cmp(&b.surface_temperature),
            Self::Distance => a.distance.total_cmp(&b.distance),
            Self::ApparentMagnitude => a.apparent_magnitude.total_cmp(&b.apparent_magnitude),
            Self::AbsoluteMagnitude => a.absolute_magnitude.total_cmp(&b.absolute_magnitude),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Listing order. Without a field, stars come back in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StarOrder {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl StarOrder {
    /// Parse the `order` query value: `mass` sorts ascending, `-mass`
    /// descending.
    pub fn parse(raw: Option<&str>) -> Result<Self, FieldError> {
        let raw = match raw.map(str::trim).filter(|r| !r.is_empty()) {
            None => return Ok(Self::default()),
            Some(r) => r,
        };
        let (direction, name) = match raw.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (SortDirection::Ascending, raw),
        };
        let field = SortField::parse(name).ok_or_else(|| FieldError::Invalid {
            field: "order".into(),
            reason: format!("cannot order by '{name}'"),
        })?;
        Ok(Self {
            field: Some(field),
            direction,
        })
    }

    /// Order two stars; ties fall back to id, which is creation order.
    pub fn compare(&self, a: &Star, b: &Star) -> Ordering {
        let primary = match self.field {
            None => Ordering::Equal,
            Some(field) => field.compare(&a.fields, &b.fields),
        };
        let primary = match self.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// How bodies are rendered in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub include_planets: bool,
    pub convert_units: bool,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            include_planets: true,
            convert_units: false,
        }
    }
}

/// A star as sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: BodyKind,
    #[serde(flatten)]
    pub fields: StarFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planets: Option<Vec<Planet>>,
}

impl Presentation {
    pub fn star(&self, star: Star) -> StarView {
        let fields = if self.convert_units {
            convert_star(star.fields)
        } else {
            star.fields
        };
        let planets = self.include_planets.then(|| {
            star.planets
                .into_iter()
                .map(|p| self.planet(p))
                .collect()
        });
        StarView {
            id: star.id,
            kind: star.kind,
            fields,
            planets,
        }
    }

    pub fn planet(&self, planet: Planet) -> Planet {
        if self.convert_units {
            convert_planet(planet)
        } else {
            planet
        }
    }
}

/// Light years to km, Kelvin to Celsius, solar masses to kg.
pub fn convert_star(mut fields: StarFields) -> StarFields {
    fields.distance *= KM_PER_LIGHT_YEAR;
    fields.surface_temperature -= KELVIN_OFFSET;
    fields.mass *= KG_PER_SOLAR_MASS;
    fields
}

/// Kelvin to Celsius. Planet masses are not solar masses and stay as stored.
pub fn convert_planet(mut planet: Planet) -> Planet {
    planet.fields.surface_temperature -= KELVIN_OFFSET;
    planet
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, mass: f64) -> StarFields {
        StarFields {
            name: name.into(),
            radius: 500000.0,
            mass,
            density: 1.4,
            surface_temperature: 5000.0,
            distance: 10.0,
            spectral_classification: "G".into(),
            apparent_magnitude: 4.8,
            absolute_magnitude: 4.8,
        }
    }

    #[test]
    fn parse_order() {
        assert_eq!(StarOrder::parse(None).unwrap(), StarOrder::default());
        let desc = StarOrder::parse(Some("-mass")).unwrap();
        assert_eq!(desc.field, Some(SortField::Mass));
        assert_eq!(desc.direction, SortDirection::Descending);
        assert!(StarOrder::parse(Some("planets")).is_err());
        assert!(StarOrder::parse(Some("mass; DROP TABLE bodies")).is_err());
    }

    #[test]
    fn compare_falls_back_to_id() {
        let a = Star::new(Uuid::from_u128(1), fields("B", 1.0));
        let b = Star::new(Uuid::from_u128(2), fields("A", 1.0));
        let by_mass = StarOrder::parse(Some("-mass")).unwrap();
        assert_eq!(by_mass.compare(&a, &b), Ordering::Less);
        let by_name = StarOrder::parse(Some("name")).unwrap();
        assert_eq!(by_name.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn conversion_is_linear() {
        let converted = convert_star(fields("HIP100", 1.0));
        assert!((converted.distance - 9.46e13).abs() < 1.0);
        assert_eq!(converted.surface_temperature, 4727.0);
        assert_eq!(converted.mass, 1.99e30);
    }

    #[test]
    fn presentation_can_hide_planets() {
        let star = Star::new(Uuid::nil(), fields("HIP100", 1.0));
        let view = Presentation {
            include_planets: false,
            convert_units: false,
        }
        .star(star.clone());
        assert!(view.planets.is_none());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("planets").is_none());
        assert_eq!(json["type"], "star");

        let view = Presentation::default().star(star);
        assert_eq!(view.planets, Some(Vec::new()));
    }
}
