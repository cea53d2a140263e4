//! Form field validation.
//!
//! Mutating endpoints take url-encoded form bodies. Presence is checked for
//! the whole required set first so a single error can name every missing
//! field; values are then parsed one by one.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::body::{PlanetFields, PlanetStatus, StarFields};

/// Fields every star create/update must carry.
pub const STAR_FIELDS: [&str; 9] = [
    "name",
    "radius",
    "mass",
    "density",
    "surface_temperature",
    "distance",
    "spectral_classification",
    "apparent_magnitude",
    "absolute_magnitude",
];

/// Fields every planet create/update must carry.
pub const PLANET_FIELDS: [&str; 10] = [
    "name",
    "radius",
    "mass",
    "density",
    "surface_temperature",
    "apoapsis",
    "periapsis",
    "orbital_period",
    "status",
    "num_moons",
];

/// Fields required to register an account.
pub const ACCOUNT_FIELDS: [&str; 5] = ["username", "surname", "forename", "email", "password"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing fields: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("invalid value for field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl FieldError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// A decoded form body.
#[derive(Debug, Clone, Default)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self(values)
    }

    /// Fails with every field in `required` that is absent or blank, in the
    /// order given.
    pub fn require(&self, required: &[&str]) -> Result<(), FieldError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| self.get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FieldError::Missing(missing))
        }
    }

    /// Trimmed, non-blank value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn text(&self, name: &str) -> Result<String, FieldError> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| FieldError::Missing(vec![name.to_string()]))
    }

    pub fn number(&self, name: &str) -> Result<f64, FieldError> {
        let raw = self.text(name)?;
        let value: f64 = raw
            .parse()
            .map_err(|_| FieldError::invalid(name, format!("'{raw}' is not a number")))?;
        if !value.is_finite() {
            return Err(FieldError::invalid(name, "must be finite"));
        }
        Ok(value)
    }

    pub fn count(&self, name: &str) -> Result<u32, FieldError> {
        let raw = self.text(name)?;
        raw.parse()
            .map_err(|_| FieldError::invalid(name, format!("'{raw}' is not a whole number")))
    }
}

impl FromIterator<(String, String)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl StarFields {
    pub fn from_form(form: &FormFields) -> Result<Self, FieldError> {
        form.require(&STAR_FIELDS)?;
        Ok(Self {
            name: form.text("name")?,
            radius: form.number("radius")?,
            mass: form.number("mass")?,
            density: form.number("density")?,
            surface_temperature: form.number("surface_temperature")?,
            distance: form.number("distance")?,
            spectral_classification: form.text("spectral_classification")?,
            apparent_magnitude: form.number("apparent_magnitude")?,
            absolute_magnitude: form.number("absolute_magnitude")?,
        })
    }
}

impl PlanetFields {
    /// Parses a planet form. Enforces `apoapsis >= periapsis >= 0`; any
    /// `eccentricity` in the form is ignored since it is always derived.
    pub fn from_form(form: &FormFields) -> Result<Self, FieldError> {
        form.require(&PLANET_FIELDS)?;

        let apoapsis = form.number("apoapsis")?;
        let periapsis = form.number("periapsis")?;
        if periapsis < 0.0 {
            return Err(FieldError::invalid("periapsis", "must not be negative"));
        }
        if apoapsis < periapsis {
            return Err(FieldError::invalid(
                "apoapsis",
                "must be greater than or equal to periapsis",
            ));
        }

        let raw_status = form.text("status")?;
        let status = PlanetStatus::parse(&raw_status).ok_or_else(|| {
            FieldError::invalid(
                "status",
                format!("'{raw_status}' is not one of confirmed, candidate, disproven"),
            )
        })?;

        Ok(Self {
            name: form.text("name")?,
            radius: form.number("radius")?,
            mass: form.number("mass")?,
            density: form.number("density")?,
            surface_temperature: form.number("surface_temperature")?,
            apoapsis,
            periapsis,
            orbital_period: form.number("orbital_period")?,
            status,
            num_moons: form.count("num_moons")?,
        })
    }
}
