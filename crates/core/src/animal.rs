//! Livestock records and the registration form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{AnimalId, Coordinates, RancherId};

/// An animal row as stored by the hosted backend (`animals` table).
///
/// Read-only from this application's perspective apart from inserts.
/// `mother_id`/`father_id` are weak references into the same table and
/// are not guaranteed to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    #[serde(default)]
    pub ganadero_id: Option<RancherId>,
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub mother_id: Option<AnimalId>,
    #[serde(default)]
    pub father_id: Option<AnimalId>,
    pub created_at: DateTime<Utc>,
}

/// The columns fetched for the location map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalLocation {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Raw registration form input, exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimalForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub mother_id: String,
    #[serde(default)]
    pub father_id: String,
}

/// A validated row ready to be inserted into `animals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnimal {
    pub ganadero_id: RancherId,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub location: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub group_name: Option<String>,
    pub mother_id: Option<AnimalId>,
    pub father_id: Option<AnimalId>,
}

impl AnimalForm {
    /// Validate the form for the given owner.
    ///
    /// Blank optional fields become `None`. Coordinates are mandatory and
    /// must be in range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, owner: RancherId) -> Result<NewAnimal, ValidationError> {
        let name = required("name", &self.name)?;
        let species = required("species", &self.species)?;

        let latitude = parse_number("latitude", required("latitude", &self.latitude)?)?;
        let longitude = parse_number("longitude", required("longitude", &self.longitude)?)?;
        let position = Coordinates::new(latitude, longitude)?;

        let age = optional(&self.age)
            .map(|raw| {
                raw.parse::<u32>().map_err(|_| ValidationError::NotANumber {
                    field: "age",
                    value: raw.to_owned(),
                })
            })
            .transpose()?;

        let weight = optional(&self.weight)
            .map(|raw| parse_number("weight", raw))
            .transpose()?;
        if let Some(w) = weight
            && w < 0.0
        {
            return Err(ValidationError::OutOfRange {
                field: "weight",
                value: w,
                min: 0.0,
                max: f64::MAX,
            });
        }

        let mother_id = parse_reference("mother_id", &self.mother_id)?;
        let father_id = parse_reference("father_id", &self.father_id)?;

        Ok(NewAnimal {
            ganadero_id: owner,
            name: name.to_owned(),
            species: species.to_owned(),
            breed: optional(&self.breed).map(str::to_owned),
            age,
            weight,
            location: optional(&self.location).map(str::to_owned),
            latitude: position.latitude(),
            longitude: position.longitude(),
            group_name: optional(&self.group_name).map(str::to_owned),
            mother_id,
            father_id,
        })
    }
}

fn optional(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub(crate) fn required<'a>(field: &'static str, raw: &'a str) -> Result<&'a str, ValidationError> {
    optional(raw).ok_or(ValidationError::Required { field })
}

pub(crate) fn parse_number(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            value: raw.to_owned(),
        })
}

fn parse_reference(field: &'static str, raw: &str) -> Result<Option<AnimalId>, ValidationError> {
    optional(raw)
        .map(|id| {
            id.parse::<AnimalId>()
                .map_err(|_| ValidationError::InvalidReference { field })
        })
        .transpose()
}
