//! Health records and the sickness heuristic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::animal::{parse_number, required};
use crate::error::ValidationError;
use crate::types::{AnimalId, HealthRecordId};

/// Normal temperature ceiling in °C.
pub const NORMAL_TEMPERATURE: f64 = 38.5;
/// Normal heart rate ceiling in beats per minute.
pub const NORMAL_HEART_RATE: u32 = 60;
/// Normal respiratory rate ceiling in breaths per minute.
pub const NORMAL_RESPIRATORY_RATE: u32 = 30;

/// A row of the `health_records` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: HealthRecordId,
    pub animal_id: AnimalId,
    pub temperature: f64,
    #[serde(default)]
    pub heart_rate: Option<u32>,
    #[serde(default)]
    pub respiratory_rate: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A vital sign above its normal ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbnormalSign {
    Fever,
    Tachycardia,
    Tachypnea,
}

impl AbnormalSign {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Fever => "Temperatura elevada",
            Self::Tachycardia => "Frecuencia cardíaca elevada",
            Self::Tachypnea => "Frecuencia respiratoria elevada",
        }
    }
}

impl HealthRecord {
    /// Signs above their normal ceilings. Missing rates are not evaluated.
    #[must_use]
    pub fn abnormal_signs(&self) -> Vec<AbnormalSign> {
        let mut signs = Vec::new();
        if self.temperature > NORMAL_TEMPERATURE {
            signs.push(AbnormalSign::Fever);
        }
        if self.heart_rate.is_some_and(|hr| hr > NORMAL_HEART_RATE) {
            signs.push(AbnormalSign::Tachycardia);
        }
        if self
            .respiratory_rate
            .is_some_and(|rr| rr > NORMAL_RESPIRATORY_RATE)
        {
            signs.push(AbnormalSign::Tachypnea);
        }
        signs
    }

    #[must_use]
    pub fn is_sick(&self) -> bool {
        !self.abnormal_signs().is_empty()
    }
}

/// Raw health form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthForm {
    #[serde(default)]
    pub animal_id: String,
    #[serde(default)]
    pub temperature: String,
    #[serde(default)]
    pub heart_rate: String,
    #[serde(default)]
    pub respiratory_rate: String,
    #[serde(default)]
    pub notes: String,
}

/// A validated row ready to be inserted into `health_records`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewHealthRecord {
    pub animal_id: AnimalId,
    pub temperature: f64,
    pub heart_rate: Option<u32>,
    pub respiratory_rate: Option<u32>,
    pub notes: Option<String>,
}

impl HealthForm {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when no animal is selected, the
    /// temperature is missing or not numeric, or a rate is not a whole number.
    pub fn validate(&self) -> Result<NewHealthRecord, ValidationError> {
        let animal_id = required("animal_id", &self.animal_id)?
            .parse::<AnimalId>()
            .map_err(|_| ValidationError::InvalidReference { field: "animal_id" })?;
        let temperature = parse_number("temperature", required("temperature", &self.temperature)?)?;

        Ok(NewHealthRecord {
            animal_id,
            temperature,
            heart_rate: parse_rate("heart_rate", &self.heart_rate)?,
            respiratory_rate: parse_rate("respiratory_rate", &self.respiratory_rate)?,
            notes: Some(self.notes.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_owned),
        })
    }
}

fn parse_rate(field: &'static str, raw: &str) -> Result<Option<u32>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_owned(),
        })
}
