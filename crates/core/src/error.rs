//! Client-side validation errors.
//!
//! Raised before any call to the hosted backend; a form that fails
//! validation never produces a network request.

use thiserror::Error;

use crate::types::EmailError;

/// Form input rejected locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A mandatory field was left blank.
    #[error("el campo '{field}' es obligatorio")]
    Required { field: &'static str },

    /// A numeric field could not be parsed.
    #[error("el campo '{field}' debe ser numérico (recibido '{value}')")]
    NotANumber { field: &'static str, value: String },

    /// A numeric field is outside its allowed range.
    #[error("el campo '{field}' debe estar entre {min} y {max} (recibido {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A reference to another record is not a valid ID.
    #[error("el campo '{field}' no hace referencia a un registro válido")]
    InvalidReference { field: &'static str },

    /// Email shape check failed.
    #[error(transparent)]
    Email(#[from] EmailError),
}

impl ValidationError {
    /// Whether this error concerns a latitude/longitude field.
    #[must_use]
    pub fn is_coordinate_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange {
                field: "latitude" | "longitude",
                ..
            } | Self::NotANumber {
                field: "latitude" | "longitude",
                ..
            } | Self::Required {
                field: "latitude" | "longitude"
            }
        )
    }
}
