//! Geographic coordinates with range validation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A WGS84 position, guaranteed to be within range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
    pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

    /// Validate a latitude/longitude pair.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] when either value is not finite
    /// or falls outside its range (bounds inclusive).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        check_range("latitude", latitude, Self::LATITUDE_RANGE)?;
        check_range("longitude", longitude, Self::LONGITUDE_RANGE)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), ValidationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let err = Coordinates::new(200.0, 0.0).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: "latitude",
                ..
            }
        ));
    }

    #[test]
    fn test_longitude_out_of_range() {
        assert!(Coordinates::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }
}
