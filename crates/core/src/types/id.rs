//! Newtype IDs for type-safe record references.
//!
//! Table rows in the hosted backend use `bigint` identity columns, so the
//! `define_id!` macro wraps an `i64`. Ranchers are identified by the auth
//! user UUID and catalog products by a short string slug.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a type-safe row ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - `new()`, `as_i64()`, `Display` and `FromStr`
///
/// # Example
///
/// ```rust
/// # use agrotrack_core::define_id;
/// define_id!(PenId);
/// define_id!(FeedLotId);
///
/// let pen = PenId::new(7);
/// let parsed: PenId = "7".parse().unwrap();
/// assert_eq!(pen, parsed);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(AnimalId);
define_id!(HealthRecordId);

/// Identifier of a rancher (ganadero), i.e. the auth user ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RancherId(Uuid);

impl RancherId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RancherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RancherId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Catalog product slug (e.g. `kit1`, `service1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_animal_id_parses_trimmed_input() {
        let id: AnimalId = " 42 ".parse().unwrap();
        assert_eq!(id, AnimalId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_animal_id_rejects_garbage() {
        assert!("vaca".parse::<AnimalId>().is_err());
        assert!("".parse::<AnimalId>().is_err());
    }

    #[test]
    fn test_animal_id_serde_is_transparent() {
        let json = serde_json::to_string(&AnimalId::new(9)).unwrap();
        assert_eq!(json, "9");
    }

    #[test]
    fn test_rancher_id_round_trips_through_display() {
        let id = RancherId::new(Uuid::new_v4());
        let parsed: RancherId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
