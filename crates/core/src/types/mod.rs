//! Core value types for Agrotrack.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coordinates;
pub mod email;
pub mod id;
pub mod money;

pub use coordinates::Coordinates;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
