//! Agrotrack Core - domain types and pure logic.
//!
//! This crate holds everything in the livestock application that can be
//! expressed without I/O:
//! - [`cart`] - shopping cart aggregation and totals
//! - [`pedigree`] - ancestry tree construction over possibly cyclic data
//! - [`animal`] and [`health`] - records and form validation
//! - [`report`] - interpretation of analytics report payloads
//! - [`catalog`] - the storefront products
//! - [`generation`] - stale-response guards for overlapping fetches
//!
//! # Architecture
//!
//! No database access, no HTTP clients. The `agrotrack-web` crate owns all
//! communication with the hosted backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod animal;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod generation;
pub mod health;
pub mod pedigree;
pub mod report;
pub mod types;

pub use error::ValidationError;
pub use types::*;
