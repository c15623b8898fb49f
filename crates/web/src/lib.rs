//! Agrotrack web application library.
//!
//! This crate provides the livestock web application as a library,
//! allowing it to be tested and reused. The binary in `main.rs` only wires
//! configuration, observability and the router together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod reports;
pub mod routes;
pub mod services;
pub mod state;
pub mod supabase;
