//! Business logic services.
//!
//! # Services
//!
//! - `session` - Who is signed in (login, signup, logout, restore)
//! - `cart` - Shopping cart store with change notifications
//! - `browsing` - Per-browser in-memory state (cart, fetch counters)
//! - `herd` - Animals and health records, scoped to the rancher

pub mod browsing;
pub mod cart;
pub mod herd;
pub mod session;
