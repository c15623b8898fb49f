//! Types stored in the browser session.

pub mod session;

pub use session::{UserIdentity, keys as session_keys};
