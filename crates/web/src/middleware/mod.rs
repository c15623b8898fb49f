//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame denial, etc.)
//! 5. Session layer (tower-sessions, bounded in-memory store)
//!
//! Extractors built on the session: [`RequireRancher`], [`OptionalRancher`],
//! [`CurrentSession`] and [`Browsing`].

pub mod auth;
pub mod browsing;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AuthRejection, CurrentSession, OptionalRancher, RequireRancher, WebSession};
pub use browsing::Browsing;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{MokaSessionStore, create_session_layer};
