//! Hosted backend client: email/password auth and table access.
//!
//! # Architecture
//!
//! - GoTrue-style auth endpoints under `auth/v1/` (sign in, sign up,
//!   sign out, token introspection)
//! - PostgREST-style table endpoints under `rest/v1/`
//! - Every request carries the anonymous `apikey`; requests made on behalf
//!   of a rancher carry their access token as the bearer, so row level
//!   security on the backend scopes what they can read
//! - Token introspection results are cached with `moka` (60 second TTL)
//!
//! The [`AuthApi`] and [`DataApi`] traits are the seams the session store
//! and the herd service are written against; [`SupabaseClient`] implements
//! both.

mod client;
pub mod query;
pub mod types;

use std::future::Future;

pub use client::SupabaseClient;
pub use query::{Order, TableQuery};
pub use types::*;

use agrotrack_core::Email;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// An insert returned no row.
    #[error("Empty response from {0}")]
    EmptyResponse(String),
}

impl SupabaseError {
    /// Whether the backend rejected the credentials or token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// Message suitable for showing to the rancher.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::RateLimited(secs) => {
                format!("Demasiados intentos, espera {secs} segundos e inténtalo de nuevo")
            }
            _ => "No se pudo contactar al servidor".to_string(),
        }
    }
}

/// Email/password authentication.
pub trait AuthApi: Send + Sync {
    /// Resolve an access token to its user. `Ok(None)` when the backend
    /// rejects the token as invalid or expired.
    fn get_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Option<AuthUser>, SupabaseError>> + Send;

    /// Exchange an email and password for a session.
    fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<AuthSession, SupabaseError>> + Send;

    /// Create an account. The backend may or may not return a session,
    /// depending on whether email confirmation is required.
    fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> impl Future<Output = Result<SignUpResponse, SupabaseError>> + Send;

    /// Revoke the session behind `access_token`.
    fn sign_out(&self, access_token: &str) -> impl Future<Output = Result<(), SupabaseError>> + Send;
}

/// Table reads and inserts.
pub trait DataApi: Send + Sync {
    /// Run a filtered select and decode the rows.
    fn select<T>(
        &self,
        query: &TableQuery,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<Vec<T>, SupabaseError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Insert one row and return it as stored.
    fn insert<R, T>(
        &self,
        table: &str,
        row: &R,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<T, SupabaseError>> + Send
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unauthorized() {
        let err = SupabaseError::Api {
            status: 401,
            message: "invalid JWT".to_string(),
        };
        assert!(err.is_unauthorized());

        let err = SupabaseError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_user_message_hides_transport_details() {
        let err = SupabaseError::EmptyResponse("animals".to_string());
        assert_eq!(err.user_message(), "No se pudo contactar al servidor");

        let err = SupabaseError::Api {
            status: 400,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid login credentials");
    }
}
