//! Session error types.

use agrotrack_core::{EmailError, ValidationError};
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Input rejected before contacting the backend.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend rejected the sign in.
    #[error("{0}")]
    Authentication(String),

    /// The backend rejected the account creation.
    #[error("{0}")]
    Registration(String),

    /// The identity could not be written to or removed from storage.
    #[error("session storage error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<EmailError> for SessionError {
    fn from(err: EmailError) -> Self {
        Self::Validation(ValidationError::from(err))
    }
}

/// Identity storage failed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PersistenceError(String);

impl PersistenceError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<tower_sessions::session::Error> for PersistenceError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self(err.to_string())
    }
}
