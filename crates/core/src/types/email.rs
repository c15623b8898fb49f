//! Email address type used for login and signup.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons an email address is rejected before reaching the auth backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("el correo electrónico es obligatorio")]
    Empty,
    #[error("el correo electrónico no puede superar {max} caracteres")]
    TooLong { max: usize },
    #[error("el correo electrónico no es válido")]
    Malformed,
}

/// A syntactically plausible email address.
///
/// Only the shape is checked (`local@domain` with a dot in the domain); the
/// auth backend remains the authority on whether the address exists.
///
/// ```
/// use agrotrack_core::Email;
///
/// assert!(Email::parse("rancho@ejemplo.mx").is_ok());
/// assert!(Email::parse("sin-arroba").is_err());
/// assert!(Email::parse("usuario@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 upper bound.
    pub const MAX_LENGTH: usize = 254;

    /// Parse an email, trimming surrounding whitespace and lowercasing it.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the input is empty, too long, or does not
    /// look like `local@domain.tld`.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let value = input.trim();
        if value.is_empty() {
            return Err(EmailError::Empty);
        }
        if value.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = value.split_once('@').ok_or(EmailError::Malformed)?;
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.');
        if local.is_empty() || !domain_ok || value.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        Ok(Self(value.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
