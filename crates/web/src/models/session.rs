//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use agrotrack_core::{Email, RancherId};

use crate::supabase::AuthUser;

/// The signed-in rancher.
///
/// Persisted in the session so a returning browser is recognized. The access
/// token is only ever sent back to the hosted backend; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Auth user ID, also the `ganadero_id` owning their animals.
    pub id: RancherId,
    pub email: Email,
    /// Name given at signup, if any.
    pub display_name: Option<String>,
    access_token: String,
}

impl UserIdentity {
    /// Build an identity from an auth user and the token that proved it.
    ///
    /// The backend may omit the email from the user object; `fallback_email`
    /// (the address the rancher typed) is used then.
    #[must_use]
    pub fn from_auth(user: &AuthUser, fallback_email: &Email, access_token: String) -> Self {
        let email = user
            .email
            .as_deref()
            .and_then(|e| Email::parse(e).ok())
            .unwrap_or_else(|| fallback_email.clone());
        Self {
            id: RancherId::new(user.id),
            email,
            display_name: user
                .user_metadata
                .nombre
                .clone()
                .filter(|n| !n.trim().is_empty()),
            access_token,
        }
    }

    /// Refresh the profile fields from a freshly verified user, keeping the token.
    #[must_use]
    pub fn refreshed(self, user: &AuthUser) -> Self {
        let email = self.email.clone();
        let token = self.access_token;
        Self::from_auth(user, &email, token)
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Name to greet the rancher with.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.email.as_str())
    }
}

impl std::fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserIdentity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for the persisted signed-in identity.
    pub const USER: &str = "user";

    /// Key for the per-browser ID that carts and fetch counters hang off.
    pub const BROWSING_ID: &str = "browsing_id";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::supabase::UserMetadata;

    fn user(email: Option<&str>, nombre: Option<&str>) -> AuthUser {
        AuthUser {
            id: Uuid::nil(),
            email: email.map(str::to_string),
            user_metadata: UserMetadata {
                nombre: nombre.map(str::to_string),
                ..UserMetadata::default()
            },
        }
    }

    #[test]
    fn test_from_auth_prefers_backend_email() {
        let typed = Email::parse("Ana@Rancho.mx").unwrap();
        let identity = UserIdentity::from_auth(
            &user(Some("ana@rancho.mx"), Some("Ana")),
            &typed,
            "t".to_string(),
        );
        assert_eq!(identity.email.as_str(), "ana@rancho.mx");
        assert_eq!(identity.greeting_name(), "Ana");
    }

    #[test]
    fn test_from_auth_falls_back_to_typed_email() {
        let typed = Email::parse("ana@rancho.mx").unwrap();
        let identity = UserIdentity::from_auth(&user(None, Some("  ")), &typed, "t".to_string());
        assert_eq!(identity.email, typed);
        assert_eq!(identity.display_name, None);
        assert_eq!(identity.greeting_name(), "ana@rancho.mx");
    }

    #[test]
    fn test_debug_redacts_token() {
        let typed = Email::parse("ana@rancho.mx").unwrap();
        let identity = UserIdentity::from_auth(&user(None, None), &typed, "jwt-value".to_string());
        assert!(!format!("{identity:?}").contains("jwt-value"));
        assert_eq!(identity.access_token(), "jwt-value");
    }

    #[test]
    fn test_round_trips_through_session_json() {
        let typed = Email::parse("ana@rancho.mx").unwrap();
        let identity = UserIdentity::from_auth(&user(None, Some("Ana")), &typed, "jwt".to_string());
        let json = serde_json::to_value(&identity).unwrap();
        let back: UserIdentity = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity);
    }
}
