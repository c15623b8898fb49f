//! Session store.
//!
//! Single source of truth for "who is signed in". Wraps an [`AuthApi`] and
//! an [`IdentityPersistence`]; identity changes are published on a `watch`
//! channel so any number of observers can follow them.

mod error;
mod persistence;

pub use error::{PersistenceError, SessionError};
pub use persistence::{IdentityPersistence, MemoryPersistence};

use std::sync::Arc;

use agrotrack_core::{Email, ValidationError};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::models::UserIdentity;
use crate::supabase::{AuthApi, SignUpRequest, SignUpResponse, UserMetadata};

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LENGTH: u32 = 6;

/// Sign in input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Account creation input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: SecretString,
    pub nombre: String,
    pub telefono: String,
    pub direccion: String,
}

/// Result of a successful signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// The backend returned a session; the rancher is signed in.
    SignedIn(UserIdentity),
    /// The account exists but must be confirmed by email before sign in.
    ConfirmationPending { email: Email },
}

/// Cheaply cloneable handle to one session.
pub struct SessionStore<A, P> {
    inner: Arc<SessionStoreInner<A, P>>,
}

struct SessionStoreInner<A, P> {
    auth: A,
    persistence: P,
    identity: watch::Sender<Option<UserIdentity>>,
}

impl<A, P> Clone for SessionStore<A, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: AuthApi, P: IdentityPersistence> SessionStore<A, P> {
    /// Create a store with no identity. Call [`Self::restore`] to pick up a
    /// persisted one.
    #[must_use]
    pub fn new(auth: A, persistence: P) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            inner: Arc::new(SessionStoreInner {
                auth,
                persistence,
                identity,
            }),
        }
    }

    /// The current identity.
    #[must_use]
    pub fn identity(&self) -> Option<UserIdentity> {
        self.inner.identity.borrow().clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.inner.identity.borrow().is_some()
    }

    /// Follow identity changes. The receiver starts at the current value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.inner.identity.subscribe()
    }

    fn publish(&self, identity: Option<UserIdentity>) {
        self.inner.identity.send_replace(identity);
    }

    /// Load and verify the persisted identity.
    ///
    /// Never fails: a missing, unreadable, expired or unverifiable identity
    /// leaves the store signed out. An identity the backend rejects is also
    /// removed from storage; one that could not be checked is kept for the
    /// next attempt.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Option<UserIdentity> {
        let stored = match self.inner.persistence.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Could not read persisted identity");
                None
            }
        };

        let Some(stored) = stored else {
            self.publish(None);
            return None;
        };

        let restored = match self.inner.auth.get_user(stored.access_token()).await {
            Ok(Some(user)) => Some(stored.refreshed(&user)),
            Ok(None) => {
                info!(rancher_id = %stored.id, "Persisted session expired");
                if let Err(e) = self.inner.persistence.clear().await {
                    warn!(error = %e, "Could not clear expired identity");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not verify persisted session, treating as signed out");
                None
            }
        };

        self.publish(restored.clone());
        restored
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` for a malformed email or empty
    /// password (no request is made), `SessionError::Authentication` when
    /// the backend rejects the credentials, and `SessionError::Persistence`
    /// if the identity cannot be stored. The current identity is unchanged
    /// on error.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<UserIdentity, SessionError> {
        let email = Email::parse(&credentials.email)?;
        if credentials.password.expose_secret().is_empty() {
            return Err(ValidationError::Required { field: "password" }.into());
        }

        let session = self
            .inner
            .auth
            .sign_in(&email, &credentials.password)
            .await
            .map_err(|e| SessionError::Authentication(e.user_message()))?;

        let identity = UserIdentity::from_auth(&session.user, &email, session.access_token);
        self.inner.persistence.save(&identity).await?;
        self.publish(Some(identity.clone()));

        info!(rancher_id = %identity.id, "Rancher signed in");
        Ok(identity)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` for a malformed email, a short
    /// password or a missing name (no request is made),
    /// `SessionError::Registration` when the backend rejects the account,
    /// and `SessionError::Persistence` if a returned session cannot be stored.
    #[instrument(skip(self, registration))]
    pub async fn signup(&self, registration: &Registration) -> Result<SignupOutcome, SessionError> {
        let email = Email::parse(&registration.email)?;
        let password_len = registration.password.expose_secret().chars().count();
        let length = u32::try_from(password_len).unwrap_or(u32::MAX);
        if length < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: "password",
                value: f64::from(length),
                min: f64::from(MIN_PASSWORD_LENGTH),
                max: f64::from(u16::MAX),
            }
            .into());
        }
        let nombre = registration.nombre.trim();
        if nombre.is_empty() {
            return Err(ValidationError::Required { field: "nombre" }.into());
        }

        let request = SignUpRequest {
            email: email.clone(),
            password: registration.password.clone(),
            metadata: UserMetadata {
                nombre: Some(nombre.to_string()),
                telefono: non_blank(&registration.telefono),
                direccion: non_blank(&registration.direccion),
            },
        };

        let response = self
            .inner
            .auth
            .sign_up(&request)
            .await
            .map_err(|e| SessionError::Registration(e.user_message()))?;

        match response {
            SignUpResponse::Session(session) => {
                let identity = UserIdentity::from_auth(&session.user, &email, session.access_token);
                self.inner.persistence.save(&identity).await?;
                self.publish(Some(identity.clone()));
                info!(rancher_id = %identity.id, "Rancher signed up and signed in");
                Ok(SignupOutcome::SignedIn(identity))
            }
            SignUpResponse::User(user) => {
                info!(user_id = %user.id, "Rancher signed up, confirmation pending");
                Ok(SignupOutcome::ConfirmationPending { email })
            }
        }
    }

    /// Sign out.
    ///
    /// Never fails. The token revoked at the backend is the stored one, read
    /// without verifying it first, so a backend that cannot verify tokens
    /// right now still gets asked to revoke it. The backend sign out is
    /// best-effort; storage is cleared next; the in-memory identity is
    /// cleared last, so observers only see "signed out" once nothing would
    /// restore the old identity.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let stored = self.inner.persistence.load().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not read persisted identity for sign out");
            None
        });

        if let Some(identity) = stored.or_else(|| self.identity())
            && let Err(e) = self.inner.auth.sign_out(identity.access_token()).await
        {
            warn!(error = %e, "Backend sign out failed, clearing local session anyway");
        }

        if let Err(e) = self.inner.persistence.clear().await {
            warn!(error = %e, "Could not clear persisted identity");
        }

        self.publish(None);
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use uuid::Uuid;

    use super::*;
    use crate::supabase::{AuthSession, AuthUser, SupabaseError};

    /// Scripted auth backend counting its calls.
    #[derive(Default)]
    struct FakeAuth {
        calls: AtomicUsize,
        reject_sign_in: bool,
        confirm_by_email: bool,
        valid_token: Mutex<Option<String>>,
        sign_out_fails: bool,
        signed_out: Mutex<Vec<String>>,
    }

    fn user() -> AuthUser {
        AuthUser {
            id: Uuid::from_u128(7),
            email: Some("ana@rancho.mx".to_string()),
            user_metadata: UserMetadata {
                nombre: Some("Ana".to_string()),
                ..UserMetadata::default()
            },
        }
    }

    fn session() -> AuthSession {
        AuthSession {
            access_token: "jwt-1".to_string(),
            refresh_token: None,
            expires_in: Some(3600),
            user: user(),
        }
    }

    impl AuthApi for FakeAuth {
        async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let valid = self.valid_token.lock().unwrap().clone();
            Ok((valid.as_deref() == Some(access_token)).then(user))
        }

        async fn sign_in(
            &self,
            _email: &Email,
            _password: &SecretString,
        ) -> Result<AuthSession, SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reject_sign_in {
                return Err(SupabaseError::Api {
                    status: 400,
                    message: "Invalid login credentials".to_string(),
                });
            }
            Ok(session())
        }

        async fn sign_up(&self, _request: &SignUpRequest) -> Result<SignUpResponse, SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.confirm_by_email {
                Ok(SignUpResponse::User(user()))
            } else {
                Ok(SignUpResponse::Session(session()))
            }
        }

        async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.signed_out.lock().unwrap().push(access_token.to_string());
            if self.sign_out_fails {
                return Err(SupabaseError::RateLimited(5));
            }
            Ok(())
        }
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: SecretString::from(password),
        }
    }

    fn registration(email: &str, password: &str, nombre: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: SecretString::from(password),
            nombre: nombre.to_string(),
            telefono: " ".to_string(),
            direccion: "Rancho El Mezquite".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_sets_and_persists_identity() {
        let persistence = MemoryPersistence::new();
        let store = SessionStore::new(FakeAuth::default(), persistence.clone());
        let mut changes = store.subscribe();

        let identity = store
            .login(&credentials("ana@rancho.mx", "secreto1"))
            .await
            .unwrap();

        assert_eq!(identity.display_name.as_deref(), Some("Ana"));
        assert_eq!(store.identity(), Some(identity.clone()));
        assert_eq!(persistence.stored(), Some(identity));
        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email_without_request() {
        let store = SessionStore::new(FakeAuth::default(), MemoryPersistence::new());
        let err = store
            .login(&credentials("ana-rancho.mx", "secreto1"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(store.inner.auth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_identity_unchanged() {
        let auth = FakeAuth {
            reject_sign_in: true,
            ..FakeAuth::default()
        };
        let store = SessionStore::new(auth, MemoryPersistence::new());
        let err = store
            .login(&credentials("ana@rancho.mx", "equivocada"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Authentication(msg) if msg == "Invalid login credentials"));
        assert_eq!(store.identity(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let auth = FakeAuth {
            sign_out_fails: true,
            ..FakeAuth::default()
        };
        let persistence = MemoryPersistence::new();
        let store = SessionStore::new(auth, persistence.clone());
        store
            .login(&credentials("ana@rancho.mx", "secreto1"))
            .await
            .unwrap();

        store.logout().await;

        assert_eq!(store.identity(), None);
        assert_eq!(persistence.stored(), None);
    }

    #[tokio::test]
    async fn test_logout_revokes_stored_token_without_verifying() {
        let stored = UserIdentity::from_auth(
            &user(),
            &Email::parse("ana@rancho.mx").unwrap(),
            "jwt-stored".to_string(),
        );
        let persistence = MemoryPersistence::with_identity(stored);
        let store = SessionStore::new(FakeAuth::default(), persistence.clone());

        store.logout().await;

        assert_eq!(*store.inner.auth.signed_out.lock().unwrap(), ["jwt-stored"]);
        assert_eq!(store.inner.auth.calls.load(Ordering::SeqCst), 1);
        assert_eq!(persistence.stored(), None);
        assert!(!store.is_signed_in());
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let auth = FakeAuth::default();
        *auth.valid_token.lock().unwrap() = Some("jwt-1".to_string());
        let stored = UserIdentity::from_auth(
            &user(),
            &Email::parse("ana@rancho.mx").unwrap(),
            "jwt-1".to_string(),
        );
        let store = SessionStore::new(auth, MemoryPersistence::with_identity(stored.clone()));

        assert_eq!(store.restore().await, Some(stored));
        assert!(store.is_signed_in());
    }

    #[tokio::test]
    async fn test_restore_with_expired_token_clears_storage() {
        let stored = UserIdentity::from_auth(
            &user(),
            &Email::parse("ana@rancho.mx").unwrap(),
            "jwt-old".to_string(),
        );
        let persistence = MemoryPersistence::with_identity(stored);
        let store = SessionStore::new(FakeAuth::default(), persistence.clone());

        assert_eq!(store.restore().await, None);
        assert!(!store.is_signed_in());
        assert_eq!(persistence.stored(), None);
    }

    #[tokio::test]
    async fn test_restore_with_nothing_stored() {
        let store = SessionStore::new(FakeAuth::default(), MemoryPersistence::new());
        assert_eq!(store.restore().await, None);
        assert_eq!(store.inner.auth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_signup_with_session_signs_in() {
        let store = SessionStore::new(FakeAuth::default(), MemoryPersistence::new());
        let outcome = store
            .signup(&registration("ana@rancho.mx", "secreto1", "Ana"))
            .await
            .unwrap();
        assert!(matches!(outcome, SignupOutcome::SignedIn(_)));
        assert!(store.is_signed_in());
    }

    #[tokio::test]
    async fn test_signup_pending_confirmation_stays_signed_out() {
        let auth = FakeAuth {
            confirm_by_email: true,
            ..FakeAuth::default()
        };
        let store = SessionStore::new(auth, MemoryPersistence::new());
        let outcome = store
            .signup(&registration("ana@rancho.mx", "secreto1", "Ana"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SignupOutcome::ConfirmationPending {
                email: Email::parse("ana@rancho.mx").unwrap()
            }
        );
        assert!(!store.is_signed_in());
    }

    #[tokio::test]
    async fn test_signup_validates_before_request() {
        let store = SessionStore::new(FakeAuth::default(), MemoryPersistence::new());

        let short = store
            .signup(&registration("ana@rancho.mx", "12345", "Ana"))
            .await
            .unwrap_err();
        assert!(matches!(
            short,
            SessionError::Validation(ValidationError::OutOfRange { field: "password", .. })
        ));

        let nameless = store
            .signup(&registration("ana@rancho.mx", "secreto1", "  "))
            .await
            .unwrap_err();
        assert!(matches!(
            nameless,
            SessionError::Validation(ValidationError::Required { field: "nombre" })
        ));

        assert_eq!(store.inner.auth.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank(" 555 "), Some("555".to_string()));
    }
}
