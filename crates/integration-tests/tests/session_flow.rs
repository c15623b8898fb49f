//! Session scenarios: sign in, restore and sign out.

#![allow(clippy::unwrap_used)]

use agrotrack_integration_tests::{ScriptedAuth, rancher};
use agrotrack_web::services::session::{
    Credentials, MemoryPersistence, SessionError, SessionStore,
};
use secrecy::SecretString;

const PASSWORD: &str = "pastizal-2026";

fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "lucia@rancho.mx".to_string(),
        password: SecretString::from(password),
    }
}

#[tokio::test]
async fn test_login_then_logout_clears_storage() {
    let persistence = MemoryPersistence::new();
    let store = SessionStore::new(ScriptedAuth::accepting(PASSWORD), persistence.clone());
    let mut changes = store.subscribe();

    let identity = store.login(&credentials(PASSWORD)).await.unwrap();
    assert_eq!(identity.greeting_name(), "Lucía");
    assert_eq!(persistence.stored(), Some(identity));
    assert!(changes.borrow_and_update().is_some());

    store.logout().await;

    assert!(!store.is_signed_in());
    assert_eq!(persistence.stored(), None);
    assert!(changes.has_changed().unwrap());
    assert!(changes.borrow_and_update().is_none());
}

#[tokio::test]
async fn test_wrong_password_keeps_signed_out() {
    let persistence = MemoryPersistence::new();
    let store = SessionStore::new(ScriptedAuth::accepting(PASSWORD), persistence.clone());

    let err = store.login(&credentials("otra")).await.unwrap_err();

    assert!(matches!(err, SessionError::Authentication(_)));
    assert!(!store.is_signed_in());
    assert_eq!(persistence.stored(), None);
}

#[tokio::test]
async fn test_session_survives_into_a_new_store() {
    let auth = ScriptedAuth::accepting(PASSWORD);
    let persistence = MemoryPersistence::new();
    SessionStore::new(auth.clone(), persistence.clone())
        .login(&credentials(PASSWORD))
        .await
        .unwrap();

    // Same storage, fresh store: as on the next request from the browser.
    let next = SessionStore::new(auth, persistence);
    assert!(!next.is_signed_in());

    let restored = next.restore().await.unwrap();
    assert_eq!(restored.access_token(), ScriptedAuth::TOKEN);
    assert!(next.is_signed_in());
}

#[tokio::test]
async fn test_expired_token_is_forgotten_on_restore() {
    let auth = ScriptedAuth::accepting(PASSWORD);
    let persistence = MemoryPersistence::with_identity(rancher("jwt-old"));
    let store = SessionStore::new(auth.clone(), persistence.clone());

    assert_eq!(store.restore().await, None);
    assert_eq!(persistence.stored(), None);
    assert_eq!(auth.calls(), 1);
}

#[tokio::test]
async fn test_malformed_email_never_reaches_backend() {
    let auth = ScriptedAuth::accepting(PASSWORD);
    let store = SessionStore::new(auth.clone(), MemoryPersistence::new());

    let err = store
        .login(&Credentials {
            email: "lucia-at-rancho".to_string(),
            password: SecretString::from(PASSWORD),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(auth.calls(), 0);
}
