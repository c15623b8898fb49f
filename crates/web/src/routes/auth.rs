//! Authentication route handlers.
//!
//! Login, signup and logout all go through the [`SessionStore`] bound to
//! the browser session; the hosted backend does the actual credential
//! checks.
//!
//! [`SessionStore`]: crate::services::session::SessionStore

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Browsing, CurrentSession, OptionalRancher};
use crate::routes::Nav;
use crate::services::session::{
    Credentials, MIN_PASSWORD_LENGTH, Registration, SessionError, SignupOutcome,
};

/// Where a rancher lands after signing in.
const AFTER_LOGIN_PATH: &str = "/home";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signup form data.
#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub direccion: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub email: String,
    pub error: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub nav: Nav,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
    pub direccion: String,
    pub min_password_length: u32,
    pub error: Option<String>,
}

/// Shown when the account must be confirmed by email first.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup_pending.html")]
pub struct SignupPendingTemplate {
    pub nav: Nav,
    pub email: String,
}

/// Message for a failed login.
fn login_error_message(err: &SessionError) -> String {
    match err {
        SessionError::Validation(e) => e.to_string(),
        SessionError::Authentication(_) => "Correo electrónico o contraseña incorrectos".to_string(),
        SessionError::Registration(_) | SessionError::Persistence(_) => {
            "Error al iniciar sesión".to_string()
        }
    }
}

/// Message for a failed signup.
fn signup_error_message(err: &SessionError) -> String {
    match err {
        SessionError::Validation(e) => e.to_string(),
        SessionError::Registration(message) if !message.is_empty() => message.clone(),
        _ => "Error al registrar el usuario".to_string(),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page, or skip it when already signed in.
#[instrument(skip_all)]
pub async fn login_page(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
) -> Response {
    if rancher.is_some() {
        return Redirect::to(AFTER_LOGIN_PATH).into_response();
    }

    LoginTemplate {
        nav: Nav::new(None, &browsing.cart),
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    CurrentSession(store): CurrentSession,
    Browsing(browsing): Browsing,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = Credentials {
        email: form.email.clone(),
        password: SecretString::from(form.password),
    };

    match store.login(&credentials).await {
        Ok(identity) => {
            set_sentry_user(&identity.id, Some(identity.email.as_str()));
            add_breadcrumb("auth", "Rancher signed in", None);
            Redirect::to(AFTER_LOGIN_PATH).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            LoginTemplate {
                nav: Nav::new(None, &browsing.cart),
                email: form.email,
                error: Some(login_error_message(&e)),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
#[instrument(skip_all)]
pub async fn signup_page(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
) -> Response {
    if rancher.is_some() {
        return Redirect::to(AFTER_LOGIN_PATH).into_response();
    }

    SignupTemplate {
        nav: Nav::new(None, &browsing.cart),
        nombre: String::new(),
        email: String::new(),
        telefono: String::new(),
        direccion: String::new(),
        min_password_length: MIN_PASSWORD_LENGTH,
        error: None,
    }
    .into_response()
}

/// Handle signup form submission.
///
/// Depending on the backend's confirmation policy the rancher is either
/// signed in right away or asked to confirm their email first.
#[instrument(skip_all)]
pub async fn signup(
    CurrentSession(store): CurrentSession,
    Browsing(browsing): Browsing,
    Form(form): Form<SignupForm>,
) -> Response {
    let registration = Registration {
        email: form.email.clone(),
        password: SecretString::from(form.password),
        nombre: form.nombre.clone(),
        telefono: form.telefono.clone(),
        direccion: form.direccion.clone(),
    };

    match store.signup(&registration).await {
        Ok(SignupOutcome::SignedIn(identity)) => {
            set_sentry_user(&identity.id, Some(identity.email.as_str()));
            add_breadcrumb("auth", "Rancher signed up", None);
            Redirect::to(AFTER_LOGIN_PATH).into_response()
        }
        Ok(SignupOutcome::ConfirmationPending { email }) => SignupPendingTemplate {
            nav: Nav::new(None, &browsing.cart),
            email: email.to_string(),
        }
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Signup failed");
            SignupTemplate {
                nav: Nav::new(None, &browsing.cart),
                nombre: form.nombre,
                email: form.email,
                telefono: form.telefono,
                direccion: form.direccion,
                min_password_length: MIN_PASSWORD_LENGTH,
                error: Some(signup_error_message(&e)),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Always ends signed out, even if the backend could not be reached.
#[instrument(skip_all)]
pub async fn logout(CurrentSession(store): CurrentSession) -> Redirect {
    store.logout().await;
    clear_sentry_user();
    add_breadcrumb("auth", "Rancher signed out", None);
    Redirect::to("/welcome")
}

#[cfg(test)]
mod tests {
    use agrotrack_core::ValidationError;

    use super::*;

    #[test]
    fn test_login_hides_backend_message() {
        let err = SessionError::Authentication("Invalid login credentials".to_string());
        assert_eq!(
            login_error_message(&err),
            "Correo electrónico o contraseña incorrectos"
        );
    }

    #[test]
    fn test_login_shows_validation_message() {
        let err = SessionError::Validation(ValidationError::Required { field: "password" });
        assert!(login_error_message(&err).contains("password"));
    }

    #[test]
    fn test_signup_shows_backend_message() {
        let err = SessionError::Registration("User already registered".to_string());
        assert_eq!(signup_error_message(&err), "User already registered");

        let blank = SessionError::Registration(String::new());
        assert_eq!(signup_error_message(&blank), "Error al registrar el usuario");
    }
}
