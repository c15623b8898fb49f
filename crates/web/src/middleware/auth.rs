//! Authentication extractors.
//!
//! Every extractor here builds a [`WebSession`] over the request's browser
//! session and restores the persisted identity through it, so a token the
//! backend no longer accepts signs the browser out on the next request.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::UserIdentity;
use crate::services::session::SessionStore;
use crate::state::AppState;
use crate::supabase::SupabaseClient;

/// The session store as used by request handlers.
pub type WebSession = SessionStore<SupabaseClient, Session>;

/// Path unauthenticated visitors are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Extractor for the session store itself, for handlers that change who is
/// signed in.
pub struct CurrentSession(pub WebSession);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::Unauthorized)?;

        Ok(Self(SessionStore::new(state.supabase().clone(), session)))
    }
}

/// Extractor that requires a signed-in rancher.
///
/// If nobody is signed in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireRancher(rancher): RequireRancher) -> impl IntoResponse {
///     format!("Hola, {}!", rancher.greeting_name())
/// }
/// ```
pub struct RequireRancher(pub UserIdentity);

/// Error returned when a rancher is required but nobody is signed in.
pub enum AuthRejection {
    /// Redirect to login page (for full page requests).
    RedirectToLogin,
    /// Ask HTMX to navigate to the login page (for fragment requests).
    HtmxRedirect,
    /// No session layer in front of the handler.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::HtmxRedirect => (
                StatusCode::UNAUTHORIZED,
                AppendHeaders([("HX-Redirect", LOGIN_PATH)]),
            )
                .into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireRancher {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession(store) = CurrentSession::from_request_parts(parts, state).await?;

        store.restore().await.map(Self).ok_or_else(|| {
            if parts.headers.contains_key("HX-Request") {
                AuthRejection::HtmxRedirect
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor that optionally gets the signed-in rancher.
///
/// Unlike `RequireRancher`, this does not reject the request if nobody is
/// signed in.
pub struct OptionalRancher(pub Option<UserIdentity>);

impl FromRequestParts<AppState> for OptionalRancher {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let rancher = match CurrentSession::from_request_parts(parts, state).await {
            Ok(CurrentSession(store)) => store.restore().await,
            Err(_) => None,
        };

        Ok(Self(rancher))
    }
}
