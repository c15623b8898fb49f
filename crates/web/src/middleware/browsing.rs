//! Per-browser state extractor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::models::session_keys;
use crate::services::browsing::BrowsingState;
use crate::state::AppState;

/// The cart and fetch counters of the requesting browser.
///
/// The browser is identified by a random ID kept in its session; the first
/// request from a new browser assigns one.
pub struct Browsing(pub BrowsingState);

impl FromRequestParts<AppState> for Browsing {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().ok_or_else(|| {
            tracing::error!("Session not found in request extensions - layer missing");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

        let id = match session.get::<Uuid>(session_keys::BROWSING_ID).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                let id = Uuid::new_v4();
                if let Err(e) = session.insert(session_keys::BROWSING_ID, id).await {
                    tracing::warn!(error = %e, "Failed to store browsing ID");
                }
                id
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read browsing ID, starting fresh");
                Uuid::new_v4()
            }
        };

        Ok(Self(state.browsing().get_or_create(id)))
    }
}
