//! Animal location map (`/mapa`).
//!
//! Markers are embedded as a JSON data block and drawn by
//! `/static/js/map.js`; the same points are listed in a table underneath.

use agrotrack_core::animal::AnimalLocation;
use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::{Browsing, RequireRancher};
use crate::routes::{Nav, Notice};
use crate::services::herd::HerdService;
use crate::state::AppState;

/// Map page template.
#[derive(Template, WebTemplate)]
#[template(path = "map/index.html")]
pub struct MapTemplate {
    pub nav: Nav,
    pub locations: Vec<AnimalLocation>,
    /// `locations` as JSON, safe to embed inside a `<script>` element.
    pub markers_json: String,
    pub notice: Option<Notice>,
}

/// Serialize markers for embedding in a `<script type="application/json">`.
///
/// `<` is escaped so a name containing `</script>` cannot end the block.
fn markers_json(locations: &[AnimalLocation]) -> String {
    serde_json::to_string(locations)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c")
}

/// Display the location map.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    let herd = HerdService::new(state.supabase(), &rancher);

    let (locations, notice) = match herd.locations().await {
        Ok(locations) => (locations, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch locations");
            (Vec::new(), Some(Notice::error(e.user_message())))
        }
    };

    MapTemplate {
        nav: Nav::new(Some(&rancher), &browsing.cart),
        markers_json: markers_json(&locations),
        locations,
        notice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_cannot_close_script() {
        let locations = vec![AnimalLocation {
            name: "</script><b>".to_string(),
            location: None,
            latitude: 19.4,
            longitude: -99.1,
        }];
        let json = markers_json(&locations);
        assert!(!json.contains("</script>"));
        assert!(json.contains("\\u003c/script>"));
    }

    #[test]
    fn test_empty_markers() {
        assert_eq!(markers_json(&[]), "[]");
    }
}
