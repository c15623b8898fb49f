//! Herd monitoring route handlers (`/monitoreo`).
//!
//! The page lists the herd and shows the ancestry tree of the selected
//! animal. Changing the selection fetches only the tree fragment; when
//! selections overlap, a fragment whose request has been superseded is
//! dropped instead of replacing the newer tree.

use agrotrack_core::AnimalId;
use agrotrack_core::animal::Animal;
use agrotrack_core::pedigree::{Pedigree, PedigreeLimits, build_pedigree};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::{Browsing, RequireRancher};
use crate::routes::animals::{AnimalOption, AnimalRow};
use crate::routes::{Nav, Notice};
use crate::services::herd::HerdService;
use crate::state::AppState;

/// Deepest indentation class used by the tree stylesheet.
const MAX_INDENT: usize = 8;

/// Query parameters selecting the tree root.
#[derive(Debug, Deserialize)]
pub struct AnimalQuery {
    #[serde(alias = "animal_id")]
    pub animal: Option<String>,
}

impl AnimalQuery {
    /// The selected animal, ignoring blank or malformed values.
    fn animal_id(&self) -> Option<AnimalId> {
        self.animal.as_deref()?.trim().parse().ok()
    }
}

/// One line of the rendered ancestry tree.
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub indent: usize,
    pub role: &'static str,
    pub name: String,
    pub attributes: Vec<(&'static str, String)>,
    /// A parent reference here pointed back into this animal's own line.
    pub cycle_cut: bool,
    /// Older generations exist but were left out.
    pub truncated: bool,
}

/// Display data for an ancestry tree.
#[derive(Debug, Clone)]
pub struct PedigreeView {
    pub root_name: String,
    pub rows: Vec<TreeRow>,
    pub generations: usize,
}

impl From<&Pedigree> for PedigreeView {
    fn from(tree: &Pedigree) -> Self {
        let rows = tree
            .rows()
            .iter()
            .map(|node| TreeRow {
                indent: node.depth.min(MAX_INDENT),
                role: node.role.map_or("", |r| r.label()),
                name: node.name.clone(),
                attributes: node.attributes().to_vec(),
                cycle_cut: node.cycle_cut,
                truncated: node.truncated,
            })
            .collect();

        Self {
            root_name: tree.root().name.clone(),
            rows,
            generations: tree.depth(),
        }
    }
}

/// Monitoring page template.
#[derive(Template, WebTemplate)]
#[template(path = "monitoring/index.html")]
pub struct MonitoringTemplate {
    pub nav: Nav,
    pub animals: Vec<AnimalRow>,
    pub options: Vec<AnimalOption>,
    pub tree: Option<PedigreeView>,
    pub notice: Option<Notice>,
}

/// Ancestry tree fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/pedigree.html")]
pub struct PedigreeTemplate {
    pub tree: Option<PedigreeView>,
    pub notice: Option<Notice>,
}

fn pedigree_for(
    animals: &[Animal],
    root: Option<AnimalId>,
    limits: PedigreeLimits,
) -> Option<PedigreeView> {
    root.and_then(|id| build_pedigree(animals, id, limits))
        .as_ref()
        .map(PedigreeView::from)
}

/// Display the herd table and, if an animal is selected, its tree.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
    Query(query): Query<AnimalQuery>,
) -> impl IntoResponse {
    let herd = HerdService::new(state.supabase(), &rancher);

    let (animals, notice) = match herd.animals().await {
        Ok(animals) => (animals, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch animals");
            (Vec::new(), Some(Notice::error(e.user_message())))
        }
    };

    MonitoringTemplate {
        nav: Nav::new(Some(&rancher), &browsing.cart),
        tree: pedigree_for(&animals, query.animal_id(), state.config().pedigree_limits),
        options: AnimalOption::list(&animals, query.animal.as_deref()),
        animals: animals.iter().map(AnimalRow::from).collect(),
        notice,
    }
}

/// Render the tree for a newly selected animal (HTMX).
///
/// If another tree request from the same browser started while this one
/// was waiting on the backend, answers `204` with `HX-Reswap: none` so the
/// newer tree stays on screen.
#[instrument(skip_all)]
pub async fn tree(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
    Query(query): Query<AnimalQuery>,
) -> Response {
    let generation = browsing.pedigree.issue();

    let Some(root) = query.animal_id() else {
        return PedigreeTemplate {
            tree: None,
            notice: None,
        }
        .into_response();
    };

    let result = HerdService::new(state.supabase(), &rancher)
        .pedigree(root, state.config().pedigree_limits)
        .await;

    let Some(result) = browsing.pedigree.accept(generation, result) else {
        tracing::debug!(generation = generation.value(), "Dropping superseded tree");
        return (
            StatusCode::NO_CONTENT,
            AppendHeaders([("HX-Reswap", "none")]),
        )
            .into_response();
    };

    match result {
        Ok(tree) => PedigreeTemplate {
            tree: tree.as_ref().map(PedigreeView::from),
            notice: None,
        }
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build pedigree");
            PedigreeTemplate {
                tree: None,
                notice: Some(Notice::error(e.user_message())),
            }
            .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn animal(id: i64, name: &str, mother: Option<i64>) -> Animal {
        Animal {
            id: AnimalId::new(id),
            ganadero_id: None,
            name: name.to_string(),
            species: "Bovino".to_string(),
            breed: None,
            age: Some(2),
            weight: None,
            location: None,
            latitude: 0.0,
            longitude: 0.0,
            group_name: None,
            mother_id: mother.map(AnimalId::new),
            father_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_query_parses_animal() {
        let q = AnimalQuery {
            animal: Some(" 12 ".to_string()),
        };
        assert_eq!(q.animal_id(), Some(AnimalId::new(12)));

        let blank = AnimalQuery {
            animal: Some(String::new()),
        };
        assert_eq!(blank.animal_id(), None);
    }

    #[test]
    fn test_view_flattens_tree() {
        let herd = vec![animal(1, "Cría", Some(2)), animal(2, "Madre", None)];
        let view = pedigree_for(&herd, Some(AnimalId::new(1)), PedigreeLimits::default()).unwrap();

        assert_eq!(view.root_name, "Cría");
        assert_eq!(view.generations, 2);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[1].role, "Madre");
        assert_eq!(view.rows[1].indent, 1);
        assert_eq!(view.rows[0].attributes[1], ("Raza", "N/A".to_string()));
    }

    #[test]
    fn test_cycle_is_flagged_in_view() {
        let herd = vec![animal(1, "A", Some(2)), animal(2, "B", Some(1))];
        let view = pedigree_for(&herd, Some(AnimalId::new(1)), PedigreeLimits::default()).unwrap();
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows[1].cycle_cut);
    }

    #[test]
    fn test_truncated_branch_is_flagged_in_view() {
        let herd = vec![
            animal(1, "Cría", Some(2)),
            animal(2, "Madre", Some(3)),
            animal(3, "Abuela", None),
        ];
        let limits = PedigreeLimits {
            max_nodes: 2,
            max_generations: 12,
        };
        let view = pedigree_for(&herd, Some(AnimalId::new(1)), limits).unwrap();
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows[1].truncated);
        assert!(!view.rows[0].truncated);
    }

    #[test]
    fn test_no_selection_has_no_tree() {
        let herd = vec![animal(1, "A", None)];
        let limits = PedigreeLimits::default();
        assert!(pedigree_for(&herd, None, limits).is_none());
        assert!(pedigree_for(&herd, Some(AnimalId::new(9)), limits).is_none());
    }
}
