//! Health record route handlers (`/enfermedades`).

use agrotrack_core::{AnimalId, ValidationError};
use agrotrack_core::health::{HealthForm, HealthRecord};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Response},
};
use tracing::instrument;

use crate::filters;
use crate::middleware::{Browsing, RequireRancher};
use crate::routes::animals::AnimalOption;
use crate::routes::monitoring::AnimalQuery;
use crate::routes::{Nav, Notice};
use crate::services::herd::{HerdError, HerdService};
use crate::state::AppState;
use crate::supabase::SupabaseClient;

const SELECT_ANIMAL_MESSAGE: &str = "Por favor, selecciona un animal.";
const ADDED_MESSAGE: &str = "Registro de salud agregado exitosamente.";
const ADD_FAILED_MESSAGE: &str = "Error al agregar el registro de salud.";

/// Health record row display data for templates.
#[derive(Debug, Clone)]
pub struct HealthRow {
    pub recorded_at: String,
    pub temperature: String,
    pub heart_rate: String,
    pub respiratory_rate: String,
    pub notes: String,
    pub sick: bool,
    /// Labels of the signs above normal, comma separated.
    pub findings: String,
}

impl From<&HealthRecord> for HealthRow {
    fn from(record: &HealthRecord) -> Self {
        let signs = record.abnormal_signs();
        Self {
            recorded_at: record.created_at.format("%d/%m/%Y %H:%M").to_string(),
            temperature: format!("{:.1}", record.temperature),
            heart_rate: record.heart_rate.map(|v| v.to_string()).unwrap_or_default(),
            respiratory_rate: record
                .respiratory_rate
                .map(|v| v.to_string())
                .unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
            sick: !signs.is_empty(),
            findings: signs
                .iter()
                .map(|s| s.label())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Health page template.
#[derive(Template, WebTemplate)]
#[template(path = "diseases/index.html")]
pub struct DiseasesTemplate {
    pub nav: Nav,
    pub options: Vec<AnimalOption>,
    /// The selected animal's id, empty when none is selected.
    pub selected: String,
    pub records: Vec<HealthRow>,
    pub form: HealthForm,
    pub notice: Option<Notice>,
}

/// Health history fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/health_records.html")]
pub struct HealthRecordsTemplate {
    pub records: Vec<HealthRow>,
    pub notice: Option<Notice>,
}

/// Message shown next to the form for a rejected record.
fn add_error_message(err: &HerdError) -> String {
    match err {
        HerdError::Validation(
            ValidationError::Required { field: "animal_id" }
            | ValidationError::InvalidReference { field: "animal_id" },
        ) => SELECT_ANIMAL_MESSAGE.to_string(),
        HerdError::Validation(e) => e.to_string(),
        HerdError::Query(_) => ADD_FAILED_MESSAGE.to_string(),
    }
}

async fn load_records(
    herd: &HerdService<'_, SupabaseClient>,
    animal: Option<AnimalId>,
) -> Result<Vec<HealthRow>, HerdError> {
    let Some(animal) = animal else {
        return Ok(Vec::new());
    };
    let records = herd.health_records(animal).await?;
    Ok(records.iter().map(HealthRow::from).collect())
}

/// Render the whole page for `selected`.
async fn render_page(
    herd: &HerdService<'_, SupabaseClient>,
    nav: Nav,
    selected: Option<&str>,
    form: HealthForm,
    mut notice: Option<Notice>,
) -> DiseasesTemplate {
    let animals = match herd.animals().await {
        Ok(animals) => animals,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch animals");
            notice = notice.or_else(|| Some(Notice::error(e.user_message())));
            Vec::new()
        }
    };

    // Only the rancher's own animals can be inspected.
    let selected_id = selected
        .and_then(|s| s.trim().parse::<AnimalId>().ok())
        .filter(|id| animals.iter().any(|a| a.id == *id));

    let records = match load_records(herd, selected_id).await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch health records");
            notice = notice.or_else(|| Some(Notice::error(e.user_message())));
            Vec::new()
        }
    };

    DiseasesTemplate {
        nav,
        options: AnimalOption::list(&animals, selected),
        selected: selected_id.map(|id| id.to_string()).unwrap_or_default(),
        records,
        form,
        notice,
    }
}

/// Display the animal picker, the selected animal's history and the form.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
    Query(query): Query<AnimalQuery>,
) -> impl IntoResponse {
    let herd = HerdService::new(state.supabase(), &rancher);
    render_page(
        &herd,
        Nav::new(Some(&rancher), &browsing.cart),
        query.animal.as_deref(),
        HealthForm::default(),
        None,
    )
    .await
}

/// Render the history of a newly selected animal (HTMX).
///
/// Superseded requests answer `204` with `HX-Reswap: none`.
#[instrument(skip_all)]
pub async fn records(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
    Query(query): Query<AnimalQuery>,
) -> Response {
    let generation = browsing.health_records.issue();
    let animal = query
        .animal
        .as_deref()
        .and_then(|s| s.trim().parse::<AnimalId>().ok());

    let herd = HerdService::new(state.supabase(), &rancher);
    let result = load_records(&herd, animal).await;

    let Some(result) = browsing.health_records.accept(generation, result) else {
        tracing::debug!(generation = generation.value(), "Dropping superseded history");
        return (
            StatusCode::NO_CONTENT,
            AppendHeaders([("HX-Reswap", "none")]),
        )
            .into_response();
    };

    let (records, notice) = match result {
        Ok(records) => (records, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch health records");
            (Vec::new(), Some(Notice::error(e.user_message())))
        }
    };

    HealthRecordsTemplate { records, notice }.into_response()
}

/// Add a health record for the selected animal.
#[instrument(skip_all)]
pub async fn add_record(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
    Form(form): Form<HealthForm>,
) -> impl IntoResponse {
    let herd = HerdService::new(state.supabase(), &rancher);
    let selected = form.animal_id.clone();

    let (form, notice) = match herd.add_health_record(&form).await {
        Ok(record) => {
            let notice = if record.is_sick() {
                Notice::error(format!(
                    "{ADDED_MESSAGE} Atención: el animal presenta signos de enfermedad."
                ))
            } else {
                Notice::success(ADDED_MESSAGE)
            };
            (HealthForm::default(), notice)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health record rejected");
            let message = add_error_message(&e);
            (form, Notice::error(message))
        }
    };

    render_page(
        &herd,
        Nav::new(Some(&rancher), &browsing.cart),
        Some(selected.as_str()).filter(|s| !s.is_empty()),
        form,
        Some(notice),
    )
    .await
}
