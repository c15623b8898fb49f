//! Animal registration route handlers (`/registrodevacas`).

use agrotrack_core::animal::{Animal, AnimalForm};
use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::middleware::{Browsing, RequireRancher};
use crate::routes::{Nav, Notice};
use crate::services::herd::{HerdError, HerdService};
use crate::state::AppState;
use crate::supabase::SupabaseClient;

const COORDINATES_MESSAGE: &str = "Por favor, ingresa coordenadas válidas para la ubicación.";
const LOAD_FAILED_MESSAGE: &str = "Error al obtener los animales.";

/// Animal table row display data for templates.
#[derive(Debug, Clone)]
pub struct AnimalRow {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub weight: String,
    pub location: String,
    pub group_name: String,
    pub registered_on: String,
}

impl From<&Animal> for AnimalRow {
    fn from(animal: &Animal) -> Self {
        Self {
            id: animal.id.to_string(),
            name: animal.name.clone(),
            species: animal.species.clone(),
            breed: animal.breed.clone().unwrap_or_default(),
            age: animal.age.map(|a| a.to_string()).unwrap_or_default(),
            weight: animal.weight.map(|w| format!("{w}")).unwrap_or_default(),
            location: animal.location.clone().unwrap_or_default(),
            group_name: animal.group_name.clone().unwrap_or_default(),
            registered_on: animal.created_at.format("%d/%m/%Y").to_string(),
        }
    }
}

/// An entry of an animal `<select>`.
#[derive(Debug, Clone)]
pub struct AnimalOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

impl AnimalOption {
    /// Options for every animal, marking the one matching `selected`.
    #[must_use]
    pub fn list(animals: &[Animal], selected: Option<&str>) -> Vec<Self> {
        animals
            .iter()
            .map(|a| {
                let id = a.id.to_string();
                Self {
                    selected: selected == Some(id.as_str()),
                    name: a.name.clone(),
                    id,
                }
            })
            .collect()
    }
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "animals/index.html")]
pub struct AnimalsTemplate {
    pub nav: Nav,
    pub animals: Vec<AnimalRow>,
    pub parents: Vec<AnimalOption>,
    pub form: AnimalForm,
    pub notice: Option<Notice>,
}

/// Message shown next to the form for a failed registration.
fn register_error_message(err: &HerdError) -> String {
    match err {
        HerdError::Validation(e) if e.is_coordinate_error() => COORDINATES_MESSAGE.to_string(),
        HerdError::Validation(e) => e.to_string(),
        HerdError::Query(_) => "Error al agregar el animal.".to_string(),
    }
}

/// Load the herd, turning a failure into a notice.
async fn load_animals(herd: &HerdService<'_, SupabaseClient>) -> (Vec<Animal>, Option<Notice>) {
    match herd.animals().await {
        Ok(animals) => (animals, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch animals");
            (Vec::new(), Some(Notice::error(LOAD_FAILED_MESSAGE)))
        }
    }
}

fn render(nav: Nav, animals: &[Animal], form: AnimalForm, notice: Option<Notice>) -> AnimalsTemplate {
    AnimalsTemplate {
        nav,
        animals: animals.iter().map(AnimalRow::from).collect(),
        parents: AnimalOption::list(animals, None),
        form,
        notice,
    }
}

/// Display the registration form and the rancher's animals.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    let herd = HerdService::new(state.supabase(), &rancher);
    let (animals, notice) = load_animals(&herd).await;

    render(
        Nav::new(Some(&rancher), &browsing.cart),
        &animals,
        AnimalForm::default(),
        notice,
    )
}

/// Register an animal.
///
/// The form is validated before anything is sent; rejected input is shown
/// again with the reason.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    RequireRancher(rancher): RequireRancher,
    Browsing(browsing): Browsing,
    Form(form): Form<AnimalForm>,
) -> impl IntoResponse {
    let herd = HerdService::new(state.supabase(), &rancher);

    let (form, notice) = match herd.register(&form).await {
        Ok(animal) => (
            AnimalForm::default(),
            Notice::success(format!("{} fue registrado exitosamente.", animal.name)),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Animal registration failed");
            let message = register_error_message(&e);
            (form, Notice::error(message))
        }
    };

    let (animals, load_notice) = load_animals(&herd).await;
    render(
        Nav::new(Some(&rancher), &browsing.cart),
        &animals,
        form,
        load_notice.or(Some(notice)),
    )
}
