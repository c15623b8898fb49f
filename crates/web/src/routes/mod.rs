//! HTTP route handlers for the livestock application.
//!
//! # Route Structure
//!
//! ```text
//! GET  /welcome                - Landing page
//! GET  /faq                    - Frequently asked questions
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /signup                 - Signup page
//! POST /signup                 - Signup action
//! POST /logout                 - Logout action
//!
//! # Herd (requires auth)
//! GET  /home                   - Dashboard
//! GET  /registrodevacas        - Animal registration form and table
//! POST /registrodevacas        - Register an animal
//! GET  /mapa                   - Animal location map
//! GET  /monitoreo              - Herd table and ancestry tree
//! GET  /monitoreo/tree         - Ancestry tree fragment (HTMX)
//! GET  /enfermedades           - Health records
//! POST /enfermedades           - Add a health record
//! GET  /enfermedades/records   - Health history fragment (HTMX)
//! GET  /reportes               - Analytics reports
//!
//! # Shop
//! GET  /shop                   - Product listing
//! GET  /product/{id}           - Product detail
//! GET  /buy                    - Checkout / contact form
//! POST /buy                    - Submit order, clears the cart
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! Anything else redirects to /welcome.
//! ```

pub mod animals;
pub mod auth;
pub mod buy;
pub mod cart;
pub mod diseases;
pub mod map;
pub mod monitoring;
pub mod pages;
pub mod reports;
pub mod shop;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::models::UserIdentity;
use crate::services::cart::CartStore;
use crate::state::AppState;

/// Where unknown paths are sent.
pub const FALLBACK_PATH: &str = "/welcome";

/// Navigation bar data shared by every full page.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub signed_in: bool,
    pub name: String,
    pub cart_items: u64,
}

impl Nav {
    #[must_use]
    pub fn new(rancher: Option<&UserIdentity>, cart: &CartStore) -> Self {
        Self {
            signed_in: rancher.is_some(),
            name: rancher
                .map(|r| r.greeting_name().to_string())
                .unwrap_or_default(),
            cart_items: cart.total_items(),
        }
    }
}

/// A one-off message shown above a form after it is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub is_error: bool,
    pub text: String,
}

impl Notice {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            text: text.into(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the herd routes router. Every handler here requires a rancher.
pub fn herd_routes() -> Router<AppState> {
    Router::new()
        .route("/home", get(pages::home))
        .route(
            "/registrodevacas",
            get(animals::index).post(animals::register),
        )
        .route("/mapa", get(map::index))
        .route("/monitoreo", get(monitoring::index))
        .route("/monitoreo/tree", get(monitoring::tree))
        .route(
            "/enfermedades",
            get(diseases::index).post(diseases::add_record),
        )
        .route("/enfermedades/records", get(diseases::records))
        .route("/reportes", get(reports::index))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to(FALLBACK_PATH) }))
        .route("/welcome", get(pages::welcome))
        .route("/faq", get(pages::faq))
        .merge(auth_routes())
        .merge(herd_routes())
        // Shop
        .route("/shop", get(shop::index))
        .route("/product/{id}", get(shop::show))
        .route("/buy", get(buy::show).post(buy::submit))
        .nest("/cart", cart_routes())
        .fallback(fallback)
}

/// Send unknown paths to the landing page.
async fn fallback() -> Redirect {
    Redirect::to(FALLBACK_PATH)
}
