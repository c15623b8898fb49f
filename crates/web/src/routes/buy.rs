//! Checkout / contact route handlers (`/buy`).
//!
//! There is no payment step: submitting the form records the request in the
//! logs, empties the cart and thanks the customer.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{Browsing, OptionalRancher};
use crate::routes::Nav;
use crate::routes::cart::CartView;

/// Checkout form data.
#[derive(Debug, Default, Deserialize)]
pub struct BuyForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub message: String,
}

impl BuyForm {
    /// The first missing required field, if any.
    fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("Nombre")
        } else if self.address.trim().is_empty() {
            Some("Dirección")
        } else {
            None
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "buy/show.html")]
pub struct BuyTemplate {
    pub nav: Nav,
    pub cart: CartView,
    pub form: BuyForm,
    pub error: Option<String>,
}

/// Shown after the order has been sent.
#[derive(Template, WebTemplate)]
#[template(path = "buy/thanks.html")]
pub struct ThanksTemplate {
    pub nav: Nav,
}

/// Display the checkout form with the order summary.
#[instrument(skip_all)]
pub async fn show(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    BuyTemplate {
        nav: Nav::new(rancher.as_ref(), &browsing.cart),
        cart: CartView::of(&browsing.cart),
        form: BuyForm::default(),
        error: None,
    }
}

/// Submit the order or contact request and clear the cart.
#[instrument(skip_all)]
pub async fn submit(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
    Form(form): Form<BuyForm>,
) -> Response {
    if let Some(field) = form.missing_field() {
        return BuyTemplate {
            nav: Nav::new(rancher.as_ref(), &browsing.cart),
            cart: CartView::of(&browsing.cart),
            error: Some(format!("El campo '{field}' es obligatorio")),
            form,
        }
        .into_response();
    }

    let summary = browsing.cart.summary();
    tracing::info!(
        items = summary.total_items,
        total = %summary.total_price,
        has_message = !form.message.trim().is_empty(),
        "Order request received"
    );
    add_breadcrumb("checkout", "Order request submitted", None);

    browsing.cart.clear();

    ThanksTemplate {
        nav: Nav::new(rancher.as_ref(), &browsing.cart),
    }
    .into_response()
}
