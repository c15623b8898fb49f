//! Storefront route handlers.

use agrotrack_core::catalog::{self, Product};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::filters;
use crate::middleware::{Browsing, OptionalRancher};
use crate::routes::Nav;

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopTemplate {
    pub nav: Nav,
    pub products: &'static [Product],
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/show.html")]
pub struct ProductTemplate {
    pub nav: Nav,
    pub product: &'static Product,
}

/// Shown for an unknown product id.
#[derive(Template, WebTemplate)]
#[template(path = "shop/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub nav: Nav,
}

/// Display all products.
#[instrument(skip_all)]
pub async fn index(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    ShopTemplate {
        nav: Nav::new(rancher.as_ref(), &browsing.cart),
        products: catalog::all(),
    }
}

/// Display one product.
#[instrument(skip(rancher, browsing))]
pub async fn show(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
    Path(id): Path<String>,
) -> Response {
    let nav = Nav::new(rancher.as_ref(), &browsing.cart);

    match catalog::find(&id) {
        Some(product) => ProductTemplate { nav, product }.into_response(),
        None => (StatusCode::NOT_FOUND, ProductNotFoundTemplate { nav }).into_response(),
    }
}
