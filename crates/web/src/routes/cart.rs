//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in process memory, keyed by the browsing ID in the
//! session; it is never written to the backend.

use agrotrack_core::ProductId;
use agrotrack_core::cart::{CartChange, CartLine};
use agrotrack_core::catalog;
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{Browsing, OptionalRancher};
use crate::routes::Nav;
use crate::services::cart::CartStore;

/// Cart item display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.unit_price.display(),
            line_price: line.line_total().display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
    /// Set when the last change hit a cart limit.
    pub limit_reached: bool,
}

impl CartView {
    /// Snapshot a cart store for display.
    #[must_use]
    pub fn of(cart: &CartStore) -> Self {
        let snapshot = cart.snapshot();
        Self {
            items: snapshot.lines().iter().map(CartItemView::from).collect(),
            subtotal: snapshot.total_price().display(),
            item_count: snapshot.total_items(),
            limit_reached: false,
        }
    }

    #[must_use]
    pub fn with_change(mut self, change: CartChange) -> Self {
        self.limit_reached = matches!(change, CartChange::LimitReached);
        self
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Nav,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(
    OptionalRancher(rancher): OptionalRancher,
    Browsing(browsing): Browsing,
) -> impl IntoResponse {
    CartShowTemplate {
        nav: Nav::new(rancher.as_ref(), &browsing.cart),
        cart: CartView::of(&browsing.cart),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// Returns the count badge with an HTMX trigger so other cart widgets
/// refresh.
///
/// # Errors
///
/// Returns `AppError::NotFound` for a product outside the catalog.
#[instrument(skip(browsing))]
pub async fn add(
    Browsing(browsing): Browsing,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = catalog::find(&form.product_id).ok_or_else(|| {
        tracing::warn!(product_id = %form.product_id, "Unknown product");
        AppError::NotFound(format!("producto {}", form.product_id))
    })?;

    let change = browsing.cart.add(product);
    if change == CartChange::LimitReached {
        tracing::info!(product_id = %product.id, "Cart limit reached");
    } else {
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: browsing.cart.total_items(),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX). Zero or less removes the item.
#[instrument(skip(browsing))]
pub async fn update(
    Browsing(browsing): Browsing,
    Form(form): Form<UpdateCartForm>,
) -> impl IntoResponse {
    let change = browsing
        .cart
        .update_quantity(&ProductId::new(form.product_id), form.quantity);

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::of(&browsing.cart).with_change(change),
        },
    )
}

/// Remove item from cart (HTMX).
#[instrument(skip(browsing))]
pub async fn remove(
    Browsing(browsing): Browsing,
    Form(form): Form<RemoveFromCartForm>,
) -> impl IntoResponse {
    browsing.cart.remove(&ProductId::new(form.product_id));

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::of(&browsing.cart),
        },
    )
}

/// Get cart count badge (HTMX).
#[instrument(skip_all)]
pub async fn count(Browsing(browsing): Browsing) -> impl IntoResponse {
    CartCountTemplate {
        count: browsing.cart.total_items(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use agrotrack_core::cart::CartLimits;

    use super::*;

    #[test]
    fn test_view_of_scenario_cart() {
        let cart = CartStore::new(CartLimits::default());
        let kit = catalog::find("kit1").unwrap();
        cart.add(kit);
        cart.add(kit);
        cart.add(catalog::find("service1").unwrap());

        let view = CartView::of(&cart);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$3,999.98");
        assert_eq!(view.items[0].line_price, "$3,999.98");
        assert_eq!(view.items[1].price, "$0.00");
    }

    #[test]
    fn test_limit_flag() {
        let cart = CartStore::new(CartLimits::default());
        let view = CartView::of(&cart).with_change(CartChange::LimitReached);
        assert!(view.limit_reached);
        assert!(!CartView::of(&cart).with_change(CartChange::Removed).limit_reached);
    }
}
