//! Shopping cart aggregation.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s, one per product. Adding a
//! product that is already present bumps its quantity instead of adding a
//! second line. Totals are computed from the lines on every read and are
//! never stored.
//!
//! Every operation is total: limits from [`CartLimits`] cap growth and are
//! reported through [`CartChange::LimitReached`] rather than an error.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Money, ProductId};

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    /// Always `>= 1`; a line whose quantity would drop to zero is removed.
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Upper bounds on cart growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLimits {
    pub max_quantity_per_line: u32,
    pub max_lines: usize,
}

impl CartLimits {
    pub const DEFAULT_MAX_QUANTITY: u32 = 99;
    pub const DEFAULT_MAX_LINES: usize = 50;

    /// No practical limit.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_quantity_per_line: u32::MAX,
            max_lines: usize::MAX,
        }
    }
}

impl Default for CartLimits {
    fn default() -> Self {
        Self {
            max_quantity_per_line: Self::DEFAULT_MAX_QUANTITY,
            max_lines: Self::DEFAULT_MAX_LINES,
        }
    }
}

/// What a mutation did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended with quantity 1.
    Added,
    /// An existing line now has this quantity.
    Updated { quantity: u32 },
    /// A line was deleted.
    Removed,
    /// All lines were deleted.
    Cleared,
    /// Nothing matched; the cart is untouched.
    Unchanged,
    /// The request hit a [`CartLimits`] bound and was not (fully) applied.
    LimitReached,
}

impl CartChange {
    /// Whether the line list differs after the operation.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        !matches!(self, Self::Unchanged | Self::LimitReached)
    }
}

/// Aggregated view of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartSummary {
    pub total_items: u64,
    pub total_price: Money,
}

/// The cart for one browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    limits: CartLimits,
}

impl Cart {
    #[must_use]
    pub const fn with_limits(limits: CartLimits) -> Self {
        Self {
            lines: Vec::new(),
            limits,
        }
    }

    #[must_use]
    pub const fn limits(&self) -> CartLimits {
        self.limits
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of a catalog product.
    pub fn add(&mut self, product: &Product) -> CartChange {
        self.add_item(product.id.clone(), &product.name, product.price)
    }

    /// Add one unit of an arbitrary item.
    ///
    /// Increments the existing line for `product_id`, or appends a new line
    /// at the end with quantity 1.
    pub fn add_item(&mut self, product_id: ProductId, name: &str, unit_price: Money) -> CartChange {
        let max_quantity = self.limits.max_quantity_per_line;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            if line.quantity >= max_quantity {
                return CartChange::LimitReached;
            }
            line.quantity += 1;
            return CartChange::Updated {
                quantity: line.quantity,
            };
        }

        if self.lines.len() >= self.limits.max_lines || max_quantity == 0 {
            return CartChange::LimitReached;
        }

        self.lines.push(CartLine {
            product_id,
            name: name.to_owned(),
            unit_price,
            quantity: 1,
        });
        CartChange::Added
    }

    /// Delete the line for `product_id`. Absent ids are a no-op.
    pub fn remove(&mut self, product_id: &ProductId) -> CartChange {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        if self.lines.len() == before {
            CartChange::Unchanged
        } else {
            CartChange::Removed
        }
    }

    /// Set a line's quantity. Zero or negative removes the line; values
    /// above the per-line limit are clamped to it.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> CartChange {
        if quantity <= 0 {
            return self.remove(product_id);
        }

        let max_quantity = self.limits.max_quantity_per_line;
        let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) else {
            return CartChange::Unchanged;
        };

        let requested = u32::try_from(quantity).unwrap_or(u32::MAX);
        line.quantity = requested.min(max_quantity).max(1);
        if requested > max_quantity {
            CartChange::LimitReached
        } else {
            CartChange::Updated {
                quantity: line.quantity,
            }
        }
    }

    /// Empty the cart unconditionally.
    pub fn clear(&mut self) -> CartChange {
        self.lines.clear();
        CartChange::Cleared
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `quantity * unit_price` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            total_items: self.total_items(),
            total_price: self.total_price(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog;

    fn kit() -> &'static Product {
        catalog::find("kit1").unwrap()
    }

    fn consulting() -> &'static Product {
        catalog::find("service1").unwrap()
    }

    #[test]
    fn test_repeated_add_aggregates_into_one_line() {
        let mut cart = Cart::default();
        for _ in 0..7 {
            cart.add(kit());
        }
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_items(), 7);
    }

    #[test]
    fn test_kit_and_service_scenario() {
        let mut cart = Cart::default();
        assert_eq!(cart.add(kit()), CartChange::Added);
        assert_eq!(cart.add(kit()), CartChange::Updated { quantity: 2 });
        assert_eq!(cart.add(consulting()), CartChange::Added);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Money::from_centavos(399_998));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut cart = Cart::default();
        cart.add(consulting());
        cart.add(kit());
        cart.add(consulting());
        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, ["service1", "kit1"]);
    }

    #[test]
    fn test_update_to_zero_equals_remove() {
        let mut a = Cart::default();
        a.add(kit());
        a.add(consulting());
        let mut b = a.clone();

        assert_eq!(a.update_quantity(&ProductId::from("kit1"), 0), CartChange::Removed);
        assert_eq!(b.remove(&ProductId::from("kit1")), CartChange::Removed);
        assert_eq!(a, b);
        assert_eq!(a.total_items(), b.total_items());
    }

    #[test]
    fn test_negative_quantity_removes() {
        let mut cart = Cart::default();
        cart.add(kit());
        cart.update_quantity(&ProductId::from("kit1"), -4);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_sets_quantity() {
        let mut cart = Cart::default();
        cart.add(kit());
        assert_eq!(
            cart.update_quantity(&ProductId::from("kit1"), 5),
            CartChange::Updated { quantity: 5 }
        );
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_update_unknown_line_is_noop() {
        let mut cart = Cart::default();
        assert_eq!(
            cart.update_quantity(&ProductId::from("kit9"), 3),
            CartChange::Unchanged
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::default();
        cart.add(kit());
        assert_eq!(cart.remove(&ProductId::from("nope")), CartChange::Unchanged);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_clear_zeroes_totals() {
        let mut cart = Cart::default();
        cart.add(kit());
        cart.add(consulting());
        cart.clear();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Money::ZERO);
    }

    #[test]
    fn test_quantity_limit_caps_additions() {
        let mut cart = Cart::with_limits(CartLimits {
            max_quantity_per_line: 2,
            max_lines: 10,
        });
        cart.add(kit());
        cart.add(kit());
        assert_eq!(cart.add(kit()), CartChange::LimitReached);
        assert_eq!(cart.total_items(), 2);

        assert_eq!(
            cart.update_quantity(&ProductId::from("kit1"), 40),
            CartChange::LimitReached
        );
        assert_eq!(cart.line(&ProductId::from("kit1")).unwrap().quantity, 2);
    }

    #[test]
    fn test_line_limit_rejects_new_products() {
        let mut cart = Cart::with_limits(CartLimits {
            max_quantity_per_line: 5,
            max_lines: 1,
        });
        cart.add(kit());
        assert_eq!(cart.add(consulting()), CartChange::LimitReached);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.add(kit()), CartChange::Updated { quantity: 2 });
    }

    #[test]
    fn test_unbounded_limits() {
        let mut cart = Cart::with_limits(CartLimits::unbounded());
        for _ in 0..500 {
            cart.add(kit());
        }
        assert_eq!(cart.total_items(), 500);
    }
}
