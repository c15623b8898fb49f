//! Cart store.
//!
//! Owns one [`Cart`] behind a lock and republishes its [`CartSummary`]
//! whenever the totals move, so the navigation badge and any other
//! observer stay in sync without polling the lines. Reads through the store
//! always compute totals from the lines; the channel only notifies.

use std::sync::{Arc, PoisonError, RwLock};

use agrotrack_core::ProductId;
use agrotrack_core::cart::{Cart, CartChange, CartLimits, CartLine, CartSummary};
use agrotrack_core::catalog::Product;
use agrotrack_core::types::Money;
use tokio::sync::watch;

/// Cheaply cloneable handle to one browsing session's cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    cart: RwLock<Cart>,
    summary: watch::Sender<CartSummary>,
}

impl CartStore {
    #[must_use]
    pub fn new(limits: CartLimits) -> Self {
        let cart = Cart::with_limits(limits);
        let (summary, _) = watch::channel(cart.summary());
        Self {
            inner: Arc::new(CartStoreInner {
                cart: RwLock::new(cart),
                summary,
            }),
        }
    }

    /// Add one unit of `product`.
    pub fn add(&self, product: &Product) -> CartChange {
        self.mutate(|cart| cart.add(product))
    }

    pub fn remove(&self, product_id: &ProductId) -> CartChange {
        self.mutate(|cart| cart.remove(product_id))
    }

    /// Set a line's quantity; zero or below removes it.
    pub fn update_quantity(&self, product_id: &ProductId, quantity: i64) -> CartChange {
        self.mutate(|cart| cart.update_quantity(product_id, quantity))
    }

    pub fn clear(&self) -> CartChange {
        self.mutate(Cart::clear)
    }

    /// A copy of the cart as it is now.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.read(Clone::clone)
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.read(|cart| cart.lines().to_vec())
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.read(Cart::total_items)
    }

    #[must_use]
    pub fn total_price(&self) -> Money {
        self.read(Cart::total_price)
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.read(Cart::summary)
    }

    /// Follow total changes. The receiver starts at the current value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.inner.summary.subscribe()
    }

    fn read<T>(&self, f: impl FnOnce(&Cart) -> T) -> T {
        let cart = self.inner.cart.read().unwrap_or_else(PoisonError::into_inner);
        f(&*cart)
    }

    /// Apply `f` and publish the new summary if the totals moved.
    ///
    /// The summary is sent while the write lock is held so observers never
    /// see totals out of order with the lines.
    fn mutate(&self, f: impl FnOnce(&mut Cart) -> CartChange) -> CartChange {
        let mut cart = self
            .inner
            .cart
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let change = f(&mut *cart);
        let next = cart.summary();
        self.inner.summary.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        change
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agrotrack_core::catalog;

    use super::*;

    #[test]
    fn test_add_publishes_summary() {
        let store = CartStore::new(CartLimits::default());
        let mut badge = store.subscribe();
        let kit = catalog::find("kit1").unwrap();

        assert_eq!(store.add(kit), CartChange::Added);
        assert!(badge.has_changed().unwrap());
        assert_eq!(badge.borrow_and_update().total_items, 1);
        assert_eq!(store.total_price(), kit.price);
    }

    #[test]
    fn test_unchanged_does_not_notify() {
        let store = CartStore::new(CartLimits::default());
        let mut badge = store.subscribe();
        badge.borrow_and_update();

        assert_eq!(store.remove(&ProductId::new("kit1")), CartChange::Unchanged);
        assert!(!badge.has_changed().unwrap());
    }

    #[test]
    fn test_clones_share_the_cart() {
        let store = CartStore::new(CartLimits::default());
        let other = store.clone();
        other.add(catalog::find("kit2").unwrap());
        assert_eq!(store.total_items(), 1);
        assert_eq!(store.lines().len(), 1);
    }

    #[test]
    fn test_clear_resets_totals() {
        let store = CartStore::new(CartLimits::default());
        store.add(catalog::find("kit1").unwrap());
        store.add(catalog::find("service1").unwrap());
        assert_eq!(store.clear(), CartChange::Cleared);
        assert_eq!(store.summary(), CartSummary::default());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_totals_follow_the_lines() {
        let store = CartStore::new(CartLimits::default());
        let kit = catalog::find("kit1").unwrap();
        let advanced = catalog::find("kit2").unwrap();
        store.add(kit);
        store.add(advanced);
        store.update_quantity(&kit.id, 3);
        store.remove(&advanced.id);

        let lines = store.lines();
        let items: u64 = lines.iter().map(|l| u64::from(l.quantity)).sum();
        let price: Money = lines.iter().map(CartLine::line_total).sum();
        assert_eq!(store.total_items(), items);
        assert_eq!(store.total_price(), price);
        assert_eq!(store.summary(), *store.subscribe().borrow());
    }

    #[test]
    fn test_concurrent_adds_are_all_counted() {
        let store = CartStore::new(CartLimits::unbounded());
        let kit = catalog::find("kit1").unwrap();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        store.add(kit);
                    }
                });
            }
        });
        assert_eq!(store.total_items(), 200);
    }
}
