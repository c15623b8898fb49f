//! Per-browser state that lives in process memory.
//!
//! Each browser session gets a cart and a set of fetch counters, keyed by a
//! random ID stored in its session cookie. Entries idle for two hours are
//! evicted by `moka`.

use std::sync::Arc;
use std::time::Duration;

use agrotrack_core::cart::CartLimits;
use agrotrack_core::generation::GenerationCounter;
use moka::sync::Cache;
use uuid::Uuid;

use super::cart::CartStore;

/// How long an untouched browsing session is kept.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// State for one browser.
#[derive(Clone)]
pub struct BrowsingState {
    pub cart: CartStore,
    /// Guards the ancestry tree fragment on the monitoring page.
    pub pedigree: Arc<GenerationCounter>,
    /// Guards the health record list on the diseases page.
    pub health_records: Arc<GenerationCounter>,
}

impl BrowsingState {
    fn new(limits: CartLimits) -> Self {
        Self {
            cart: CartStore::new(limits),
            pedigree: Arc::new(GenerationCounter::new()),
            health_records: Arc::new(GenerationCounter::new()),
        }
    }
}

/// Registry of live browsing sessions.
#[derive(Clone)]
pub struct BrowsingSessions {
    cache: Cache<Uuid, BrowsingState>,
    limits: CartLimits,
}

impl BrowsingSessions {
    #[must_use]
    pub fn new(limits: CartLimits, idle_timeout: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(100_000)
                .time_to_idle(idle_timeout)
                .build(),
            limits,
        }
    }

    /// The state for `id`, created empty on first use.
    #[must_use]
    pub fn get_or_create(&self, id: Uuid) -> BrowsingState {
        self.cache.get_with(id, || BrowsingState::new(self.limits))
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agrotrack_core::catalog;

    use super::*;

    #[test]
    fn test_same_id_same_cart() {
        let sessions = BrowsingSessions::new(CartLimits::default(), IDLE_TIMEOUT);
        let id = Uuid::new_v4();
        sessions
            .get_or_create(id)
            .cart
            .add(catalog::find("kit1").unwrap());
        assert_eq!(sessions.get_or_create(id).cart.total_items(), 1);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let sessions = BrowsingSessions::new(CartLimits::default(), IDLE_TIMEOUT);
        sessions
            .get_or_create(Uuid::new_v4())
            .cart
            .add(catalog::find("kit1").unwrap());
        assert_eq!(sessions.get_or_create(Uuid::new_v4()).cart.total_items(), 0);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_limits_are_applied() {
        let limits = CartLimits {
            max_quantity_per_line: 2,
            max_lines: 1,
        };
        let sessions = BrowsingSessions::new(limits, IDLE_TIMEOUT);
        let state = sessions.get_or_create(Uuid::new_v4());
        assert_eq!(state.cart.snapshot().limits(), limits);
    }
}
