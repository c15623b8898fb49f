//! Generation counters for discarding stale responses.
//!
//! When several fetches for the same logical resource overlap, only the
//! most recently issued one may update what the user sees. Each request
//! takes a [`Generation`] token before awaiting; when the response arrives
//! it is applied only if the token is still current.

use std::sync::atomic::{AtomicU64, Ordering};

/// A token identifying one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic counter for one logical resource.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: AtomicU64,
}

impl GenerationCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issue a new token, superseding every earlier one.
    pub fn issue(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether no newer token has been issued since `generation`.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.load(Ordering::Acquire) == generation.0
    }

    /// Apply `value` only if `generation` is still current.
    pub fn accept<T>(&self, generation: Generation, value: T) -> Option<T> {
        self.is_current(generation).then_some(value)
    }
}
