//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::AgrotrackConfig;
use crate::reports::{ReportsClient, ReportsError};
use crate::services::browsing::{BrowsingSessions, IDLE_TIMEOUT};
use crate::supabase::{SupabaseClient, SupabaseError};

/// Error building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Supabase(#[from] SupabaseError),
    #[error("reports client: {0}")]
    Reports(#[from] ReportsError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the backend clients, configuration and per-browser state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AgrotrackConfig,
    supabase: SupabaseClient,
    reports: ReportsClient,
    browsing: BrowsingSessions,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built from the
    /// configuration.
    pub fn new(config: AgrotrackConfig) -> Result<Self, StateError> {
        let supabase = SupabaseClient::new(&config.supabase)?;
        let reports = ReportsClient::new(config.reports_url.clone())?;
        let browsing = BrowsingSessions::new(config.cart_limits, IDLE_TIMEOUT);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                reports,
                browsing,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AgrotrackConfig {
        &self.inner.config
    }

    /// Get a reference to the hosted backend client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Get a reference to the reports client.
    #[must_use]
    pub fn reports(&self) -> &ReportsClient {
        &self.inner.reports
    }

    /// Get a reference to the per-browser state registry.
    #[must_use]
    pub fn browsing(&self) -> &BrowsingSessions {
        &self.inner.browsing
    }
}
