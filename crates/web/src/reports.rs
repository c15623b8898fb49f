//! Client for the analytics reports endpoint.
//!
//! The endpoint is unauthenticated and returns every report at once.
//! Responses are cached for 60 seconds using `moka`.

use std::sync::Arc;
use std::time::Duration;

use agrotrack_core::report::{Report, ReportsEnvelope};
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Errors that can occur when fetching reports.
#[derive(Debug, Error)]
pub enum ReportsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("Reports endpoint returned HTTP {0}")]
    Status(u16),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the reports endpoint.
#[derive(Clone)]
pub struct ReportsClient {
    inner: Arc<ReportsClientInner>,
}

struct ReportsClientInner {
    client: reqwest::Client,
    endpoint: Url,
    cache: Cache<(), Arc<Vec<Report>>>,
}

impl ReportsClient {
    /// Create a new reports client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: Url) -> Result<Self, ReportsError> {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(60))
            .build();

        Ok(Self {
            inner: Arc::new(ReportsClientInner {
                client: reqwest::Client::builder()
                    .timeout(Duration::from_secs(10))
                    .build()?,
                endpoint,
                cache,
            }),
        })
    }

    /// Fetch all reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unreachable, answers with a
    /// non-success status, or returns a body that is not a report envelope.
    #[instrument(skip(self), fields(endpoint = %self.inner.endpoint))]
    pub async fn fetch(&self) -> Result<Arc<Vec<Report>>, ReportsError> {
        if let Some(reports) = self.inner.cache.get(&()).await {
            debug!("Cache hit for reports");
            return Ok(reports);
        }

        let response = self
            .inner
            .client
            .get(self.inner.endpoint.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Reports endpoint returned non-success status");
            return Err(ReportsError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let envelope: ReportsEnvelope = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse reports response"
            );
            e
        })?;

        let reports = Arc::new(envelope.reports);
        self.inner.cache.insert((), Arc::clone(&reports)).await;

        Ok(reports)
    }
}
