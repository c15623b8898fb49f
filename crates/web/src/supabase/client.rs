//! `reqwest` implementation of [`AuthApi`] and [`DataApi`].

use std::sync::Arc;
use std::time::Duration;

use agrotrack_core::Email;
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::types::ApiErrorBody;
use super::{
    AuthApi, AuthSession, AuthUser, DataApi, SignUpRequest, SignUpResponse, SupabaseError,
    TableQuery,
};
use crate::config::SupabaseConfig;

/// Characters of a response body kept in logs and error messages.
const BODY_PREVIEW_CHARS: usize = 500;

// =============================================================================
// SupabaseClient
// =============================================================================

/// Client for the hosted backend.
///
/// Cheap to clone. Verified access tokens are cached for 60 seconds so a
/// page load does not cost a round trip just to confirm who is signed in.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    auth_root: Url,
    rest_root: Url,
    anon_key: SecretString,
    users: Cache<String, AuthUser>,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URLs cannot be derived from the
    /// project URL.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let users = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(60))
            .build();

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::builder()
                    .timeout(Duration::from_secs(15))
                    .build()?,
                auth_root: config.url.join("auth/v1/")?,
                rest_root: config.url.join("rest/v1/")?,
                anon_key: config.anon_key.clone(),
                users,
            }),
        })
    }

    /// Check that the auth service answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), SupabaseError> {
        let url = self.inner.auth_root.join("health")?;
        self.execute(self.request(Method::GET, url, None)).await?;
        Ok(())
    }

    /// Start a request with the API key and bearer token set.
    ///
    /// Without a rancher token the anonymous key doubles as the bearer.
    fn request(&self, method: Method, url: Url, access_token: Option<&str>) -> RequestBuilder {
        let anon_key = self.inner.anon_key.expose_secret();
        self.inner
            .client
            .request(method, url)
            .header("apikey", anon_key)
            .bearer_auth(access_token.unwrap_or(anon_key))
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, SupabaseError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SupabaseError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let preview = body.chars().take(BODY_PREVIEW_CHARS).collect::<String>();
            if status.is_server_error() {
                tracing::error!(status = %status, body = %preview, "Backend returned server error");
            } else {
                debug!(status = %status, body = %preview, "Backend rejected request");
            }
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(ApiErrorBody::into_message)
                .unwrap_or(preview);
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Decode a successful body, logging it on failure.
    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SupabaseError> {
        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(BODY_PREVIEW_CHARS).collect::<String>(),
                "Failed to parse backend response"
            );
            SupabaseError::Parse(e)
        })
    }
}

// =============================================================================
// Auth
// =============================================================================

impl AuthApi for SupabaseClient {
    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, SupabaseError> {
        if let Some(user) = self.inner.users.get(access_token).await {
            debug!("Cache hit for access token");
            return Ok(Some(user));
        }

        let url = self.inner.auth_root.join("user")?;
        let body = match self
            .execute(self.request(Method::GET, url, Some(access_token)))
            .await
        {
            Ok(body) => body,
            Err(e) if e.is_unauthorized() => return Ok(None),
            Err(e) => return Err(e),
        };
        let user: AuthUser = Self::decode(&body)?;

        self.inner
            .users
            .insert(access_token.to_string(), user.clone())
            .await;

        Ok(Some(user))
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, SupabaseError> {
        let mut url = self.inner.auth_root.join("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        });
        let response = self
            .execute(self.request(Method::POST, url, None).json(&body))
            .await?;
        let session: AuthSession = Self::decode(&response)?;

        self.inner
            .users
            .insert(session.access_token.clone(), session.user.clone())
            .await;

        Ok(session)
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, SupabaseError> {
        let url = self.inner.auth_root.join("signup")?;
        let response = self
            .execute(self.request(Method::POST, url, None).json(&request.to_body()))
            .await?;
        Self::decode(&response)
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        self.inner.users.invalidate(access_token).await;

        let url = self.inner.auth_root.join("logout")?;
        self.execute(self.request(Method::POST, url, Some(access_token)))
            .await?;
        Ok(())
    }
}

// =============================================================================
// Tables
// =============================================================================

impl DataApi for SupabaseClient {
    #[instrument(skip(self, query, access_token), fields(table = %query.table()))]
    async fn select<T>(
        &self,
        query: &TableQuery,
        access_token: Option<&str>,
    ) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned + Send,
    {
        let url = query.to_url(&self.inner.rest_root)?;
        let body = self
            .execute(self.request(Method::GET, url, access_token))
            .await?;
        Self::decode(&body)
    }

    #[instrument(skip(self, row, access_token))]
    async fn insert<R, T>(
        &self,
        table: &str,
        row: &R,
        access_token: Option<&str>,
    ) -> Result<T, SupabaseError>
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = self.inner.rest_root.join(table)?;
        let body = self
            .execute(
                self.request(Method::POST, url, access_token)
                    .header("Prefer", "return=representation")
                    .json(row),
            )
            .await?;
        let rows: Vec<T> = Self::decode(&body)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::EmptyResponse(table.to_string()))
    }
}
