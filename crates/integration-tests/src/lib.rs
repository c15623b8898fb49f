//! Integration tests for Agrotrack.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p agrotrack-integration-tests
//! ```
//!
//! Nothing here needs a running backend: the session and herd scenarios
//! use the scripted backends below, and the HTTP scenarios drive the real
//! router in process with `tower::ServiceExt::oneshot`.
//!
//! # Test Categories
//!
//! - `cart_flow` - cart aggregation through the store and the `/cart` routes
//! - `session_flow` - sign in, restore and sign out against [`ScriptedAuth`]
//! - `herd_flow` - pedigrees, validation and stale-response guards
//! - `http_routes` - page routing, access control and response headers

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use agrotrack_core::Email;
use agrotrack_core::cart::CartLimits;
use agrotrack_core::pedigree::PedigreeLimits;
use agrotrack_web::config::{AgrotrackConfig, SupabaseConfig};
use agrotrack_web::middleware::{create_session_layer, security_headers_middleware};
use agrotrack_web::models::UserIdentity;
use agrotrack_web::routes;
use agrotrack_web::state::AppState;
use agrotrack_web::supabase::{
    AuthApi, AuthSession, AuthUser, DataApi, SignUpRequest, SignUpResponse, SupabaseError,
    TableQuery, UserMetadata,
};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;

// =============================================================================
// Application
// =============================================================================

/// Configuration pointing at a backend that is never contacted.
#[must_use]
pub fn test_config() -> AgrotrackConfig {
    AgrotrackConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        supabase: SupabaseConfig {
            url: Url::parse("http://127.0.0.1:9/").unwrap(),
            anon_key: SecretString::from("test-anon-key"),
        },
        reports_url: Url::parse("http://127.0.0.1:9/reports").unwrap(),
        cart_limits: CartLimits::default(),
        pedigree_limits: PedigreeLimits::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The page router with sessions and security headers, as served.
#[must_use]
pub fn test_app() -> Router {
    let state = AppState::new(test_config()).unwrap();
    let session_layer = create_session_layer(state.config());

    routes::routes()
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .with_state(state)
}

/// A `GET` request, optionally carrying a session cookie.
#[must_use]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// A form `POST`, optionally carrying a session cookie.
#[must_use]
pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// The `name=value` pair of the session cookie set by a response.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("agrotrack_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Fixtures
// =============================================================================

/// The backend user every scripted sign in returns.
#[must_use]
pub fn auth_user() -> AuthUser {
    AuthUser {
        id: Uuid::from_u128(42),
        email: Some("lucia@rancho.mx".to_string()),
        user_metadata: UserMetadata {
            nombre: Some("Lucía".to_string()),
            ..UserMetadata::default()
        },
    }
}

/// A signed-in rancher holding `token`.
#[must_use]
pub fn rancher(token: &str) -> UserIdentity {
    UserIdentity::from_auth(
        &auth_user(),
        &Email::parse("lucia@rancho.mx").unwrap(),
        token.to_string(),
    )
}

/// An `animals` row as the backend returns it.
#[must_use]
pub fn animal_row(id: i64, name: &str, mother_id: Option<i64>, father_id: Option<i64>) -> Value {
    json!({
        "id": id,
        "ganadero_id": Uuid::from_u128(42),
        "name": name,
        "species": "Bovino",
        "breed": "Holstein",
        "age": 4,
        "latitude": 20.67,
        "longitude": -103.35,
        "mother_id": mother_id,
        "father_id": father_id,
        "created_at": "2026-03-01T08:00:00Z"
    })
}

// =============================================================================
// Scripted backends
// =============================================================================

/// Auth backend that accepts one password and one token.
///
/// Clones share their state, so a test can keep one to inspect while the
/// session store owns another.
#[derive(Clone)]
pub struct ScriptedAuth {
    password: String,
    valid_token: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedAuth {
    /// Accepts `password` for any well-formed email.
    #[must_use]
    pub fn accepting(password: &str) -> Self {
        Self {
            password: password.to_string(),
            valid_token: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Token issued by the next successful sign in and accepted afterwards.
    pub const TOKEN: &'static str = "jwt-lucia";

    /// Stop accepting the issued token, as if it expired.
    pub fn expire_token(&self) {
        *self.valid_token.lock().unwrap() = None;
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthApi for ScriptedAuth {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, SupabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let valid = self.valid_token.lock().unwrap().clone();
        Ok((valid.as_deref() == Some(access_token)).then(auth_user))
    }

    async fn sign_in(
        &self,
        _email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, SupabaseError> {
        use secrecy::ExposeSecret;

        self.calls.fetch_add(1, Ordering::SeqCst);
        if password.expose_secret() != self.password {
            return Err(SupabaseError::Api {
                status: 400,
                message: "Invalid login credentials".to_string(),
            });
        }
        *self.valid_token.lock().unwrap() = Some(Self::TOKEN.to_string());
        Ok(AuthSession {
            access_token: Self::TOKEN.to_string(),
            refresh_token: None,
            expires_in: Some(3600),
            user: auth_user(),
        })
    }

    async fn sign_up(&self, _request: &SignUpRequest) -> Result<SignUpResponse, SupabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SignUpResponse::User(auth_user()))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), SupabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.expire_token();
        Ok(())
    }
}

/// Data backend serving fixed rows and recording every call.
pub struct RecordingData {
    rows: Value,
    calls: Mutex<Vec<String>>,
}

impl RecordingData {
    /// Every select answers with `rows`.
    #[must_use]
    pub fn with_rows(rows: Value) -> Self {
        Self {
            rows,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `GET <table>` or `POST <table>` per call, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl DataApi for RecordingData {
    async fn select<T>(
        &self,
        query: &TableQuery,
        _access_token: Option<&str>,
    ) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned + Send,
    {
        self.calls
            .lock()
            .unwrap()
            .push(format!("GET {}", query.table()));
        Ok(serde_json::from_value(self.rows.clone())?)
    }

    async fn insert<R, T>(
        &self,
        table: &str,
        row: &R,
        _access_token: Option<&str>,
    ) -> Result<T, SupabaseError>
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        self.calls.lock().unwrap().push(format!("POST {table}"));
        let mut stored = serde_json::to_value(row)?;
        stored["id"] = json!(100);
        stored["created_at"] = json!("2026-10-19T09:30:00Z");
        Ok(serde_json::from_value(stored)?)
    }
}
