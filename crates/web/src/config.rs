//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AGROTRACK_BASE_URL` - Public URL for the application
//! - `SUPABASE_URL` - Hosted backend project URL (e.g., <https://abc.supabase.co>)
//! - `SUPABASE_ANON_KEY` - Hosted backend anonymous (public) API key
//!
//! ## Optional
//! - `AGROTRACK_HOST` - Bind address (default: 127.0.0.1)
//! - `AGROTRACK_PORT` - Listen port (default: 3000)
//! - `AGROTRACK_REPORTS_URL` - Analytics reports endpoint
//!   (default: <http://localhost:8000/api/reports>)
//! - `AGROTRACK_CART_MAX_QUANTITY` - Per-line quantity ceiling (default: 99)
//! - `AGROTRACK_CART_MAX_LINES` - Distinct products per cart (default: 50)
//! - `AGROTRACK_PEDIGREE_MAX_NODES` - Animals shown in one ancestry tree (default: 255)
//! - `AGROTRACK_PEDIGREE_MAX_GENERATIONS` - Generations shown, root included (default: 12)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use agrotrack_core::cart::CartLimits;
use agrotrack_core::pedigree::PedigreeLimits;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default analytics reports endpoint.
pub const DEFAULT_REPORTS_URL: &str = "http://localhost:8000/api/reports";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AgrotrackConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the application
    pub base_url: String,
    /// Hosted backend configuration
    pub supabase: SupabaseConfig,
    /// Analytics reports endpoint
    pub reports_url: Url,
    /// Cart bounds applied to every browsing session
    pub cart_limits: CartLimits,
    /// Size bounds on rendered ancestry trees
    pub pedigree_limits: PedigreeLimits,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Hosted backend (auth + data) configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, always ending in `/`
    pub url: Url,
    /// Anonymous API key sent with every request
    pub anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl AgrotrackConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("AGROTRACK_HOST", "127.0.0.1")?;
        let port = parse_env("AGROTRACK_PORT", "3000")?;
        let base_url = get_required_env("AGROTRACK_BASE_URL")?;
        let supabase = SupabaseConfig::from_env()?;
        let reports_url = parse_url(
            "AGROTRACK_REPORTS_URL",
            &get_env_or_default("AGROTRACK_REPORTS_URL", DEFAULT_REPORTS_URL),
        )?;

        let defaults = CartLimits::default();
        let cart_limits = CartLimits {
            max_quantity_per_line: parse_env(
                "AGROTRACK_CART_MAX_QUANTITY",
                &defaults.max_quantity_per_line.to_string(),
            )?,
            max_lines: parse_env("AGROTRACK_CART_MAX_LINES", &defaults.max_lines.to_string())?,
        };
        if cart_limits.max_quantity_per_line == 0 || cart_limits.max_lines == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "AGROTRACK_CART_MAX_*".to_string(),
                "cart limits must be greater than zero".to_string(),
            ));
        }

        let defaults = PedigreeLimits::default();
        let pedigree_limits = PedigreeLimits {
            max_nodes: parse_env(
                "AGROTRACK_PEDIGREE_MAX_NODES",
                &defaults.max_nodes.to_string(),
            )?,
            max_generations: parse_env(
                "AGROTRACK_PEDIGREE_MAX_GENERATIONS",
                &defaults.max_generations.to_string(),
            )?,
        };
        if pedigree_limits.max_nodes == 0 || pedigree_limits.max_generations == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "AGROTRACK_PEDIGREE_MAX_*".to_string(),
                "pedigree limits must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            base_url,
            supabase,
            reports_url,
            cart_limits,
            pedigree_limits,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_base_url("SUPABASE_URL", &get_required_env("SUPABASE_URL")?)?,
            anon_key: SecretString::from(get_required_env("SUPABASE_ANON_KEY")?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a URL that relative paths will be joined onto.
///
/// `Url::join` drops the last path segment unless the base ends in `/`.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    if trimmed.ends_with('/') {
        parse_url(key, trimmed)
    } else {
        parse_url(key, &format!("{trimmed}/"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> AgrotrackConfig {
        AgrotrackConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            supabase: SupabaseConfig {
                url: Url::parse("https://abc.supabase.co/").unwrap(),
                anon_key: SecretString::from("anon-key-value"),
            },
            reports_url: Url::parse(DEFAULT_REPORTS_URL).unwrap(),
            cart_limits: CartLimits::default(),
            pedigree_limits: PedigreeLimits::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        let mut config = config();
        assert!(!config.is_secure());
        config.base_url = "https://agrotrack.mx".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_supabase_config_debug_redacts_key() {
        let debug_output = format!("{:?}", config().supabase);
        assert!(debug_output.contains("abc.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("anon-key-value"));
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("SUPABASE_URL", "https://abc.supabase.co/project").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/project/");
        assert_eq!(
            url.join("rest/v1/animals").unwrap().as_str(),
            "https://abc.supabase.co/project/rest/v1/animals"
        );
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        let err = parse_url("AGROTRACK_REPORTS_URL", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "AGROTRACK_REPORTS_URL"));
    }
}
