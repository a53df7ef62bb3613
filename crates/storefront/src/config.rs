//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `DEALER_API_URL` - Base URL of the dealership REST backend (falls back to `APIURL`)
//! - `STOREFRONT_COOKIE_SECRET` - Cookie signing secret (min 64 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `DEALER_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `DEALER_CACHE_TTL_SECS` - Vehicle read cache TTL, 0 disables (default: 60)
//! - `DEALER_CUSTOMER_ID` - Customer id sent with new orders (default: 1)
//! - `FEATURED_VEHICLE_COUNT` - Tiles shown on the home page (default: 4)
//! - `STOREFRONT_STATIC_DIR` - Stylesheet and asset directory (default: crates/storefront/static)
//! - `DEALERSHIP_NAME`, `DEALERSHIP_STREET`, `DEALERSHIP_CITY_LINE`, `DEALERSHIP_PHONE`
//!   - Location block on the purchase page
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use online_dealership_core::CustomerId;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Signing keys are built from 64 bytes of secret material.
const MIN_COOKIE_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Secret the client-state cookies are signed with
    pub cookie_secret: SecretString,
    /// Dealership backend configuration
    pub dealer: DealerApiConfig,
    /// Dealership details shown to customers
    pub dealership: DealershipConfig,
    /// Number of vehicle tiles on the home page
    pub featured_vehicle_count: usize,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Dealership REST backend configuration.
#[derive(Debug, Clone)]
pub struct DealerApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// TTL for cached vehicle reads (zero disables caching)
    pub cache_ttl: Duration,
    /// Customer placing orders from this storefront
    pub customer_id: CustomerId,
}

/// Dealership name and location block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealershipConfig {
    pub name: String,
    pub street: String,
    pub city_line: String,
    pub phone: String,
}

impl Default for DealershipConfig {
    fn default() -> Self {
        Self {
            name: "Online Dealership".to_string(),
            street: "111 Summit St.".to_string(),
            city_line: "Kent, Ohio 44240".to_string(),
            phone: "(111)111-1111".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let cookie_secret = get_validated_secret("STOREFRONT_COOKIE_SECRET")?;
        validate_cookie_secret(&cookie_secret, "STOREFRONT_COOKIE_SECRET")?;

        let dealer = DealerApiConfig::from_env()?;
        let dealership = DealershipConfig::from_env();
        let featured_vehicle_count = parse_env_or_default::<usize>("FEATURED_VEHICLE_COUNT", "4")?;
        let static_dir = PathBuf::from(get_env_or_default(
            "STOREFRONT_STATIC_DIR",
            "crates/storefront/static",
        ));

        Ok(Self {
            host,
            port,
            base_url,
            cookie_secret,
            dealer,
            dealership,
            featured_vehicle_count,
            static_dir,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default::<f32>(
                "SENTRY_TRACES_SAMPLE_RATE",
                "0.0",
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl DealerApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let (key, raw) = get_api_url("DEALER_API_URL")?;
        let base_url = parse_base_url(&raw).map_err(|e| ConfigError::InvalidEnvVar(key, e))?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(parse_env_or_default::<u64>(
                "DEALER_API_TIMEOUT_SECS",
                "10",
            )?),
            cache_ttl: Duration::from_secs(parse_env_or_default::<u64>(
                "DEALER_CACHE_TTL_SECS",
                "60",
            )?),
            customer_id: CustomerId::new(parse_env_or_default::<i64>("DEALER_CUSTOMER_ID", "1")?),
        })
    }
}

impl DealershipConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: get_optional_env("DEALERSHIP_NAME").unwrap_or(defaults.name),
            street: get_optional_env("DEALERSHIP_STREET").unwrap_or(defaults.street),
            city_line: get_optional_env("DEALERSHIP_CITY_LINE").unwrap_or(defaults.city_line),
            phone: get_optional_env("DEALERSHIP_PHONE").unwrap_or(defaults.phone),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get the backend URL with fallback to the legacy `APIURL` variable.
///
/// Returns the variable name that was used alongside its value so parse
/// errors point at the right variable.
fn get_api_url(primary_key: &str) -> Result<(String, String), ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok((primary_key.to_string(), value));
    }
    if let Ok(value) = std::env::var("APIURL") {
        return Ok(("APIURL".to_string(), value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Parse a backend base URL, normalizing it to end with `/` so endpoint
/// paths join under it instead of replacing its last segment.
///
/// # Errors
///
/// Returns a message if `raw` is not an absolute `http`/`https` URL.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
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
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a cookie secret is long enough to derive a signing key.
fn validate_cookie_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_COOKIE_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_COOKIE_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
