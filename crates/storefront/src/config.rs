//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Cookie signing secret (min 64 chars, high entropy)
//! - `BACKEND_URL` - Base URL of the commerce REST API (e.g., <https://api.example.com/v1/>)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DEFAULT_LOCALE` - Locale when the browser sends none we support (default: en)
//! - `STOREFRONT_CURRENCY` - Currency used to display prices (default: USD)
//! - `PRODUCTS_PER_PAGE` - Listing page size (default: 12)
//! - `BACKEND_TIMEOUT_SECS` - Per-request backend timeout (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - Category cache lifetime (default: 300)
//! - `LOG_FORMAT` - `json` for one JSON object per line, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate 0.0-1.0 (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use emporium_core::{CurrencyCode, Locale};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Shortest session secret accepted; the cookie signing key needs 64 bytes.
const MIN_SESSION_SECRET_LENGTH: usize = 64;

/// Below this many bits per character a secret is almost certainly typed by hand.
const MIN_SECRET_ENTROPY: f64 = 3.3;

/// Fragments that show up in copied sample `.env` files.
const SAMPLE_SECRET_MARKERS: &[&str] = &[
    "changeme",
    "change-me",
    "example",
    "placeholder",
    "replace",
    "secret",
    "your-",
    "xxxx",
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
    /// Cookie signing secret
    pub session_secret: SecretString,
    /// Commerce backend configuration
    pub backend: BackendConfig,
    /// Display settings
    pub display: DisplayConfig,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Commerce backend connection settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL; always ends with `/` so relative joins keep any path prefix
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Lifetime of cached category data
    pub cache_ttl: Duration,
}

/// How pages present prices and listings.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Locale used when neither the session nor the browser picks one
    pub default_locale: Locale,
    /// Currency prices are shown in
    pub currency: CurrencyCode,
    /// Products per listing page
    pub products_per_page: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::En,
            currency: CurrencyCode::USD,
            products_per_page: 12,
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
        let session_secret = session_secret_from_env("STOREFRONT_SESSION_SECRET")?;

        let backend = BackendConfig::from_env()?;
        let display = DisplayConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            backend,
            display,
            log_json: get_optional_env("LOG_FORMAT")
                .is_some_and(|format| format.eq_ignore_ascii_case("json")),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_backend_url(&get_required_env("BACKEND_URL")?)?;
        let timeout = parse_env_or_default::<u64>("BACKEND_TIMEOUT_SECS", "10")?;
        let cache_ttl = parse_env_or_default::<u64>("CATALOG_CACHE_TTL_SECS", "300")?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout),
            cache_ttl: Duration::from_secs(cache_ttl),
        })
    }

    /// Build a backend config from a URL string with default timings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not http(s).
    pub fn with_url(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_backend_url(url)?,
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        })
    }
}

impl DisplayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let products_per_page = parse_env_or_default::<u32>("PRODUCTS_PER_PAGE", "12")?;
        if products_per_page == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "PRODUCTS_PER_PAGE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            default_locale: parse_env_or_default("STOREFRONT_DEFAULT_LOCALE", "en")?,
            currency: parse_env_or_default("STOREFRONT_CURRENCY", "USD")?,
            products_per_page,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and normalize the backend base URL.
fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), reason);

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value and parse it.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a Sentry sample rate and keep it within `0.0..=1.0`.
fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate = parse_env_or_default::<f32>(key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0-1.0"),
        ))
    }
}

/// Read the cookie signing secret and refuse weak values.
fn session_secret_from_env(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    check_session_secret(&value)
        .map_err(|reason| ConfigError::InsecureSecret(key.to_string(), reason))?;
    Ok(SecretString::from(value))
}

/// Reject short, sample-looking or low-entropy secrets.
fn check_session_secret(value: &str) -> Result<(), String> {
    let length = value.chars().count();
    if length < MIN_SESSION_SECRET_LENGTH {
        return Err(format!(
            "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {length})"
        ));
    }

    let lower = value.to_ascii_lowercase();
    if let Some(marker) = SAMPLE_SECRET_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(format!("looks like a sample value (contains '{marker}')"));
    }

    let entropy = bits_per_char(value);
    if entropy < MIN_SECRET_ENTROPY {
        return Err(format!(
            "too predictable ({entropy:.2} bits/char, need {MIN_SECRET_ENTROPY:.1}); generate it randomly"
        ));
    }
    Ok(())
}

/// Shannon entropy of the character distribution.
#[allow(clippy::cast_precision_loss)]
fn bits_per_char(value: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in value.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG: &str =
        "k9Qz2Lw7Vx4Rt1Pm8Nb3Hc6Jd5Fg0Sa2Ye7Ui4Oo1Wq9Er3Ty6Mn8Bv5Cx2Zl7Kj4Hg1Fd0Sa";

    #[test]
    fn test_bits_per_char() {
        assert!(bits_per_char("").abs() < f64::EPSILON);
        assert!(bits_per_char("zzzz").abs() < f64::EPSILON);
        assert!((bits_per_char("ab") - 1.0).abs() < 0.01);
        assert!(bits_per_char(STRONG) > MIN_SECRET_ENTROPY);
    }

    #[test]
    fn test_session_secret_checks() {
        assert!(check_session_secret(STRONG).is_ok());
        assert!(check_session_secret("k9Qz2Lw7").unwrap_err().contains("at least 64"));
        assert!(
            check_session_secret(&format!("changeme-{STRONG}"))
                .unwrap_err()
                .contains("sample value")
        );
        assert!(
            check_session_secret(&"ab".repeat(40))
                .unwrap_err()
                .contains("predictable")
        );
    }

    #[test]
    fn test_sample_rate_bounds() {
        assert!((parse_rate("EMPORIUM_TEST_UNSET_RATE", "0.25").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!(matches!(
            parse_rate("EMPORIUM_TEST_UNSET_RATE", "1.5"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_backend_url_gets_trailing_slash() {
        let url = parse_backend_url("https://api.example.com/v1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/");
        assert_eq!(
            url.join("products").unwrap().as_str(),
            "https://api.example.com/v1/products"
        );
    }

    #[test]
    fn test_backend_url_rejects_other_schemes() {
        assert!(matches!(
            parse_backend_url("ftp://api.example.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_backend_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://shop.example.com".to_string(),
            session_secret: SecretString::from("x".repeat(64)),
            backend: BackendConfig::with_url("http://localhost:8080").unwrap(),
            display: DisplayConfig::default(),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(config.is_secure());
    }

    #[test]
    fn test_config_debug_redacts_session_secret() {
        let secret = SecretString::from("super_secret_cookie_key".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("super_secret_cookie_key"));
    }
}
