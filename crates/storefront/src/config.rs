//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com).
//!   A full origin with scheme (`http://127.0.0.1:4000`) is accepted as well.
//!
//! ## Credentials
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API access token (read)
//! - `SHOPIFY_ADMIN_TOKEN` - Admin API access token (write, server-side only)
//!
//! Credentials are not required to boot. A missing or placeholder-looking
//! credential is logged and left unset; every call that needs it then fails
//! with `ShopifyError::MissingCredential`.
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - Storefront API version (default: 2025-01)
//! - `SHOPIFY_ADMIN_API_VERSION` - Admin REST API version (default: 2023-10)
//! - `SHOPIFY_TIMEOUT_SECS` - Outbound request timeout (default: 10)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `STOREFRONT_PRODUCTS_PER_PAGE` - Products on home/listing pages (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
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
    /// Number of products shown on the home and listing pages
    pub products_per_page: u32,
    /// Shopify API configuration
    pub shopify: ShopifyConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Shopify Storefront and Admin API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain, optionally with scheme
    pub store: String,
    /// Storefront API version (e.g., 2025-01)
    pub api_version: String,
    /// Admin REST API version (e.g., 2023-10)
    pub admin_api_version: String,
    /// Storefront API access token
    pub storefront_token: Option<SecretString>,
    /// Admin API access token (never rendered or sent to browsers)
    pub admin_token: Option<SecretString>,
    /// Timeout applied to every outbound request
    pub timeout: Duration,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |token: &Option<SecretString>| {
            if token.is_some() { "[REDACTED]" } else { "[UNSET]" }
        };
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("admin_api_version", &self.admin_api_version)
            .field("storefront_token", &redact(&self.storefront_token))
            .field("admin_token", &redact(&self.admin_token))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `SHOPIFY_STORE` is missing or a numeric/address
    /// variable cannot be parsed. Credential problems are never errors here.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_parsed_env("STOREFRONT_PORT", 3000_u16)?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let products_per_page = get_parsed_env("STOREFRONT_PRODUCTS_PER_PAGE", 10_u32)?;

        let shopify = ShopifyConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            products_per_page,
            shopify,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (controls secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ShopifyConfig {
    /// Configuration for a store with default API versions and no credentials.
    #[must_use]
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            api_version: "2025-01".to_string(),
            admin_api_version: "2023-10".to_string(),
            storefront_token: None,
            admin_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Set the Storefront API token.
    #[must_use]
    pub fn with_storefront_token(mut self, token: impl Into<String>) -> Self {
        self.storefront_token = Some(SecretString::from(token.into()));
        self
    }

    /// Set the Admin API token.
    #[must_use]
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(SecretString::from(token.into()));
        self
    }

    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = get_parsed_env("SHOPIFY_TIMEOUT_SECS", 10_u64)?;

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2025-01"),
            admin_api_version: get_env_or_default("SHOPIFY_ADMIN_API_VERSION", "2023-10"),
            storefront_token: get_screened_secret("SHOPIFY_STOREFRONT_TOKEN"),
            admin_token: get_screened_secret("SHOPIFY_ADMIN_TOKEN"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Store origin: `https://{store}`, or `store` itself when it already
    /// carries a scheme. Never ends with a slash.
    #[must_use]
    pub fn origin(&self) -> String {
        let store = self.store.trim().trim_end_matches('/');
        if store.starts_with("http://") || store.starts_with("https://") {
            store.to_string()
        } else {
            format!("https://{store}")
        }
    }

    /// Storefront GraphQL endpoint.
    #[must_use]
    pub fn storefront_endpoint(&self) -> String {
        format!("{}/api/{}/graphql.json", self.origin(), self.api_version)
    }

    /// Admin REST endpoint for a single product.
    #[must_use]
    pub fn admin_product_url(&self, product_id: u64) -> String {
        format!(
            "{}/admin/api/{}/products/{product_id}.json",
            self.origin(),
            self.admin_api_version
        )
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
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
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
    let len = s.chars().count() as f64;
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

    // Real access tokens are random hex/base62 strings with high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load a credential, screening out blanks and placeholders.
///
/// Never fails: a rejected credential is logged and treated as unset.
fn get_screened_secret(key: &str) -> Option<SecretString> {
    let Some(value) = get_optional_env(key) else {
        tracing::warn!(var = key, "credential not set; calls that need it will fail");
        return None;
    };

    let value = value.trim().to_string();
    if let Err(e) = validate_secret_strength(&value, key) {
        tracing::warn!(error = %e, "ignoring malformed credential");
        return None;
    }

    Some(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-storefront-token", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_hex_token() {
        let result = validate_secret_strength("f3a9c07d1e5b4a2c8d6e0b7a9c1f3e5d", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_origin_adds_https() {
        let config = ShopifyConfig::new("test.myshopify.com/");
        assert_eq!(config.origin(), "https://test.myshopify.com");
        assert_eq!(
            config.storefront_endpoint(),
            "https://test.myshopify.com/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn test_origin_keeps_explicit_scheme() {
        let config = ShopifyConfig::new("http://127.0.0.1:4000");
        assert_eq!(
            config.admin_product_url(42),
            "http://127.0.0.1:4000/admin/api/2023-10/products/42.json"
        );
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            products_per_page: 10,
            shopify: ShopifyConfig::new("test.myshopify.com"),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_shopify_config_debug_redacts_secrets() {
        let config = ShopifyConfig::new("test.myshopify.com")
            .with_storefront_token("super_secret_storefront_token")
            .with_admin_token("super_secret_admin_token");

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_storefront_token"));
        assert!(!debug_output.contains("super_secret_admin_token"));
    }

    #[test]
    fn test_shopify_config_debug_marks_unset() {
        let debug_output = format!("{:?}", ShopifyConfig::new("test.myshopify.com"));
        assert!(debug_output.contains("[UNSET]"));
    }
}
