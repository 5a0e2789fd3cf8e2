//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_CREDENTIALS_KEY` - Base64 of 32 random bytes; encrypts seller credentials
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Length in bytes of the AES-256 credentials key.
pub const CREDENTIALS_KEY_LENGTH: usize = 32;

/// A real key of random bytes has far more distinct values than this.
const MIN_DISTINCT_KEY_BYTES: usize = 16;

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
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Base64-encoded AES-256 key for stored game credentials
    pub credentials_key: SecretString,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. `production`)
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the credentials key is not 32 bytes of key material.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;
        let credentials_key = SecretString::from(get_required_env("STOREFRONT_CREDENTIALS_KEY")?);
        validate_credentials_key(&credentials_key, "STOREFRONT_CREDENTIALS_KEY")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            credentials_key,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the credentials key decodes to 32 bytes of key material.
///
/// Keys made of a repeated pattern (all zeros, `AAAA...`) are rejected.
fn validate_credentials_key(key: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let bytes = STANDARD.decode(key.expose_secret().trim()).map_err(|e| {
        ConfigError::InvalidEnvVar(var_name.to_string(), format!("not valid base64: {e}"))
    })?;
    if bytes.len() != CREDENTIALS_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must decode to {CREDENTIALS_KEY_LENGTH} bytes (got {})",
                bytes.len()
            ),
        ));
    }

    let distinct = bytes.iter().collect::<HashSet<_>>().len();
    if distinct < MIN_DISTINCT_KEY_BYTES {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "only {distinct} distinct bytes; generate one with `openssl rand -base64 32`"
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            credentials_key: SecretString::from(STANDARD.encode([7u8; 32])),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_validate_credentials_key() {
        let bytes: Vec<u8> = (0..32).map(|i| i * 7 + 3).collect();
        let good = SecretString::from(STANDARD.encode(&bytes));
        assert!(validate_credentials_key(&good, "K").is_ok());

        let repeated = SecretString::from(STANDARD.encode([42u8; 32]));
        assert!(matches!(
            validate_credentials_key(&repeated, "K"),
            Err(ConfigError::InsecureSecret(_, _))
        ));

        let short = SecretString::from(STANDARD.encode(&bytes[..16]));
        assert!(matches!(
            validate_credentials_key(&short, "K"),
            Err(ConfigError::InsecureSecret(_, _))
        ));

        let garbage = SecretString::from("!!not base64!!");
        assert!(matches!(
            validate_credentials_key(&garbage, "K"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_https() {
        assert!(!test_config("http://localhost:3000").is_https());
        assert!(test_config("https://gamehub.gg").is_https());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config("http://localhost:3000"));
        assert!(!debug_output.contains("postgres://localhost/test"));
        assert!(!debug_output.contains(&STANDARD.encode([7u8; 32])));
    }
}
