//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::credentials::{CredentialCipher, CredentialError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    cipher: CredentialCipher,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials key is unusable.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, CredentialError> {
        let cipher = CredentialCipher::from_base64_key(&config.credentials_key)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                cipher,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the cipher for stored seller credentials.
    #[must_use]
    pub fn cipher(&self) -> &CredentialCipher {
        &self.inner.cipher
    }
}
