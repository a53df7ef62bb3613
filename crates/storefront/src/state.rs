//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use secrecy::ExposeSecret;

use crate::config::StorefrontConfig;
use crate::dealer::{DealerClient, DealerError};

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("dealer client: {0}")]
    Dealer(#[from] DealerError),
    #[error("cookie key: {0}")]
    CookieKey(String),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the backend client and the cookie signing key.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    dealer: DealerClient,
    cookie_key: Key,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built or the
    /// cookie secret is too short to sign with.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let dealer = DealerClient::new(&config.dealer)?;
        let cookie_key = Key::try_from(config.cookie_secret.expose_secret().as_bytes())
            .map_err(|e| StateError::CookieKey(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                dealer,
                cookie_key,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the dealership backend client.
    #[must_use]
    pub fn dealer(&self) -> &DealerClient {
        &self.inner.dealer
    }

    /// Key the client-state cookies are signed with.
    #[must_use]
    pub fn cookie_key(&self) -> &Key {
        &self.inner.cookie_key
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cookie_key.clone()
    }
}
