//! Shared handler state.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::StorefrontConfig;
use crate::middleware::security_headers::SecurityHeaders;

/// State handed to every handler and middleware.
///
/// The backend client owns the connection pool and category cache, so one
/// instance serves the whole process. Clones share it through an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Shared>,
}

struct Shared {
    config: StorefrontConfig,
    backend: BackendClient,
    security_headers: SecurityHeaders,
}

impl AppState {
    /// Build the backend client and derived response headers for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let security_headers = SecurityHeaders::from_config(&config);

        Ok(Self {
            inner: Arc::new(Shared {
                config,
                backend,
                security_headers,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Headers stamped onto every response.
    #[must_use]
    pub fn security_headers(&self) -> &SecurityHeaders {
        &self.inner.security_headers
    }
}
