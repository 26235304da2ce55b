//! Client for the commerce backend REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth for catalog, carts, wishlists,
//!   orders and accounts. The storefront keeps only session snapshots.
//! - Every call carries the shopper's locale as `Accept-Language` and, when
//!   signed in, their bearer token.
//! - Categories are cached in memory via `moka`; everything else is fetched
//!   live because stock, carts and orders change underneath us.
//!
//! # Example
//!
//! ```rust,ignore
//! use emporium_storefront::backend::{BackendClient, CallContext};
//!
//! let client = BackendClient::new(&config.backend)?;
//! let ctx = CallContext::anonymous(Locale::En);
//!
//! let page = client.list_products(&ctx, &ProductQuery::default()).await?;
//! let cart = client.apply_cart_change(&signed_in, &change).await?;
//! ```

mod cache;
mod client;
pub mod wire;

pub use client::BackendClient;

use emporium_core::Locale;
use reqwest::StatusCode;
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// The backend refused the input (400, 409, 422).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Missing or expired bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Token is valid but lacks the required role.
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl BackendError {
    /// Map a non-success status and its decoded error message.
    #[must_use]
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Rejected(message)
            }
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the shopper's token was refused.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Whether the error is the backend's fault rather than the shopper's.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) | Self::Status { .. }
        )
    }

    /// Message safe to show in a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) if !message.is_empty() => message.clone(),
            Self::Rejected(_) => "The request was rejected".to_string(),
            Self::Unauthorized => "Please sign in again".to_string(),
            Self::Forbidden => "You do not have access to that".to_string(),
            Self::NotFound(_) => "That item could not be found".to_string(),
            Self::RateLimited(secs) => format!("Too many requests, try again in {secs}s"),
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) | Self::Status { .. } => {
                "The store is having trouble right now, please try again".to_string()
            }
        }
    }
}

/// Per-call identity and locale.
#[derive(Debug, Clone)]
pub struct CallContext {
    token: Option<SecretString>,
    locale: Locale,
}

impl CallContext {
    /// Context for a visitor without a token.
    #[must_use]
    pub const fn anonymous(locale: Locale) -> Self {
        Self {
            token: None,
            locale,
        }
    }

    /// Context carrying a bearer token.
    #[must_use]
    pub const fn authenticated(token: SecretString, locale: Locale) -> Self {
        Self {
            token: Some(token),
            locale,
        }
    }

    /// The locale forwarded as `Accept-Language`.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// The bearer token, if any.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            BackendError::from_status(StatusCode::CONFLICT, "taken".to_string()),
            BackendError::Rejected(m) if m == "taken"
        ));
        assert!(BackendError::from_status(StatusCode::UNAUTHORIZED, String::new()).is_unauthorized());
        assert!(matches!(
            BackendError::from_status(StatusCode::FORBIDDEN, String::new()),
            BackendError::Forbidden
        ));
        assert!(matches!(
            BackendError::from_status(StatusCode::BAD_GATEWAY, "down".to_string()),
            BackendError::Status { status: 502, .. }
        ));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = BackendError::Status {
            status: 500,
            message: "stack trace at db.js:42".to_string(),
        };
        assert!(!err.user_message().contains("db.js"));
        assert!(err.is_server_side());

        let err = BackendError::Rejected("Only 2 left".to_string());
        assert_eq!(err.user_message(), "Only 2 left");
        assert!(!err.is_server_side());
    }

    #[test]
    fn test_rate_limited_display() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
