//! Handler errors and their HTTP responses.
//!
//! Handlers return [`AppError`]. Server-side failures are reported to Sentry
//! when the response is built; everything else is the shopper's problem and
//! only gets a short message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::backend::BackendError;

/// Where anonymous or expired shoppers are sent.
const SIGN_IN_PATH: &str = "/auth/login";

/// Errors a storefront handler can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The backend refused the shopper's token.
    #[error("Session expired")]
    SessionExpired,

    /// A guest asked for an account-only page or action.
    #[error("Sign in required")]
    SignInRequired,

    /// Input rejected before reaching the backend.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this failure is ours or the backend's rather than the shopper's.
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Backend(err) => err.is_server_side(),
            Self::Session(_) | Self::Internal(_) => true,
            Self::SessionExpired | Self::SignInRequired | Self::BadRequest(_) => false,
        }
    }

    /// Status for errors rendered as a plain response.
    const fn status(&self) -> StatusCode {
        match self {
            Self::Backend(BackendError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Backend(BackendError::Forbidden) => StatusCode::FORBIDDEN,
            Self::Backend(BackendError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Backend(BackendError::Rejected(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SessionExpired | Self::SignInRequired => StatusCode::SEE_OTHER,
        }
    }

    /// Message suitable for a toast or an error body.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(err) => err.user_message(),
            Self::SessionExpired => "Your session expired, please sign in again".to_string(),
            Self::SignInRequired => "Please sign in first".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Session(_) | Self::Internal(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
        }

        match self {
            Self::SessionExpired | Self::Backend(BackendError::Unauthorized) => {
                let mut response = Redirect::to(SIGN_IN_PATH).into_response();
                response.extensions_mut().insert(IdentityExpired);
                response
            }
            Self::SignInRequired => Redirect::to(SIGN_IN_PATH).into_response(),
            other => (other.status(), other.user_message()).into_response(),
        }
    }
}

/// Response marker asking the session expiry middleware to drop the
/// signed-in identity.
#[derive(Debug, Clone, Copy)]
pub struct IdentityExpired;

pub type Result<T> = std::result::Result<T, AppError>;

/// Tag Sentry events from this request with the signed-in user.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

/// Record a shopper action so later errors show what led up to them.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Add to cart", &[("product_id", "p1")]);
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let data = data
        .iter()
        .map(|(key, value)| {
            (
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            )
        })
        .collect();

    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        data,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_backend_failures_map_to_statuses() {
        assert_eq!(
            status_of(AppError::Backend(BackendError::Status {
                status: 500,
                message: String::new()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::Backend(BackendError::NotFound("p".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Backend(BackendError::Forbidden)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Backend(BackendError::RateLimited(30))),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_local_failures_map_to_statuses() {
        assert_eq!(
            status_of(AppError::BadRequest("quantity".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("session layer".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_stay_private() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert!(!err.user_message().contains("pool"));
    }

    #[test]
    fn test_expired_token_marks_response() {
        let response = AppError::Backend(BackendError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.extensions().get::<IdentityExpired>().is_some());

        let response = AppError::SessionExpired.into_response();
        assert!(response.extensions().get::<IdentityExpired>().is_some());

        let response = AppError::SignInRequired.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.extensions().get::<IdentityExpired>().is_none());
    }
}
