//! Authentication extractors.
//!
//! Identity lives in the session as a [`CurrentUser`]; these extractors read
//! it and gate handlers on sign-in or the admin role.

use axum::{
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use emporium_core::{Cart, Wishlist};
use tower_sessions::Session;

use crate::error::{IdentityExpired, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, Toast, session_keys};

/// Extractor that requires a signed-in user.
///
/// Guests are redirected to `/auth/login?next=<path>` and the path is
/// remembered in the session so sign-in can return there.
///
/// ```rust,ignore
/// async fn account(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.user_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Rejection for the auth extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, returning to `next` afterwards.
    RedirectToLogin { next: String },
    /// Signed in, but without the admin role.
    Forbidden,
    /// Session layer missing from the stack.
    NoSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => {
                Redirect::to(&format!("/auth/login?next={}", urlencoding::encode(&next)))
                    .into_response()
            }
            Self::Forbidden => {
                (StatusCode::FORBIDDEN, "You do not have access to that").into_response()
            }
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

async fn current_user(parts: &Parts) -> Result<CurrentUser, AuthRejection> {
    // Session is set in extensions by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::NoSession)?;

    if let Some(user) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    {
        return Ok(user);
    }

    let next = parts
        .uri
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);
    // Best effort; the query parameter carries the same path.
    let _ = session.insert(session_keys::RETURN_TO, &next).await;
    Err(AuthRejection::RedirectToLogin { next })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin denied");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// ```rust,ignore
/// async fn handler(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
///     user.map_or("Hello, guest!".to_string(), |u| format!("Hello, {}!", u.user_name))
/// }
/// ```
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the signed-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    // New identity, new session ID
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Remove the signed-in user from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    clear_sentry_user();
    Ok(())
}

/// Remove the identity and both account snapshots.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_identity(session: &Session) -> Result<(), tower_sessions::session::Error> {
    clear_current_user(session).await?;
    session.remove::<Cart>(session_keys::CART).await?;
    session.remove::<Wishlist>(session_keys::WISHLIST).await?;
    Ok(())
}

/// Drop the identity when a handler reports that the backend refused the
/// user's token.
pub async fn session_expiry_middleware(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.extensions().get::<IdentityExpired>().is_some() {
        tracing::info!("Backend refused token, signing user out");
        if let Err(err) = clear_identity(&session).await {
            tracing::warn!(error = %err, "Failed to clear expired identity");
        }
        if let Err(err) = Toast::error("Your session expired, please sign in again")
            .push(&session)
            .await
        {
            tracing::warn!(error = %err, "Failed to queue session expiry toast");
        }
    }
    response
}

/// Take the remembered post-login path, accepting only local paths.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_return_to(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    let path = session.remove::<String>(session_keys::RETURN_TO).await?;
    Ok(path.filter(|p| is_local_path(p)))
}

/// Whether `path` stays on this site (no scheme, no protocol-relative URL).
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/cart"));
        assert!(is_local_path("/products?page=2"));
        assert!(!is_local_path("//evil.test"));
        assert!(!is_local_path("https://evil.test"));
        assert!(!is_local_path("/\\evil.test"));
        assert!(!is_local_path(""));
    }

    #[test]
    fn test_login_redirect_encodes_next() {
        let response = AuthRejection::RedirectToLogin {
            next: "/account/orders?page=2".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(location, "/auth/login?next=%2Faccount%2Forders%3Fpage%3D2");
    }

    #[test]
    fn test_forbidden_rejection_status() {
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
