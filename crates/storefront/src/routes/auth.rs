//! Authentication route handlers.
//!
//! Accounts live in the backend; these handlers collect credentials and
//! hand them to [`AuthService`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, Shopper, auth::is_local_path, take_return_to};
use crate::models::{Toast, session_keys};
use crate::services::AuthService;
use crate::services::auth::MIN_PASSWORD_LENGTH;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub min_password_length: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
///
/// A local `next` path is remembered and used after a successful sign-in.
#[instrument(skip(shopper))]
pub async fn login_page(shopper: Shopper, Query(query): Query<LoginQuery>) -> Result<Response> {
    if shopper.is_signed_in() {
        return Ok(Redirect::to("/account").into_response());
    }
    if let Some(next) = query.next.filter(|p| is_local_path(p)) {
        shopper.session.insert(session_keys::RETURN_TO, next).await?;
    }

    Ok(LoginTemplate {
        page: shopper.page().await?,
    }
    .into_response())
}

/// Sign in.
#[instrument(skip(state, shopper, form))]
pub async fn login(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AuthService::new(state.backend(), &shopper)
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => welcome(&shopper, &user.user_name).await,
        Err(err) => {
            tracing::info!(error = %err, "Sign-in refused");
            Toast::error(err.user_message())
                .push(&shopper.session)
                .await?;
            Ok(Redirect::to("/auth/login").into_response())
        }
    }
}

/// Display the registration page.
#[instrument(skip(shopper))]
pub async fn register_page(shopper: Shopper) -> Result<Response> {
    if shopper.is_signed_in() {
        return Ok(Redirect::to("/account").into_response());
    }

    Ok(RegisterTemplate {
        page: shopper.page().await?,
        min_password_length: MIN_PASSWORD_LENGTH,
    }
    .into_response())
}

/// Create an account and sign in.
#[instrument(skip(state, shopper, form))]
pub async fn register(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if form.password != form.password_confirm {
        Toast::error("Passwords do not match")
            .push(&shopper.session)
            .await?;
        return Ok(Redirect::to("/auth/register").into_response());
    }

    match AuthService::new(state.backend(), &shopper)
        .register(&form.user_name, &form.email, &form.password)
        .await
    {
        Ok(user) => welcome(&shopper, &user.user_name).await,
        Err(err) => {
            tracing::info!(error = %err, "Registration refused");
            Toast::error(err.user_message())
                .push(&shopper.session)
                .await?;
            Ok(Redirect::to("/auth/register").into_response())
        }
    }
}

/// Sign out.
#[instrument(skip(state, shopper))]
pub async fn logout(State(state): State<AppState>, shopper: Shopper) -> Result<Response> {
    AuthService::new(state.backend(), &shopper).logout().await?;
    Toast::info("You have been signed out")
        .push(&shopper.session)
        .await?;
    Ok(Redirect::to("/").into_response())
}

async fn welcome(shopper: &Shopper, user_name: &str) -> Result<Response> {
    Toast::success(format!("Welcome, {user_name}"))
        .push(&shopper.session)
        .await?;
    let to = take_return_to(&shopper.session)
        .await?
        .unwrap_or_else(|| "/".to_string());
    Ok(Redirect::to(&to).into_response())
}
