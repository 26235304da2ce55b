//! Display language switch.

use axum::{
    Form,
    response::{IntoResponse, Redirect, Response},
};
use emporium_core::Locale;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::return_path;
use crate::error::Result;
use crate::models::session_keys;

/// Locale switch form data.
#[derive(Debug, Deserialize)]
pub struct LocaleForm {
    pub locale: String,
    pub return_to: Option<String>,
}

/// Remember the chosen locale and go back.
///
/// Unknown tags are ignored.
#[instrument(skip(session))]
pub async fn switch(session: Session, Form(form): Form<LocaleForm>) -> Result<Response> {
    if let Some(locale) = Locale::from_tag(&form.locale) {
        session.insert(session_keys::LOCALE, locale).await?;
    }
    Ok(Redirect::to(return_path(form.return_to.as_deref(), "/")).into_response())
}
