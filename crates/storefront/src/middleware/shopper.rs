//! Per-request shopper context.
//!
//! [`Shopper`] bundles the session, the signed-in user (if any) and the
//! resolved locale. Services take it instead of each re-reading the session.

use axum::{extract::FromRequestParts, http::header::ACCEPT_LANGUAGE, http::request::Parts};
use emporium_core::{Cart, CurrencyCode, Locale, Wishlist};
use tower_sessions::Session;

use crate::backend::CallContext;
use crate::error::AppError;
use crate::models::{CurrentUser, Toast, session_keys};
use crate::state::AppState;

/// The visitor behind the current request.
#[derive(Clone)]
pub struct Shopper {
    pub session: Session,
    pub user: Option<CurrentUser>,
    pub locale: Locale,
    pub currency: CurrencyCode,
}

impl Shopper {
    /// Backend call context: bearer token when signed in, always the locale.
    #[must_use]
    pub fn call_context(&self) -> CallContext {
        self.user.as_ref().map_or_else(
            || CallContext::anonymous(self.locale),
            |user| user.call_context(self.locale),
        )
    }

    /// Whether someone is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// Shared layout data; drains pending toasts.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn page(&self) -> Result<PageContext, AppError> {
        let cart: Cart = self
            .session
            .get(session_keys::CART)
            .await?
            .unwrap_or_default();
        let wishlist: Wishlist = self
            .session
            .get(session_keys::WISHLIST)
            .await?
            .unwrap_or_default();

        Ok(PageContext {
            user: self.user.clone(),
            locale: self.locale,
            dir: if self.locale.is_rtl() { "rtl" } else { "ltr" },
            locales: Locale::ALL.to_vec(),
            cart_count: cart.item_count(),
            wishlist_count: wishlist.len(),
            toasts: Toast::take_all(&self.session).await?,
            is_admin: self.user.as_ref().is_some_and(CurrentUser::is_admin),
        })
    }
}

/// Resolve the display locale: explicit choice, then browser, then default.
async fn resolve_locale(parts: &Parts, session: &Session, default: Locale) -> Locale {
    if let Some(locale) = session
        .get::<Locale>(session_keys::LOCALE)
        .await
        .ok()
        .flatten()
    {
        return locale;
    }

    parts
        .headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(Locale::from_accept_language)
        .unwrap_or(default)
}

impl FromRequestParts<AppState> for Shopper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?;
        let display = &state.config().display;
        let locale = resolve_locale(parts, &session, display.default_locale).await;

        Ok(Self {
            session,
            user,
            locale,
            currency: display.currency,
        })
    }
}

/// Data every full page layout needs.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub locale: Locale,
    pub dir: &'static str,
    pub locales: Vec<Locale>,
    pub cart_count: u32,
    pub wishlist_count: usize,
    pub toasts: Vec<Toast>,
    pub is_admin: bool,
}
