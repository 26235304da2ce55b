//! Cart route handlers.
//!
//! Mutations are plain form POSTs that redirect back with a toast. Guests
//! keep their cart in the session; signed-in carts are mirrored from the
//! backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use emporium_core::{CartError, ProductId};
use serde::Deserialize;
use tracing::instrument;

use super::{return_path, toast_and_redirect};
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, Shopper};
use crate::models::Toast;
use crate::services::{CartService, ServiceError};
use crate::state::AppState;
use crate::views::CartView;

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    /// Raw field; a missing field means one unit.
    pub quantity: Option<String>,
    pub return_to: Option<String>,
}

/// Form naming a single cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    #[serde(default)]
    pub quantity: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub signed_in: bool,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart, refreshed from the backend when signed in.
#[instrument(skip(state, shopper))]
pub async fn show(State(state): State<AppState>, shopper: Shopper) -> Result<impl IntoResponse> {
    let carts = CartService::new(state.backend(), &shopper);
    let cart = match carts.refresh().await {
        Ok(cart) => cart,
        Err(err) if err.is_unauthorized() => return Err(err.into()),
        Err(err) => {
            tracing::warn!(error = %err, "Cart refresh failed, showing last snapshot");
            Toast::error(err.user_message())
                .push(&shopper.session)
                .await?;
            carts.current().await?
        }
    };

    Ok(CartShowTemplate {
        page: shopper.page().await?,
        cart: CartView::new(&cart, shopper.currency),
        signed_in: shopper.is_signed_in(),
    })
}

/// Cart count badge.
#[instrument(skip(state, shopper))]
pub async fn count(State(state): State<AppState>, shopper: Shopper) -> Result<impl IntoResponse> {
    let cart = CartService::new(state.backend(), &shopper).current().await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

/// Add a product to the cart.
#[instrument(skip(state, shopper))]
pub async fn add(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::from(form.product_id);
    let result = match form.quantity.as_deref().map_or(Ok(1), parse_quantity) {
        Ok(quantity) => {
            CartService::new(state.backend(), &shopper)
                .add(&product_id, quantity)
                .await
        }
        Err(err) => Err(err),
    };
    toast_and_redirect(
        &shopper,
        result,
        Some(Toast::success("Added to cart")),
        return_path(form.return_to.as_deref(), "/cart"),
    )
    .await
}

/// Add one unit.
#[instrument(skip(state, shopper))]
pub async fn increment(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let product_id = ProductId::from(form.product_id);
    let result = CartService::new(state.backend(), &shopper)
        .increment(&product_id)
        .await;
    finish(&shopper, result, form.return_to.as_deref()).await
}

/// Remove one unit.
#[instrument(skip(state, shopper))]
pub async fn decrement(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let product_id = ProductId::from(form.product_id);
    let result = CartService::new(state.backend(), &shopper)
        .decrement(&product_id)
        .await;
    finish(&shopper, result, form.return_to.as_deref()).await
}

/// Set a line's quantity.
#[instrument(skip(state, shopper))]
pub async fn update(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let product_id = ProductId::from(form.product_id);
    let result = match parse_quantity(&form.quantity) {
        Ok(quantity) => {
            CartService::new(state.backend(), &shopper)
                .set_quantity(&product_id, quantity)
                .await
        }
        Err(err) => Err(err),
    };
    finish(&shopper, result, None).await
}

/// Remove a line.
#[instrument(skip(state, shopper))]
pub async fn remove(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let product_id = ProductId::from(form.product_id);
    let result = CartService::new(state.backend(), &shopper)
        .remove(&product_id)
        .await;
    toast_and_redirect(
        &shopper,
        result,
        Some(Toast::info("Removed from cart")),
        return_path(form.return_to.as_deref(), "/cart"),
    )
    .await
}

/// Empty the cart.
#[instrument(skip(state, shopper))]
pub async fn clear(State(state): State<AppState>, shopper: Shopper) -> Result<Response> {
    let result = CartService::new(state.backend(), &shopper).clear().await;
    toast_and_redirect(&shopper, result, Some(Toast::info("Cart cleared")), "/cart").await
}

/// Parse a quantity field; blanks, negatives and junk become a toast.
fn parse_quantity(raw: &str) -> std::result::Result<u32, ServiceError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| CartError::InvalidQuantity.into())
}

async fn finish<T>(
    shopper: &Shopper,
    result: std::result::Result<T, ServiceError>,
    return_to: Option<&str>,
) -> Result<Response> {
    toast_and_redirect(shopper, result, None, return_path(return_to, "/cart")).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(" 3 ").unwrap(), 3);
        for raw in ["", "-1", "two", "1.5"] {
            assert!(matches!(
                parse_quantity(raw),
                Err(ServiceError::Cart(CartError::InvalidQuantity))
            ));
        }
    }
}
