//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use emporium_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use super::{return_path, toast_and_redirect};
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, Shopper};
use crate::models::Toast;
use crate::services::WishlistService;
use crate::state::AppState;
use crate::views::ProductView;

/// Form naming a single product.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistShowTemplate {
    pub page: PageContext,
    pub products: Vec<ProductView>,
}

/// Display the wishlist, refreshed from the backend.
#[instrument(skip(state, shopper))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    shopper: Shopper,
) -> Result<impl IntoResponse> {
    let wishlists = WishlistService::new(state.backend(), &shopper);
    let wishlist = match wishlists.refresh().await {
        Ok(wishlist) => wishlist,
        Err(err) if err.is_unauthorized() => return Err(err.into()),
        Err(err) => {
            tracing::warn!(error = %err, "Wishlist refresh failed, showing last snapshot");
            Toast::error(err.user_message())
                .push(&shopper.session)
                .await?;
            wishlists.current().await?
        }
    };

    let products: Vec<_> = wishlist.items().iter().map(|i| i.product.clone()).collect();
    Ok(WishlistShowTemplate {
        page: shopper.page().await?,
        products: ProductView::list(&products, shopper.currency, &wishlist),
    })
}

/// Save or unsave a product.
#[instrument(skip(state, shopper))]
pub async fn toggle(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let product_id = ProductId::from(form.product_id);
    let back = return_path(form.return_to.as_deref(), "/wishlist");
    match WishlistService::new(state.backend(), &shopper)
        .toggle(&product_id)
        .await
    {
        Ok(saved) => {
            let toast = if saved {
                Toast::success("Saved to your wishlist")
            } else {
                Toast::info("Removed from your wishlist")
            };
            toast_and_redirect(&shopper, Ok(()), Some(toast), back).await
        }
        Err(err) => toast_and_redirect::<()>(&shopper, Err(err), None, back).await,
    }
}

/// Unsave a product.
#[instrument(skip(state, shopper))]
pub async fn remove(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let product_id = ProductId::from(form.product_id);
    let result = WishlistService::new(state.backend(), &shopper)
        .remove(&product_id)
        .await;
    toast_and_redirect(
        &shopper,
        result,
        Some(Toast::info("Removed from your wishlist")),
        return_path(form.return_to.as_deref(), "/wishlist"),
    )
    .await
}

/// Move a saved product into the cart.
#[instrument(skip(state, shopper))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    shopper: Shopper,
    Form(form): Form<WishlistForm>,
) -> Result<Response> {
    let product_id = ProductId::from(form.product_id);
    let result = WishlistService::new(state.backend(), &shopper)
        .move_to_cart(&product_id)
        .await;
    toast_and_redirect(
        &shopper,
        result,
        Some(Toast::success("Moved to your cart")),
        return_path(form.return_to.as_deref(), "/wishlist"),
    )
    .await
}
