//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use emporium_core::{CheckoutDraft, PaymentMethod};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, Shopper};
use crate::models::Toast;
use crate::services::{CartService, CheckoutService};
use crate::state::AppState;
use crate::views::CartView;

/// Payment method radio option.
pub struct PaymentOption {
    pub value: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

/// Checkout form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub full_name: String,
    pub payment_options: Vec<PaymentOption>,
}

/// Display the checkout form.
#[instrument(skip(state, shopper, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    shopper: Shopper,
) -> Result<Response> {
    let cart = CartService::new(state.backend(), &shopper).refresh().await?;
    if cart.is_empty() {
        Toast::info("Your cart is empty").push(&shopper.session).await?;
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok(CheckoutTemplate {
        page: shopper.page().await?,
        cart: CartView::new(&cart, shopper.currency),
        full_name: user.user_name,
        payment_options: [PaymentMethod::CashOnDelivery, PaymentMethod::Card]
            .into_iter()
            .map(|m| PaymentOption {
                value: m.as_str(),
                label: m.label(),
                checked: m == PaymentMethod::default(),
            })
            .collect(),
    }
    .into_response())
}

/// Place the order.
#[instrument(skip(state, shopper, draft))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    shopper: Shopper,
    Form(draft): Form<CheckoutDraft>,
) -> Result<Response> {
    match CheckoutService::new(state.backend(), &shopper)
        .place_order(&draft)
        .await
    {
        Ok(order) => {
            Toast::success("Thank you! Your order has been placed")
                .push(&shopper.session)
                .await?;
            let to = format!("/account/orders/{}", urlencoding::encode(order.id.as_str()));
            Ok(Redirect::to(&to).into_response())
        }
        Err(err) => super::toast_and_redirect::<()>(&shopper, Err(err), None, "/checkout").await,
    }
}
